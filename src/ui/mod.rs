pub mod format;
pub mod render;
pub mod theme;

pub use render::render;
pub use theme::Theme;
