pub mod filter;
pub mod state;

pub use filter::{FilterCategory, SortKey};
pub use state::{recompute, ViewState};
