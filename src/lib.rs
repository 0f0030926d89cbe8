pub mod app;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod ranking;
pub mod stats;
pub mod types;
pub mod ui;
pub mod view;
