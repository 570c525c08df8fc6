pub mod analysis;
pub mod camelot;
pub mod catalog;
pub mod config;
pub mod gaps;
pub mod model;
pub mod reorder;
pub mod scoring;

/// Application name for XDG paths
pub const APP_NAME: &str = "segue";
