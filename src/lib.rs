pub mod config;
pub mod source;
pub mod state;
pub mod ui;
