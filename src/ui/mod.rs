mod app;
pub mod components;
pub(crate) mod key_handler;
pub mod paint;

pub use app::{App, SourceKind};
