mod help_popup;
mod status_bar;

pub use help_popup::HelpPopup;
pub use status_bar::StatusBar;
