pub mod action;
pub mod error;
pub mod gate;
pub mod host;
pub mod hotkey;
pub mod log;
pub mod manager;
pub mod rules;
pub mod settings;
pub mod snapshot;
pub mod tracker;
pub mod window;

#[cfg(test)]
pub(crate) mod testing;

pub use action::{Action, Hotkey};
pub use error::{Error, ErrorCode, Result};
pub use manager::{MenuEntry, Outcome, TrayManager};
pub use settings::Settings;
pub use tracker::Tracker;
pub use window::{WindowHandle, WindowInfo, WindowState};
