pub mod check;
pub mod hotkey;
pub mod init;
pub mod list;
pub mod run;

use std::path::PathBuf;

use mintray_core::host::KeyboardLayout;

/// Returns `--config` if given, otherwise the default settings path.
/// Exits when no config directory can be determined.
pub fn settings_path(config: Option<PathBuf>) -> PathBuf {
    if let Some(path) = config {
        return path;
    }
    match mintray_core::settings::settings_path() {
        Some(path) => path,
        None => {
            eprintln!("Error: could not determine config directory; pass --config.");
            std::process::exit(1);
        }
    }
}

/// The active keyboard layout, used to resolve character keys.
#[cfg(windows)]
pub fn layout() -> Box<dyn KeyboardLayout> {
    Box::new(mintray_windows::Win32Layout)
}

#[cfg(not(windows))]
pub fn layout() -> Box<dyn KeyboardLayout> {
    Box::new(mintray_core::host::AsciiLayout)
}
