//! Narrow interfaces to the host desktop environment.
//!
//! The core never talks to the OS directly. Platform crates (e.g.
//! `mintray-windows`) implement these traits; tests implement them
//! with in-memory fakes.

use std::path::PathBuf;

use crate::hotkey::Modifier;
use crate::{Result, WindowHandle, WindowInfo, WindowState};

/// Window enumeration, queries and window-management primitives.
///
/// Fallible primitives return `Err` instead of panicking; the tracker
/// logs the failure and carries on.
pub trait WindowHost {
    /// Returns every top-level window of the desktop session.
    fn enumerate_top_level(&self) -> Result<Vec<WindowHandle>>;

    /// Returns the window text, or an empty string if unavailable.
    fn title(&self, handle: WindowHandle) -> String;

    /// Returns whether the window would appear to the user: no owner,
    /// not a tool window, shown, and not cloaked by the shell.
    fn is_user_visible(&self, handle: WindowHandle) -> bool;

    /// Returns the window class name, or an empty string if unavailable.
    fn class_name(&self, handle: WindowHandle) -> String;

    /// Resolves the absolute path of the executable owning the window.
    fn executable_path(&self, handle: WindowHandle) -> Result<PathBuf>;

    /// Returns the window that currently has the foreground, if any.
    fn foreground_window(&self) -> Option<WindowHandle>;

    /// Shows a hidden window without changing its minimized state.
    fn show_hidden(&self, handle: WindowHandle) -> Result<()>;

    /// Minimizes the window and removes it from the taskbar.
    fn minimize_and_hide(&self, handle: WindowHandle) -> Result<()>;

    /// Restores a minimized window to its previous placement.
    fn show_and_restore(&self, handle: WindowHandle) -> Result<()>;

    /// Brings the window to the foreground.
    fn set_foreground(&self, handle: WindowHandle) -> Result<()>;

    /// Reads the enumeration state of a single window.
    fn state(&self, handle: WindowHandle) -> WindowState {
        WindowState {
            title: self.title(handle),
            visible: self.is_user_visible(handle),
        }
    }

    /// Gathers everything the rule matcher looks at.
    ///
    /// A failed executable lookup is logged and reported as `None`.
    fn info(&self, handle: WindowHandle) -> WindowInfo {
        let executable = match self.executable_path(handle) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::debug!("executable lookup for {handle} failed: {e}");
                None
            }
        };
        WindowInfo {
            title: self.title(handle),
            class: self.class_name(handle),
            executable,
        }
    }
}

/// Opaque token identifying a notification-area icon created by a
/// [`TrayHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrayToken(pub u64);

/// The host shell's notification-area API.
pub trait TrayHost {
    /// Adds an icon for `window` under the unique `id`.
    ///
    /// The host chooses the icon image (normally the window's own icon).
    fn create_icon(&mut self, window: WindowHandle, id: u32, tooltip: &str) -> Result<TrayToken>;

    fn update_tooltip(&mut self, token: TrayToken, tooltip: &str) -> Result<()>;

    fn destroy_icon(&mut self, token: TrayToken) -> Result<()>;
}

/// Live keyboard state, used by the modifier-override gate.
pub trait KeyboardState {
    /// Returns whether either the left or right variant of the
    /// modifier is currently held.
    fn is_down(&self, modifier: Modifier) -> bool;
}

/// Maps printable characters to key codes through the active
/// keyboard layout.
pub trait KeyboardLayout {
    fn key_for_char(&self, c: char) -> Option<u32>;
}

/// Layout-independent fallback: ASCII letters and digits map to their
/// own upper-case code points, which is what Windows virtual-key codes
/// use for those keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiLayout;

impl KeyboardLayout for AsciiLayout {
    fn key_for_char(&self, c: char) -> Option<u32> {
        if c.is_ascii_alphanumeric() {
            Some(u32::from(c.to_ascii_uppercase()))
        } else {
            None
        }
    }
}
