use std::fmt;
use std::path::PathBuf;

/// Opaque identifier of a top-level window.
///
/// On Windows this is the raw `HWND` value. The OS owns the window;
/// holding a handle keeps nothing alive and the value may be reused
/// once the window is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowHandle(pub usize);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

/// The per-window data an enumeration sweep reports.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WindowState {
    pub title: String,
    /// Whether the window is user-visible (see [`crate::host::WindowHost::is_user_visible`]).
    pub visible: bool,
}

/// What the rule matcher needs to know about a window.
///
/// `executable` is `None` when the owning process path could not be
/// resolved (process already gone, access denied).
#[derive(Debug, Clone, Default)]
pub struct WindowInfo {
    pub title: String,
    pub class: String,
    pub executable: Option<PathBuf>,
}
