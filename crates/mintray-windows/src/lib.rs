//! Windows platform layer for mintray.
//!
//! Implements the `mintray-core` host traits over Win32 and runs the
//! daemon's message loop. On other targets this crate is empty.

/// Ctrl+C handling for the daemon.
#[cfg(windows)]
pub mod ctrl_c;

/// Daemon main loop.
#[cfg(windows)]
pub mod daemon;

/// Win32 window enumeration.
#[cfg(windows)]
pub mod enumerate;

/// WinEvent translation.
#[cfg(windows)]
pub mod event;

/// Message window, minimize hook and message pump.
#[cfg(windows)]
pub mod event_loop;

/// Host trait implementations.
#[cfg(windows)]
pub mod host;

/// Global hotkey registration.
#[cfg(windows)]
pub mod hotkey;

/// Popup menu.
#[cfg(windows)]
pub mod menu;

/// Process utilities (executable path).
#[cfg(windows)]
pub mod process;

/// Notification-area icons.
#[cfg(windows)]
pub mod tray;

/// Window type wrapping a Win32 `HWND`.
#[cfg(windows)]
pub mod window;

#[cfg(windows)]
pub use enumerate::enumerate_windows;
#[cfg(windows)]
pub use host::{Win32Host, Win32Keyboard, Win32Layout};
#[cfg(windows)]
pub use window::Window;
