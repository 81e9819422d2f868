//! Ctrl+C handling for a daemon started from a console.
//!
//! The console handler runs on its own thread, so it cannot touch the
//! tracker. It posts `WM_QUIT` to the daemon thread instead, which
//! ends the message pump and lets every window be restored on the way
//! out.

use std::sync::OnceLock;

use mintray_core::{Error, Result};
use windows::Win32::Foundation::{LPARAM, WPARAM};
use windows::Win32::System::Console::{CTRL_BREAK_EVENT, CTRL_C_EVENT, SetConsoleCtrlHandler};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{PostThreadMessageW, WM_QUIT};
use windows::core::BOOL;

/// Daemon thread id, written once by `set_handler`.
static DAEMON_THREAD: OnceLock<u32> = OnceLock::new();

/// Makes Ctrl+C and Ctrl+Break quit the message pump of the calling
/// thread.
pub fn set_handler() -> Result<()> {
    // SAFETY: trivially safe query of the calling thread.
    let thread_id = unsafe { GetCurrentThreadId() };
    if DAEMON_THREAD.set(thread_id).is_err() {
        return Err(Error::host(
            "SetConsoleCtrlHandler",
            "handler already registered",
        ));
    }
    // SAFETY: the handler only reads DAEMON_THREAD and posts a message.
    unsafe { SetConsoleCtrlHandler(Some(handler), true) }
        .map_err(|e| Error::host("SetConsoleCtrlHandler", e.to_string()))
}

unsafe extern "system" fn handler(ctrl_type: u32) -> BOOL {
    if (ctrl_type == CTRL_C_EVENT || ctrl_type == CTRL_BREAK_EVENT)
        && let Some(thread_id) = DAEMON_THREAD.get()
    {
        // SAFETY: posting to a thread queue has no preconditions.
        let _ = unsafe { PostThreadMessageW(*thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) };
        return BOOL(1);
    }
    BOOL(0)
}
