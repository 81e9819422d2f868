use mintray_core::{Error, Result};
use windows::Win32::Foundation::{HWND, LPARAM};
use windows::Win32::UI::WindowsAndMessaging::EnumWindows;
use windows::core::BOOL;

use crate::window::Window;

/// Enumerates every top-level window of the desktop session.
///
/// No filtering happens here; visibility is a per-window query so that
/// hidden windows can be tracked and noticed when they are shown.
pub fn enumerate_windows() -> Result<Vec<Window>> {
    let mut windows: Vec<Window> = Vec::new();

    // SAFETY: EnumWindows calls our callback for each top-level window.
    // We pass a pointer to our Vec as LPARAM (user data). The callback
    // casts it back to &mut Vec<Window>. EnumWindows runs synchronously,
    // so the Vec outlives the call.
    unsafe {
        EnumWindows(
            Some(enum_window_callback),
            LPARAM(&mut windows as *mut _ as isize),
        )
    }
    .map_err(|e| Error::host("EnumWindows", e.to_string()))?;

    Ok(windows)
}

/// Callback invoked by `EnumWindows` for each top-level window.
unsafe extern "system" fn enum_window_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
    // SAFETY: lparam is the Vec<Window> pointer from enumerate_windows().
    let windows = unsafe { &mut *(lparam.0 as *mut Vec<Window>) };
    windows.push(Window::new(hwnd));
    BOOL(1) // TRUE: continue enumerating
}
