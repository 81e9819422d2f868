use std::ffi::c_void;

use mintray_core::WindowHandle;
use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Dwm::{DWMWA_CLOAKED, DwmGetWindowAttribute};
use windows::Win32::UI::WindowsAndMessaging::{
    GW_OWNER, GWL_EXSTYLE, GetWindow, GetWindowLongPtrW, GetWindowTextLengthW, GetWindowTextW,
    GetWindowThreadProcessId, IsWindowVisible, RealGetWindowClassW, SHOW_WINDOW_CMD,
    ShowWindow, WS_EX_TOOLWINDOW,
};

/// A top-level window, wrapping a Win32 `HWND`.
///
/// `HWND` is an opaque handle: a number that identifies a window to the OS.
/// This struct holds that handle and queries the OS lazily for metadata.
#[derive(Debug, Clone, Copy)]
pub struct Window {
    hwnd: HWND,
}

impl Window {
    pub fn new(hwnd: HWND) -> Self {
        Self { hwnd }
    }

    pub fn from_handle(handle: WindowHandle) -> Self {
        Self {
            hwnd: HWND(handle.0 as *mut _),
        }
    }

    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }

    pub fn handle(&self) -> WindowHandle {
        WindowHandle(self.hwnd.0 as usize)
    }

    /// Returns the window text, or an empty string.
    pub fn title(&self) -> String {
        // SAFETY: GetWindowTextLengthW and GetWindowTextW only read
        // window text; an invalid HWND yields 0.
        unsafe {
            let length = GetWindowTextLengthW(self.hwnd);
            if length <= 0 {
                return String::new();
            }

            // +1 for the null terminator that Windows requires
            let mut buffer = vec![0u16; (length + 1) as usize];
            let copied = GetWindowTextW(self.hwnd, &mut buffer);
            String::from_utf16_lossy(&buffer[..copied.max(0) as usize])
        }
    }

    pub fn class(&self) -> String {
        // SAFETY: RealGetWindowClassW reads the window class name.
        // 256 is the maximum class name length in Win32.
        unsafe {
            let mut buffer = [0u16; 256];
            let length = RealGetWindowClassW(self.hwnd, &mut buffer);
            String::from_utf16_lossy(&buffer[..length as usize])
        }
    }

    /// Returns the id of the owning process, or `None` if the window
    /// no longer exists.
    pub fn process_id(&self) -> Option<u32> {
        let mut pid = 0u32;
        // SAFETY: returns 0 for an invalid HWND and writes the pid otherwise.
        let thread = unsafe { GetWindowThreadProcessId(self.hwnd, Some(&mut pid)) };
        (thread != 0).then_some(pid)
    }

    pub fn exists(&self) -> bool {
        self.process_id().is_some()
    }

    pub fn is_shown(&self) -> bool {
        // SAFETY: simple query returning a BOOL.
        unsafe { IsWindowVisible(self.hwnd).as_bool() }
    }

    fn has_owner(&self) -> bool {
        // SAFETY: GetWindow fails (Err) when there is no owner.
        unsafe { GetWindow(self.hwnd, GW_OWNER) }.is_ok_and(|owner| !owner.is_invalid())
    }

    fn is_tool_window(&self) -> bool {
        // SAFETY: reads the extended style bits.
        let ex_style = unsafe { GetWindowLongPtrW(self.hwnd, GWL_EXSTYLE) } as u32;
        ex_style & WS_EX_TOOLWINDOW.0 != 0
    }

    /// Whether DWM hides the window (UWP frames on other desktops,
    /// suspended apps).
    fn is_cloaked(&self) -> bool {
        let mut cloaked: u32 = 0;
        // SAFETY: DWMWA_CLOAKED writes a u32 into the buffer we pass.
        let result = unsafe {
            DwmGetWindowAttribute(
                self.hwnd,
                DWMWA_CLOAKED,
                &mut cloaked as *mut u32 as *mut c_void,
                std::mem::size_of::<u32>() as u32,
            )
        };
        result.is_ok() && cloaked != 0
    }

    /// Returns whether this is a window the user would see and could
    /// minimize: shown, unowned, not a tool window and not cloaked.
    pub fn is_user_visible(&self) -> bool {
        self.is_shown() && !self.has_owner() && !self.is_tool_window() && !self.is_cloaked()
    }

    /// Calls `ShowWindow`. The return value reports the previous
    /// visibility, not success, so it is ignored.
    pub fn show(&self, cmd: SHOW_WINDOW_CMD) {
        // SAFETY: ShowWindow on an invalid HWND is a no-op.
        unsafe {
            let _ = ShowWindow(self.hwnd, cmd);
        }
    }
}
