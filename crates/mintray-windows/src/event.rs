use mintray_core::WindowHandle;
use windows::Win32::Foundation::HWND;
use windows::Win32::UI::WindowsAndMessaging::EVENT_SYSTEM_MINIMIZESTART;

use crate::window::Window;

/// Object ID indicating the event applies to the window itself,
/// not a child element like a scrollbar or menu item.
const OBJID_WINDOW: i32 = 0;

/// Returns the window that started minimizing, or `None` for any other
/// event or for events on child objects.
pub fn minimize_start(event: u32, hwnd: HWND, id_object: i32) -> Option<WindowHandle> {
    if event != EVENT_SYSTEM_MINIMIZESTART || id_object != OBJID_WINDOW || hwnd.is_invalid() {
        return None;
    }
    Some(Window::new(hwnd).handle())
}
