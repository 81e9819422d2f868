//! Notification-area icons through `Shell_NotifyIconW`.
//!
//! Icons belong to the daemon's message window; clicks arrive there as
//! the callback message with the icon id in `wParam` and the mouse
//! message in `lParam`.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use mintray_core::host::{TrayHost, TrayToken};
use mintray_core::{Error, Result, WindowHandle};
use windows::Win32::Foundation::{HWND, LPARAM, WPARAM};
use windows::Win32::UI::Shell::{
    NIF_ICON, NIF_MESSAGE, NIF_TIP, NIM_ADD, NIM_DELETE, NIM_MODIFY, NOTIFY_ICON_MESSAGE,
    NOTIFYICONDATAW, Shell_NotifyIconW,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GCLP_HICONSM, GetClassLongPtrW, HICON, IDI_APPLICATION, LoadIconW, SMTO_ABORTIFHUNG,
    SendMessageTimeoutW, WM_GETICON,
};

use crate::window::Window;

/// `WM_GETICON` wParam asking for the small icon the app draws itself.
const ICON_SMALL2: usize = 2;
const GETICON_TIMEOUT_MS: u32 = 100;

struct Icon {
    window: WindowHandle,
    tooltip: Vec<u16>,
}

struct Icons {
    owner: HWND,
    callback_message: u32,
    live: BTreeMap<u32, Icon>,
}

impl Icons {
    fn data(&self, id: u32, icon: &Icon) -> NOTIFYICONDATAW {
        let mut nid = NOTIFYICONDATAW {
            cbSize: std::mem::size_of::<NOTIFYICONDATAW>() as u32,
            hWnd: self.owner,
            uID: id,
            uFlags: NIF_MESSAGE | NIF_ICON | NIF_TIP,
            uCallbackMessage: self.callback_message,
            hIcon: window_icon(icon.window),
            ..Default::default()
        };
        let len = icon.tooltip.len().min(nid.szTip.len() - 1);
        nid.szTip[..len].copy_from_slice(&icon.tooltip[..len]);
        nid
    }

    fn notify(&self, op: &'static str, message: NOTIFY_ICON_MESSAGE, id: u32) -> Result<()> {
        let Some(icon) = self.live.get(&id) else {
            return Err(Error::host(op, format!("no tray icon {id:#X}")));
        };
        let nid = self.data(id, icon);
        // SAFETY: nid is fully initialized and outlives the call.
        let ok = unsafe { Shell_NotifyIconW(message, &nid) };
        if ok.as_bool() {
            Ok(())
        } else {
            Err(Error::host(op, format!("shell refused icon {id:#X}")))
        }
    }

    fn delete(&self, id: u32) {
        let nid = NOTIFYICONDATAW {
            cbSize: std::mem::size_of::<NOTIFYICONDATAW>() as u32,
            hWnd: self.owner,
            uID: id,
            ..Default::default()
        };
        // SAFETY: NIM_DELETE only needs the owner window and id.
        unsafe {
            let _ = Shell_NotifyIconW(NIM_DELETE, &nid);
        }
    }
}

impl Drop for Icons {
    fn drop(&mut self) {
        for id in self.live.keys() {
            self.delete(*id);
        }
    }
}

/// [`TrayHost`] implementation. Clones share the same icon set, so the
/// daemon can keep one to re-add icons after Explorer restarts.
#[derive(Clone)]
pub struct Win32Tray {
    icons: Rc<RefCell<Icons>>,
}

impl Win32Tray {
    pub fn new(owner: HWND, callback_message: u32) -> Self {
        Self {
            icons: Rc::new(RefCell::new(Icons {
                owner,
                callback_message,
                live: BTreeMap::new(),
            })),
        }
    }

    /// Adds every live icon again. Needed after `TaskbarCreated`, when
    /// a restarted shell has forgotten them.
    pub fn restore_icons(&self) {
        let icons = self.icons.borrow();
        for id in icons.live.keys() {
            if let Err(e) = icons.notify("Shell_NotifyIconW(NIM_ADD)", NIM_ADD, *id) {
                tracing::warn!("re-adding tray icon: {e}");
            }
        }
    }
}

impl TrayHost for Win32Tray {
    fn create_icon(&mut self, window: WindowHandle, id: u32, tooltip: &str) -> Result<TrayToken> {
        let mut icons = self.icons.borrow_mut();
        icons.live.insert(
            id,
            Icon {
                window,
                tooltip: tooltip.encode_utf16().collect(),
            },
        );
        if let Err(e) = icons.notify("Shell_NotifyIconW(NIM_ADD)", NIM_ADD, id) {
            icons.live.remove(&id);
            return Err(e);
        }
        Ok(TrayToken(u64::from(id)))
    }

    fn update_tooltip(&mut self, token: TrayToken, tooltip: &str) -> Result<()> {
        let id = token_id(token)?;
        let mut icons = self.icons.borrow_mut();
        let Some(icon) = icons.live.get_mut(&id) else {
            return Err(Error::host("Shell_NotifyIconW(NIM_MODIFY)", "unknown icon"));
        };
        icon.tooltip = tooltip.encode_utf16().collect();
        icons.notify("Shell_NotifyIconW(NIM_MODIFY)", NIM_MODIFY, id)
    }

    fn destroy_icon(&mut self, token: TrayToken) -> Result<()> {
        let id = token_id(token)?;
        let mut icons = self.icons.borrow_mut();
        if icons.live.remove(&id).is_none() {
            return Err(Error::host("Shell_NotifyIconW(NIM_DELETE)", "unknown icon"));
        }
        icons.delete(id);
        Ok(())
    }
}

fn token_id(token: TrayToken) -> Result<u32> {
    u32::try_from(token.0).map_err(|_| Error::host("Shell_NotifyIconW", "foreign tray token"))
}

/// Picks the icon the window shows in its caption, falling back to its
/// class icon and then the stock application icon.
fn window_icon(handle: WindowHandle) -> HICON {
    let hwnd = Window::from_handle(handle).hwnd();
    let mut result = 0usize;
    // SAFETY: SMTO_ABORTIFHUNG bounds the wait on a hung window.
    unsafe {
        let _ = SendMessageTimeoutW(
            hwnd,
            WM_GETICON,
            WPARAM(ICON_SMALL2),
            LPARAM(0),
            SMTO_ABORTIFHUNG,
            GETICON_TIMEOUT_MS,
            Some(&mut result as *mut usize),
        );
    }
    if result == 0 {
        // SAFETY: reads a class field; 0 when unset.
        result = unsafe { GetClassLongPtrW(hwnd, GCLP_HICONSM) };
    }
    if result != 0 {
        return HICON(result as *mut _);
    }
    // SAFETY: loads a shared stock icon.
    unsafe { LoadIconW(None, IDI_APPLICATION) }.unwrap_or_default()
}
