use std::path::PathBuf;

use mintray_core::host::{KeyboardLayout, KeyboardState, WindowHost};
use mintray_core::hotkey::Modifier;
use mintray_core::{Error, Result, WindowHandle};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetAsyncKeyState, VK_CONTROL, VK_LWIN, VK_MENU, VK_RWIN, VK_SHIFT, VkKeyScanW,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetForegroundWindow, SW_HIDE, SW_MINIMIZE, SW_RESTORE, SW_SHOW, SetForegroundWindow,
};

use crate::enumerate;
use crate::process;
use crate::window::Window;

/// [`WindowHost`] backed by the Win32 window manager.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Host;

fn existing(op: &'static str, handle: WindowHandle) -> Result<Window> {
    let window = Window::from_handle(handle);
    if window.exists() {
        Ok(window)
    } else {
        Err(Error::host(op, format!("window {handle} no longer exists")))
    }
}

impl WindowHost for Win32Host {
    fn enumerate_top_level(&self) -> Result<Vec<WindowHandle>> {
        Ok(enumerate::enumerate_windows()?
            .iter()
            .map(Window::handle)
            .collect())
    }

    fn title(&self, handle: WindowHandle) -> String {
        Window::from_handle(handle).title()
    }

    fn is_user_visible(&self, handle: WindowHandle) -> bool {
        Window::from_handle(handle).is_user_visible()
    }

    fn class_name(&self, handle: WindowHandle) -> String {
        Window::from_handle(handle).class()
    }

    fn executable_path(&self, handle: WindowHandle) -> Result<PathBuf> {
        let pid = Window::from_handle(handle)
            .process_id()
            .ok_or_else(|| Error::host("GetWindowThreadProcessId", "window no longer exists"))?;
        process::executable_path(pid)
    }

    fn foreground_window(&self) -> Option<WindowHandle> {
        // SAFETY: simple query; returns a null HWND when nothing has focus.
        let hwnd = unsafe { GetForegroundWindow() };
        (!hwnd.is_invalid()).then(|| Window::new(hwnd).handle())
    }

    fn show_hidden(&self, handle: WindowHandle) -> Result<()> {
        existing("ShowWindow", handle)?.show(SW_SHOW);
        Ok(())
    }

    fn minimize_and_hide(&self, handle: WindowHandle) -> Result<()> {
        let window = existing("ShowWindow", handle)?;
        // Minimize first so the window keeps its restore placement,
        // then hide it to drop the taskbar button.
        window.show(SW_MINIMIZE);
        window.show(SW_HIDE);
        Ok(())
    }

    fn show_and_restore(&self, handle: WindowHandle) -> Result<()> {
        existing("ShowWindow", handle)?.show(SW_RESTORE);
        Ok(())
    }

    fn set_foreground(&self, handle: WindowHandle) -> Result<()> {
        let window = existing("SetForegroundWindow", handle)?;
        // SAFETY: SetForegroundWindow is safe to call with any HWND.
        if unsafe { SetForegroundWindow(window.hwnd()) }.as_bool() {
            Ok(())
        } else {
            Err(Error::host(
                "SetForegroundWindow",
                "refused by the foreground lock",
            ))
        }
    }
}

/// [`KeyboardState`] reading the asynchronous key state.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Keyboard;

fn key_down(vk: u16) -> bool {
    // SAFETY: GetAsyncKeyState has no preconditions. The high bit is
    // set while the key is held.
    unsafe { GetAsyncKeyState(i32::from(vk)) < 0 }
}

impl KeyboardState for Win32Keyboard {
    fn is_down(&self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Alt => key_down(VK_MENU.0),
            Modifier::Ctrl => key_down(VK_CONTROL.0),
            Modifier::Shift => key_down(VK_SHIFT.0),
            Modifier::Win => key_down(VK_LWIN.0) || key_down(VK_RWIN.0),
        }
    }
}

/// [`KeyboardLayout`] resolving characters through the active layout.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Layout;

impl KeyboardLayout for Win32Layout {
    fn key_for_char(&self, c: char) -> Option<u32> {
        let mut units = [0u16; 2];
        let [unit] = c.encode_utf16(&mut units) else {
            return None;
        };
        // SAFETY: VkKeyScanW only consults the current layout. The low
        // byte is the virtual-key code; -1 means no key produces `c`.
        let scan = unsafe { VkKeyScanW(*unit) };
        if scan == -1 {
            return None;
        }
        Some(u32::from(scan as u16 & 0xFF))
    }
}
