//! The popup menu shown from a tray icon or the menu hotkey.

use mintray_core::manager::{CMD_EXIT, CMD_RELOAD, CMD_RESTORE_ALL};
use mintray_core::{Error, MenuEntry, Result};
use windows::Win32::Foundation::{HWND, LPARAM, POINT, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    AppendMenuW, CreatePopupMenu, DestroyMenu, GetCursorPos, HMENU, MENU_ITEM_FLAGS, MF_GRAYED,
    MF_SEPARATOR, MF_STRING, PostMessageW, SetForegroundWindow, TPM_RETURNCMD, TPM_RIGHTBUTTON,
    TrackPopupMenuEx, WM_NULL,
};
use windows::core::{HSTRING, PCWSTR};

const MAX_TITLE_CHARS: usize = 64;

struct PopupMenu(HMENU);

impl PopupMenu {
    fn new() -> Result<Self> {
        // SAFETY: creates an empty menu owned by this wrapper.
        unsafe { CreatePopupMenu() }
            .map(Self)
            .map_err(|e| Error::host("CreatePopupMenu", e.to_string()))
    }

    fn item(&self, flags: MENU_ITEM_FLAGS, command_id: u32, text: &str) -> Result<()> {
        let text = HSTRING::from(text);
        // SAFETY: the text outlives the call; the menu copies it.
        unsafe { AppendMenuW(self.0, flags, command_id as usize, PCWSTR(text.as_ptr())) }
            .map_err(|e| Error::host("AppendMenuW", e.to_string()))
    }

    fn separator(&self) -> Result<()> {
        // SAFETY: separators carry no text.
        unsafe { AppendMenuW(self.0, MF_SEPARATOR, 0, PCWSTR::null()) }
            .map_err(|e| Error::host("AppendMenuW", e.to_string()))
    }
}

impl Drop for PopupMenu {
    fn drop(&mut self) {
        // SAFETY: we own the menu.
        unsafe {
            let _ = DestroyMenu(self.0);
        }
    }
}

/// Shows the menu at the cursor and blocks until it closes.
///
/// Returns the chosen command id, or 0 when the menu was dismissed.
pub fn show(owner: HWND, entries: &[MenuEntry]) -> Result<u32> {
    let menu = PopupMenu::new()?;

    let (minimized, visible): (Vec<&MenuEntry>, Vec<&MenuEntry>) =
        entries.iter().partition(|e| e.minimized);
    for entry in &minimized {
        menu.item(MF_STRING, entry.command_id, &label(&entry.title))?;
    }
    if !minimized.is_empty() && !visible.is_empty() {
        menu.separator()?;
    }
    for entry in &visible {
        menu.item(MF_STRING, entry.command_id, &label(&entry.title))?;
    }
    if !entries.is_empty() {
        menu.separator()?;
    }

    let restore_flags = if minimized.is_empty() {
        MF_STRING | MF_GRAYED
    } else {
        MF_STRING
    };
    menu.item(restore_flags, CMD_RESTORE_ALL, "Restore all")?;
    menu.item(MF_STRING, CMD_RELOAD, "Reload settings")?;
    menu.item(MF_STRING, CMD_EXIT, "Exit")?;

    let mut cursor = POINT::default();
    // SAFETY: writes the cursor position into our POINT.
    unsafe { GetCursorPos(&mut cursor) }.map_err(|e| Error::host("GetCursorPos", e.to_string()))?;

    // SAFETY: the owner must be foreground for the menu to close when
    // the user clicks elsewhere; the trailing WM_NULL lets the shell
    // finish its own click handling.
    let command = unsafe {
        let _ = SetForegroundWindow(owner);
        let chosen = TrackPopupMenuEx(
            menu.0,
            (TPM_RETURNCMD | TPM_RIGHTBUTTON).0,
            cursor.x,
            cursor.y,
            owner,
            None,
        );
        let _ = PostMessageW(Some(owner), WM_NULL, WPARAM(0), LPARAM(0));
        chosen
    };
    Ok(command.0 as u32)
}

/// Menu text for a window title. `&` would mark a mnemonic, so it is
/// doubled.
fn label(title: &str) -> String {
    let mut text: String = title.chars().take(MAX_TITLE_CHARS).collect();
    if title.chars().count() > MAX_TITLE_CHARS {
        text.push_str("...");
    }
    text.replace('&', "&&")
}
