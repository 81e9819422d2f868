//! Read-only queries over the tracked windows.

use crate::WindowHandle;

use super::{TrackedWindow, Tracker};

impl Tracker {
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn contains(&self, handle: WindowHandle) -> bool {
        self.index_of(handle).is_some()
    }

    pub fn get(&self, handle: WindowHandle) -> Option<&TrackedWindow> {
        self.windows.iter().find(|w| w.handle == handle)
    }

    /// Iterates every tracked window in first-seen order.
    pub fn windows(&self) -> impl Iterator<Item = &TrackedWindow> {
        self.windows.iter()
    }

    /// Resolves a tray icon id back to its window.
    pub fn from_tray_id(&self, id: u32) -> Option<WindowHandle> {
        self.windows
            .iter()
            .find(|w| w.representation.as_ref().and_then(|r| r.tray_id()) == Some(id))
            .map(|w| w.handle)
    }

    /// Resolves a menu command id back to its window.
    pub fn from_menu_id(&self, id: u32) -> Option<WindowHandle> {
        self.windows
            .iter()
            .find(|w| w.representation.as_ref().and_then(|r| r.menu_id()) == Some(id))
            .map(|w| w.handle)
    }

    fn visible(&self) -> impl Iterator<Item = &TrackedWindow> {
        self.windows.iter().filter(|w| w.visible && !w.minimized)
    }

    fn minimized(&self) -> impl Iterator<Item = &TrackedWindow> {
        self.windows.iter().filter(|w| w.minimized)
    }

    /// Returns the `n`th visible, non-minimized window.
    pub fn visible_index(&self, n: usize) -> Option<WindowHandle> {
        self.visible().nth(n).map(|w| w.handle)
    }

    /// Returns the `n`th minimized window.
    pub fn minimized_index(&self, n: usize) -> Option<WindowHandle> {
        self.minimized().nth(n).map(|w| w.handle)
    }

    /// Returns the still-minimized window whose `minimize` succeeded
    /// most recently.
    pub fn last_minimized(&self) -> Option<WindowHandle> {
        self.minimized()
            .max_by_key(|w| w.minimized_seq)
            .map(|w| w.handle)
    }

    pub fn all_minimized(&self) -> Vec<WindowHandle> {
        self.minimized().map(|w| w.handle).collect()
    }

    pub fn all_visible(&self) -> Vec<WindowHandle> {
        self.visible().map(|w| w.handle).collect()
    }
}
