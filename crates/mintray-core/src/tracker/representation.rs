//! Tray icons and menu slots standing in for minimized windows.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::host::{TrayHost, TrayToken};
use crate::{Error, Result, WindowHandle};

/// First tray icon id. Tray ids sit above the whole menu command
/// range so the two can never be confused.
pub const TRAY_ID_FIRST: u32 = 0x1_0000;

/// Command ids handed out to menu slots: `MENU_ID_FIRST..MENU_ID_END`.
///
/// Stays below `0xF000`, where system-menu commands start.
pub const MENU_ID_FIRST: u32 = 0x8000;
pub const MENU_ID_END: u32 = 0xF000;

/// Maximum tooltip length in UTF-16 units (`szTip` holds 128 with the
/// terminator).
pub const TOOLTIP_MAX: usize = 127;

/// Where minimized windows are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementPolicy {
    #[default]
    Tray,
    Menu,
    TrayAndMenu,
}

impl PlacementPolicy {
    pub fn wants_tray(self) -> bool {
        matches!(self, Self::Tray | Self::TrayAndMenu)
    }

    pub fn wants_menu(self) -> bool {
        matches!(self, Self::Menu | Self::TrayAndMenu)
    }
}

/// The kinds of proxy a minimized window can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepresentationKind {
    Tray,
    Menu,
}

/// A live notification-area icon.
#[derive(Debug, PartialEq, Eq)]
pub struct TrayIcon {
    id: u32,
    token: TrayToken,
}

impl TrayIcon {
    pub fn id(&self) -> u32 {
        self.id
    }
}

/// A command id reserved in the popup menu.
#[derive(Debug, PartialEq, Eq)]
pub struct MenuSlot {
    command_id: u32,
}

impl MenuSlot {
    pub fn command_id(&self) -> u32 {
        self.command_id
    }
}

/// The proxies owned by one minimized window.
///
/// Neither part is `Clone`: each icon and slot has exactly one owner,
/// and only [`RepresentationManager::detach`] releases them.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Representation {
    tray: Option<TrayIcon>,
    menu: Option<MenuSlot>,
}

impl Representation {
    pub fn is_empty(&self) -> bool {
        self.tray.is_none() && self.menu.is_none()
    }

    pub fn tray_id(&self) -> Option<u32> {
        self.tray.as_ref().map(TrayIcon::id)
    }

    pub fn menu_id(&self) -> Option<u32> {
        self.menu.as_ref().map(MenuSlot::command_id)
    }
}

/// Round-robin allocator over the menu command range.
#[derive(Debug)]
struct MenuIds {
    next: u32,
    in_use: HashSet<u32>,
}

impl MenuIds {
    fn new() -> Self {
        Self {
            next: MENU_ID_FIRST,
            in_use: HashSet::new(),
        }
    }

    fn allocate(&mut self) -> Option<u32> {
        for _ in MENU_ID_FIRST..MENU_ID_END {
            let id = self.next;
            self.next = if id + 1 >= MENU_ID_END {
                MENU_ID_FIRST
            } else {
                id + 1
            };
            if self.in_use.insert(id) {
                return Some(id);
            }
        }
        None
    }

    fn release(&mut self, id: u32) {
        self.in_use.remove(&id);
    }
}

/// Creates, updates and releases representations through the host
/// tray API.
pub struct RepresentationManager {
    tray: Box<dyn TrayHost>,
    next_tray_id: u32,
    menu_ids: MenuIds,
}

impl RepresentationManager {
    pub fn new(tray: Box<dyn TrayHost>) -> Self {
        Self {
            tray,
            next_tray_id: TRAY_ID_FIRST,
            menu_ids: MenuIds::new(),
        }
    }

    /// Creates a single-kind representation for `handle`.
    pub fn attach(
        &mut self,
        handle: WindowHandle,
        title: &str,
        kind: RepresentationKind,
    ) -> Result<Representation> {
        let mut rep = Representation::default();
        match kind {
            RepresentationKind::Tray => rep.tray = Some(self.create_tray(handle, title)?),
            RepresentationKind::Menu => rep.menu = Some(self.create_menu()?),
        }
        Ok(rep)
    }

    /// Releases every part of `rep`. Safe to call more than once.
    pub fn detach(&mut self, rep: &mut Representation) {
        if let Some(icon) = rep.tray.take() {
            self.destroy_tray(icon);
        }
        if let Some(slot) = rep.menu.take() {
            self.menu_ids.release(slot.command_id);
        }
    }

    /// Brings `rep` in line with `policy`: creates missing wanted parts
    /// and releases unwanted ones.
    ///
    /// Each part is attempted on its own, so a failure to create one
    /// still leaves the window reachable through the other. The first
    /// error is returned.
    pub fn reconcile(
        &mut self,
        handle: WindowHandle,
        title: &str,
        policy: PlacementPolicy,
        rep: &mut Representation,
    ) -> Result<()> {
        let mut first_err = None;

        match (policy.wants_menu(), rep.menu.is_some()) {
            (true, false) => match self.create_menu() {
                Ok(slot) => rep.menu = Some(slot),
                Err(e) => first_err = Some(e),
            },
            (false, true) => {
                if let Some(slot) = rep.menu.take() {
                    self.menu_ids.release(slot.command_id);
                }
            }
            _ => {}
        }

        match (policy.wants_tray(), rep.tray.is_some()) {
            (true, false) => match self.create_tray(handle, title) {
                Ok(icon) => rep.tray = Some(icon),
                Err(e) => {
                    first_err.get_or_insert(e);
                }
            },
            (false, true) => {
                if let Some(icon) = rep.tray.take() {
                    self.destroy_tray(icon);
                }
            }
            _ => {}
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Pushes a new window title into the tray tooltip.
    pub fn set_title(&mut self, rep: &Representation, title: &str) {
        let Some(icon) = &rep.tray else {
            return;
        };
        if let Err(e) = self.tray.update_tooltip(icon.token, &truncate_tooltip(title)) {
            tracing::warn!("tooltip update for tray icon {} failed: {e}", icon.id);
        }
    }

    fn create_tray(&mut self, handle: WindowHandle, title: &str) -> Result<TrayIcon> {
        let id = self.next_tray_id;
        let Some(next) = id.checked_add(1) else {
            tracing::error!("tray icon id counter overflowed");
            return Err(Error::IdExhausted { what: "tray icon" });
        };
        self.next_tray_id = next;

        let token = self
            .tray
            .create_icon(handle, id, &truncate_tooltip(title))
            .map_err(|e| Error::Representation {
                handle,
                detail: e.to_string(),
            })?;
        Ok(TrayIcon { id, token })
    }

    fn destroy_tray(&mut self, icon: TrayIcon) {
        if let Err(e) = self.tray.destroy_icon(icon.token) {
            tracing::warn!("removing tray icon {} failed: {e}", icon.id);
        }
    }

    fn create_menu(&mut self) -> Result<MenuSlot> {
        match self.menu_ids.allocate() {
            Some(command_id) => Ok(MenuSlot { command_id }),
            None => {
                tracing::error!("menu command range exhausted");
                Err(Error::IdExhausted { what: "menu command" })
            }
        }
    }
}

/// Cuts `title` to the notification-area tooltip limit without
/// splitting a character.
pub fn truncate_tooltip(title: &str) -> String {
    let mut units = 0;
    let mut out = String::new();
    for c in title.chars() {
        units += c.len_utf16();
        if units > TOOLTIP_MAX {
            break;
        }
        out.push(c);
    }
    out
}
