/// An action triggered by a hotkey, a tray icon click or the popup menu.
///
/// Actions are user-initiated. They are distinct from window changes,
/// which come from enumeration sweeps and the minimize-start hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Minimize the foreground window.
    MinimizeForeground,
    /// Restore the most recently minimized window.
    RestoreLast,
    /// Restore every minimized window.
    RestoreAll,
    /// Open the popup menu at the cursor.
    ShowMenu,
    /// A tray icon with this id was clicked.
    ActivateTray(u32),
    /// A popup menu entry with this command id was chosen.
    MenuCommand(u32),
    /// Reload settings from disk.
    Reload,
    /// Restore everything and stop the daemon.
    Exit,
}

/// The configurable global hotkeys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hotkey {
    Minimize,
    Restore,
    Menu,
}

impl Hotkey {
    pub const ALL: [Hotkey; 3] = [Self::Minimize, Self::Restore, Self::Menu];

    /// The settings key holding this hotkey's binding.
    pub fn name(self) -> &'static str {
        match self {
            Self::Minimize => "hotkey-minimize",
            Self::Restore => "hotkey-restore",
            Self::Menu => "hotkey-menu",
        }
    }

    /// Registration id passed to the OS; stable per hotkey.
    pub fn id(self) -> i32 {
        match self {
            Self::Minimize => 1,
            Self::Restore => 2,
            Self::Menu => 3,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.id() == id)
    }

    pub fn action(self) -> Action {
        match self {
            Self::Minimize => Action::MinimizeForeground,
            Self::Restore => Action::RestoreLast,
            Self::Menu => Action::ShowMenu,
        }
    }
}
