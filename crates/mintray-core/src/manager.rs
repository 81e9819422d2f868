//! Orchestration: sweep results and user actions in, tracker
//! transitions out.

use std::collections::HashSet;

use crate::WindowHandle;
use crate::action::Action;
use crate::gate;
use crate::host::{KeyboardState, TrayHost, WindowHost};
use crate::hotkey::ModifierMask;
use crate::rules::{self, CompiledRule, RuleEvent};
use crate::settings::Settings;
use crate::snapshot::{Enumerator, WindowChange};
use crate::tracker::Tracker;
use crate::tracker::representation::{MENU_ID_END, MENU_ID_FIRST};

/// Fixed popup menu commands.
pub const CMD_RESTORE_ALL: u32 = 0x0100;
pub const CMD_RELOAD: u32 = 0x0101;
pub const CMD_EXIT: u32 = 0x0102;

/// Command ids `MENU_VISIBLE_FIRST + n` minimize the `n`th visible
/// window. The range ends where minimized-window slots begin.
pub const MENU_VISIBLE_FIRST: u32 = 0x4000;

/// One window entry of the popup menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub command_id: u32,
    pub title: String,
    /// Minimized entries restore their window; the others minimize it.
    pub minimized: bool,
}

/// What the caller must do after [`TrayManager::handle_action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// Build the popup from [`TrayManager::menu_entries`] and feed the
    /// chosen command back as [`Action::MenuCommand`].
    ShowMenu,
    /// Re-read settings and pass them to [`TrayManager::reload`].
    Reload,
    Exit,
}

/// Owns the tracker and applies auto-tray rules to what the sweeps and
/// the minimize hook report.
pub struct TrayManager {
    tracker: Tracker,
    enumerator: Enumerator,
    rules: Vec<CompiledRule>,
    override_mask: ModifierMask,
    keyboard: Box<dyn KeyboardState>,
    show_windows_in_menu: bool,
    /// Windows already seen user-visible; `open` rules fire once each.
    opened: HashSet<WindowHandle>,
}

impl TrayManager {
    pub fn new(
        host: Box<dyn WindowHost>,
        tray: Box<dyn TrayHost>,
        keyboard: Box<dyn KeyboardState>,
        settings: &Settings,
    ) -> Self {
        Self {
            tracker: Tracker::new(host, tray, settings.minimize_placement),
            enumerator: Enumerator::new(),
            rules: rules::compile_all(&settings.auto_tray),
            override_mask: settings.override_mask(),
            keyboard,
            show_windows_in_menu: settings.show_windows_in_menu,
            opened: HashSet::new(),
        }
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// Takes the first sweep.
    ///
    /// Windows already visible count as opened. `open` rules are applied
    /// to them only when `auto_tray_existing` is set.
    pub fn start(&mut self, auto_tray_existing: bool) {
        for change in self.enumerator.sweep(self.tracker.host()) {
            self.tracker.apply(&change);
        }
        let visible = self.tracker.all_visible();
        tracing::info!(
            "tracking {} windows ({} visible)",
            self.tracker.len(),
            visible.len()
        );
        for handle in visible {
            self.opened.insert(handle);
            if auto_tray_existing {
                self.auto_tray(handle, RuleEvent::Open);
            }
        }
    }

    /// Runs one enumeration sweep and reacts to the differences.
    pub fn poll(&mut self) {
        let changes = self.enumerator.sweep(self.tracker.host());
        for change in &changes {
            self.tracker.apply(change);
            match *change {
                WindowChange::Removed(handle) => {
                    self.opened.remove(&handle);
                }
                WindowChange::Added(handle) | WindowChange::Changed(handle) => {
                    self.check_opened(handle);
                }
            }
        }
    }

    fn check_opened(&mut self, handle: WindowHandle) {
        let newly_visible = self
            .tracker
            .get(handle)
            .is_some_and(|w| w.is_visible() && !w.is_minimized());
        if newly_visible && self.opened.insert(handle) {
            self.auto_tray(handle, RuleEvent::Open);
        }
    }

    /// Push notification: the user started minimizing `handle`.
    pub fn on_minimize_start(&mut self, handle: WindowHandle) {
        self.refresh(handle);
        if self.tracker.get(handle).is_some_and(|w| w.is_minimized()) {
            return;
        }
        self.auto_tray(handle, RuleEvent::Minimize);
    }

    /// Brings the tracker's view of `handle` up to date ahead of the
    /// next sweep. Minimized windows keep their state.
    fn refresh(&mut self, handle: WindowHandle) {
        match self.tracker.get(handle) {
            None => {
                self.tracker.window_added(handle);
            }
            Some(w) if !w.is_minimized() => self.tracker.window_changed(handle),
            Some(_) => {}
        }
    }

    /// Evaluates the rules for `handle` and minimizes it on a match,
    /// unless the override modifiers are held.
    fn auto_tray(&mut self, handle: WindowHandle, event: RuleEvent) {
        if self.rules.is_empty() {
            return;
        }
        let info = self.tracker.host().info(handle);
        let Some(rule) = rules::first_match(&self.rules, &info, event) else {
            return;
        };
        if gate::is_held(self.override_mask, self.keyboard.as_ref()) {
            tracing::debug!("override held, not auto-traying {handle}");
            return;
        }
        tracing::info!(
            "auto-tray {handle} {:?} on {event:?} (rule {:?})",
            info.title,
            rule.rule
        );
        if let Err(e) = self.tracker.minimize(handle) {
            tracing::warn!("auto-tray of {handle}: {e}");
        }
    }

    pub fn handle_action(&mut self, action: Action) -> Outcome {
        tracing::debug!("action {action:?}");
        match action {
            Action::MinimizeForeground => self.minimize_foreground(),
            Action::RestoreLast => match self.tracker.last_minimized() {
                Some(handle) => {
                    self.tracker.restore(handle);
                }
                None => tracing::debug!("nothing to restore"),
            },
            Action::RestoreAll => self.tracker.restore_all(),
            Action::ShowMenu => return Outcome::ShowMenu,
            Action::ActivateTray(id) => match self.tracker.from_tray_id(id) {
                Some(handle) => {
                    self.tracker.restore(handle);
                }
                None => tracing::debug!("tray id {id:#X} is no longer in use"),
            },
            Action::MenuCommand(id) => return self.menu_command(id),
            Action::Reload => return Outcome::Reload,
            Action::Exit => return Outcome::Exit,
        }
        Outcome::Done
    }

    fn minimize_foreground(&mut self) {
        let Some(handle) = self.tracker.host().foreground_window() else {
            tracing::debug!("no foreground window");
            return;
        };
        self.refresh(handle);
        if let Err(e) = self.tracker.minimize(handle) {
            tracing::warn!("minimize of {handle}: {e}");
        }
    }

    fn menu_command(&mut self, id: u32) -> Outcome {
        match id {
            CMD_RESTORE_ALL => return self.handle_action(Action::RestoreAll),
            CMD_RELOAD => return Outcome::Reload,
            CMD_EXIT => return Outcome::Exit,
            id if (MENU_ID_FIRST..MENU_ID_END).contains(&id) => {
                match self.tracker.from_menu_id(id) {
                    Some(handle) => {
                        self.tracker.restore(handle);
                    }
                    None => tracing::debug!("menu id {id:#X} is no longer in use"),
                }
            }
            id if (MENU_VISIBLE_FIRST..MENU_ID_FIRST).contains(&id) => {
                let n = (id - MENU_VISIBLE_FIRST) as usize;
                match self.tracker.visible_index(n) {
                    Some(handle) => {
                        if let Err(e) = self.tracker.minimize(handle) {
                            tracing::warn!("minimize of {handle}: {e}");
                        }
                    }
                    None => tracing::debug!("visible window {n} is gone"),
                }
            }
            // 0 means the menu was dismissed.
            0 => {}
            id => tracing::debug!("unknown menu command {id:#X}"),
        }
        Outcome::Done
    }

    /// The window entries of the popup menu: minimized windows that own
    /// a menu slot, then (if enabled) the visible windows.
    pub fn menu_entries(&self) -> Vec<MenuEntry> {
        let mut entries: Vec<MenuEntry> = self
            .tracker
            .windows()
            .filter_map(|w| {
                let command_id = w.representation()?.menu_id()?;
                Some(MenuEntry {
                    command_id,
                    title: w.title().to_string(),
                    minimized: true,
                })
            })
            .collect();

        if self.show_windows_in_menu {
            let span = (MENU_ID_FIRST - MENU_VISIBLE_FIRST) as usize;
            for (n, handle) in self.tracker.all_visible().into_iter().enumerate().take(span) {
                let Some(window) = self.tracker.get(handle) else {
                    continue;
                };
                if window.title().is_empty() {
                    continue;
                }
                entries.push(MenuEntry {
                    command_id: MENU_VISIBLE_FIRST + n as u32,
                    title: window.title().to_string(),
                    minimized: false,
                });
            }
        }
        entries
    }

    /// Applies new settings. Minimized windows are moved to the new
    /// placement policy right away.
    pub fn reload(&mut self, settings: &Settings) {
        self.rules = rules::compile_all(&settings.auto_tray);
        self.override_mask = settings.override_mask();
        self.show_windows_in_menu = settings.show_windows_in_menu;
        for e in self
            .tracker
            .update_minimize_placement(settings.minimize_placement)
        {
            tracing::warn!("placement change: {e}");
        }
        tracing::info!("settings reloaded ({} auto-tray rules)", self.rules.len());
    }
}
