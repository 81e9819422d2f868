//! In-memory hosts for unit tests.
//!
//! Each fake is a cheap `Rc` handle: clone it, move one clone into the
//! component under test, and keep the other to drive and inspect it.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::rc::Rc;

use crate::host::{KeyboardState, TrayHost, TrayToken, WindowHost};
use crate::hotkey::Modifier;
use crate::{Error, Result, WindowHandle};

#[derive(Debug, Clone)]
struct FakeWindow {
    title: String,
    class: String,
    executable: Option<PathBuf>,
    shown: bool,
    refuses_hide: bool,
}

#[derive(Debug, Default)]
struct HostState {
    windows: BTreeMap<WindowHandle, FakeWindow>,
    fail_enumeration: bool,
    fail_foreground: bool,
    foreground: Option<WindowHandle>,
    calls: Vec<(&'static str, WindowHandle)>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeHost(Rc<RefCell<HostState>>);

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a visible window with no resolvable executable.
    pub fn open(&self, handle: WindowHandle, class: &str, title: &str) {
        self.insert(handle, class, title, None, true);
    }

    pub fn open_hidden(&self, handle: WindowHandle, class: &str, title: &str) {
        self.insert(handle, class, title, None, false);
    }

    pub fn open_with_exe(&self, handle: WindowHandle, exe: &str, class: &str, title: &str) {
        self.insert(handle, class, title, Some(PathBuf::from(exe)), true);
    }

    fn insert(
        &self,
        handle: WindowHandle,
        class: &str,
        title: &str,
        executable: Option<PathBuf>,
        shown: bool,
    ) {
        self.0.borrow_mut().windows.insert(
            handle,
            FakeWindow {
                title: title.into(),
                class: class.into(),
                executable,
                shown,
                refuses_hide: false,
            },
        );
    }

    pub fn close(&self, handle: WindowHandle) {
        self.0.borrow_mut().windows.remove(&handle);
    }

    pub fn set_title(&self, handle: WindowHandle, title: &str) {
        if let Some(w) = self.0.borrow_mut().windows.get_mut(&handle) {
            w.title = title.into();
        }
    }

    /// Shows or hides a window as if another program did it.
    pub fn set_shown(&self, handle: WindowHandle, shown: bool) {
        if let Some(w) = self.0.borrow_mut().windows.get_mut(&handle) {
            w.shown = shown;
        }
    }

    pub fn refuse_hide(&self, handle: WindowHandle) {
        if let Some(w) = self.0.borrow_mut().windows.get_mut(&handle) {
            w.refuses_hide = true;
        }
    }

    pub fn fail_enumeration(&self, fail: bool) {
        self.0.borrow_mut().fail_enumeration = fail;
    }

    pub fn fail_foreground(&self, fail: bool) {
        self.0.borrow_mut().fail_foreground = fail;
    }

    pub fn set_foreground_window(&self, handle: Option<WindowHandle>) {
        self.0.borrow_mut().foreground = handle;
    }

    pub fn is_shown(&self, handle: WindowHandle) -> bool {
        self.0
            .borrow()
            .windows
            .get(&handle)
            .is_some_and(|w| w.shown)
    }

    /// Counts calls of the named primitive on `handle`.
    pub fn calls(&self, op: &str, handle: WindowHandle) -> usize {
        self.0
            .borrow()
            .calls
            .iter()
            .filter(|(o, h)| *o == op && *h == handle)
            .count()
    }

    fn record(&self, op: &'static str, handle: WindowHandle) {
        self.0.borrow_mut().calls.push((op, handle));
    }

    fn missing(op: &'static str, handle: WindowHandle) -> Error {
        Error::host(op, format!("no window {handle}"))
    }
}

impl WindowHost for FakeHost {
    fn enumerate_top_level(&self) -> Result<Vec<WindowHandle>> {
        let state = self.0.borrow();
        if state.fail_enumeration {
            return Err(Error::host("EnumWindows", "simulated failure"));
        }
        Ok(state.windows.keys().copied().collect())
    }

    fn title(&self, handle: WindowHandle) -> String {
        self.0
            .borrow()
            .windows
            .get(&handle)
            .map(|w| w.title.clone())
            .unwrap_or_default()
    }

    fn is_user_visible(&self, handle: WindowHandle) -> bool {
        self.is_shown(handle)
    }

    fn class_name(&self, handle: WindowHandle) -> String {
        self.0
            .borrow()
            .windows
            .get(&handle)
            .map(|w| w.class.clone())
            .unwrap_or_default()
    }

    fn executable_path(&self, handle: WindowHandle) -> Result<PathBuf> {
        self.0
            .borrow()
            .windows
            .get(&handle)
            .and_then(|w| w.executable.clone())
            .ok_or_else(|| Error::host("QueryFullProcessImageNameW", "access denied"))
    }

    fn foreground_window(&self) -> Option<WindowHandle> {
        self.0.borrow().foreground
    }

    fn show_hidden(&self, handle: WindowHandle) -> Result<()> {
        self.record("show_hidden", handle);
        let mut state = self.0.borrow_mut();
        let w = state
            .windows
            .get_mut(&handle)
            .ok_or_else(|| Self::missing("ShowWindow", handle))?;
        w.shown = true;
        Ok(())
    }

    fn minimize_and_hide(&self, handle: WindowHandle) -> Result<()> {
        self.record("minimize_and_hide", handle);
        let mut state = self.0.borrow_mut();
        let w = state
            .windows
            .get_mut(&handle)
            .ok_or_else(|| Self::missing("ShowWindow", handle))?;
        if !w.refuses_hide {
            w.shown = false;
        }
        Ok(())
    }

    fn show_and_restore(&self, handle: WindowHandle) -> Result<()> {
        self.record("show_and_restore", handle);
        let mut state = self.0.borrow_mut();
        let w = state
            .windows
            .get_mut(&handle)
            .ok_or_else(|| Self::missing("ShowWindow", handle))?;
        w.shown = true;
        Ok(())
    }

    fn set_foreground(&self, handle: WindowHandle) -> Result<()> {
        self.record("set_foreground", handle);
        let mut state = self.0.borrow_mut();
        if state.fail_foreground {
            return Err(Error::host("SetForegroundWindow", "denied"));
        }
        state.foreground = Some(handle);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct TrayState {
    /// token -> (window, id, tooltip)
    icons: HashMap<u64, (WindowHandle, u32, String)>,
    next_token: u64,
    created: usize,
    destroyed: usize,
    fail_create: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FakeTray(Rc<RefCell<TrayState>>);

impl FakeTray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_create(&self, fail: bool) {
        self.0.borrow_mut().fail_create = fail;
    }

    pub fn live_icons(&self) -> usize {
        self.0.borrow().icons.len()
    }

    pub fn created(&self) -> usize {
        self.0.borrow().created
    }

    pub fn destroyed(&self) -> usize {
        self.0.borrow().destroyed
    }

    pub fn tooltip(&self, id: u32) -> Option<String> {
        self.0
            .borrow()
            .icons
            .values()
            .find(|(_, i, _)| *i == id)
            .map(|(_, _, t)| t.clone())
    }

    pub fn icon_window(&self, id: u32) -> Option<WindowHandle> {
        self.0
            .borrow()
            .icons
            .values()
            .find(|(_, i, _)| *i == id)
            .map(|(w, _, _)| *w)
    }
}

impl TrayHost for FakeTray {
    fn create_icon(&mut self, window: WindowHandle, id: u32, tooltip: &str) -> Result<TrayToken> {
        let mut state = self.0.borrow_mut();
        if state.fail_create {
            return Err(Error::host("Shell_NotifyIconW", "NIM_ADD refused"));
        }
        state.next_token += 1;
        let token = state.next_token;
        state.icons.insert(token, (window, id, tooltip.to_string()));
        state.created += 1;
        Ok(TrayToken(token))
    }

    fn update_tooltip(&mut self, token: TrayToken, tooltip: &str) -> Result<()> {
        let mut state = self.0.borrow_mut();
        let icon = state
            .icons
            .get_mut(&token.0)
            .ok_or_else(|| Error::host("Shell_NotifyIconW", "no such icon"))?;
        icon.2 = tooltip.to_string();
        Ok(())
    }

    fn destroy_icon(&mut self, token: TrayToken) -> Result<()> {
        let mut state = self.0.borrow_mut();
        state
            .icons
            .remove(&token.0)
            .ok_or_else(|| Error::host("Shell_NotifyIconW", "no such icon"))?;
        state.destroyed += 1;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeKeyboard(Rc<RefCell<Vec<Modifier>>>);

impl FakeKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self, modifier: Modifier) {
        self.0.borrow_mut().push(modifier);
    }

    pub fn release_all(&self) {
        self.0.borrow_mut().clear();
    }
}

impl KeyboardState for FakeKeyboard {
    fn is_down(&self, modifier: Modifier) -> bool {
        self.0.borrow().contains(&modifier)
    }
}
