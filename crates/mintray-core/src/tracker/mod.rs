//! The window tracker: every known top-level window and its
//! minimize/restore state.
//!
//! A window is `Normal` (not minimized) or `Minimized` (hidden by us,
//! optionally represented by a tray icon and/or menu slot). It leaves
//! the tracker when it disappears from enumeration. All transitions are
//! idempotent so that the poll sweep and push notifications can report
//! the same fact twice without double effects.

mod queries;
pub mod representation;

use crate::host::{TrayHost, WindowHost};
use crate::snapshot::WindowChange;
use crate::{Error, Result, WindowHandle};

use representation::{PlacementPolicy, Representation, RepresentationManager};

/// One top-level window known to the tracker.
#[derive(Debug)]
pub struct TrackedWindow {
    handle: WindowHandle,
    title: String,
    visible: bool,
    minimized: bool,
    /// Sequence number of the `minimize` that hid this window.
    minimized_seq: u64,
    representation: Option<Representation>,
}

impl TrackedWindow {
    pub fn handle(&self) -> WindowHandle {
        self.handle
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    pub fn representation(&self) -> Option<&Representation> {
        self.representation.as_ref()
    }
}

/// Owns the tracked-window list and the representations of minimized
/// windows.
pub struct Tracker {
    host: Box<dyn WindowHost>,
    reps: RepresentationManager,
    placement: PlacementPolicy,
    /// In first-seen order; queries by index follow this order.
    windows: Vec<TrackedWindow>,
    minimize_seq: u64,
}

impl Tracker {
    pub fn new(
        host: Box<dyn WindowHost>,
        tray: Box<dyn TrayHost>,
        placement: PlacementPolicy,
    ) -> Self {
        Self {
            host,
            reps: RepresentationManager::new(tray),
            placement,
            windows: Vec::new(),
            minimize_seq: 0,
        }
    }

    /// The host the tracker drives. Other components may query it but
    /// must change window state only through the tracker.
    pub fn host(&self) -> &dyn WindowHost {
        self.host.as_ref()
    }

    pub fn placement(&self) -> PlacementPolicy {
        self.placement
    }

    fn index_of(&self, handle: WindowHandle) -> Option<usize> {
        self.windows.iter().position(|w| w.handle == handle)
    }

    /// Starts tracking a new window in the `Normal` state.
    ///
    /// Returns `false` (and logs) if the handle is already tracked.
    pub fn window_added(&mut self, handle: WindowHandle) -> bool {
        if self.index_of(handle).is_some() {
            tracing::warn!("window_added for already tracked window {handle}");
            return false;
        }
        let state = self.host.state(handle);
        tracing::debug!("+window {handle} {:?} visible={}", state.title, state.visible);
        self.windows.push(TrackedWindow {
            handle,
            title: state.title,
            visible: state.visible,
            minimized: false,
            minimized_seq: 0,
            representation: None,
        });
        true
    }

    /// Stops tracking a window that no longer exists, releasing its
    /// representation first.
    pub fn window_destroyed(&mut self, handle: WindowHandle) -> bool {
        let Some(idx) = self.index_of(handle) else {
            tracing::debug!("window_destroyed for untracked window {handle}");
            return false;
        };
        let mut window = self.windows.remove(idx);
        if let Some(mut rep) = window.representation.take() {
            self.reps.detach(&mut rep);
        }
        if window.minimized {
            tracing::info!("minimized window {handle} {:?} closed", window.title);
        } else {
            tracing::debug!("-window {handle}");
        }
        true
    }

    /// Re-reads title and visibility of a tracked window.
    ///
    /// A new title is pushed into the tray tooltip. A minimized window
    /// that turns up user-visible was restored by someone else, so it
    /// drops its representation and returns to `Normal`.
    pub fn window_changed(&mut self, handle: WindowHandle) {
        let Some(idx) = self.index_of(handle) else {
            tracing::debug!("window_changed for untracked window {handle}");
            return;
        };
        let state = self.host.state(handle);
        let window = &mut self.windows[idx];

        if window.title != state.title {
            window.title = state.title;
            if let Some(rep) = &window.representation {
                self.reps.set_title(rep, &window.title);
            }
        }

        if !window.minimized {
            window.visible = state.visible;
        } else if state.visible {
            tracing::info!("minimized window {handle} was shown externally");
            if let Some(mut rep) = window.representation.take() {
                self.reps.detach(&mut rep);
            }
            window.minimized = false;
            window.visible = true;
        }
    }

    /// Feeds one sweep difference into the matching entry point.
    pub fn apply(&mut self, change: &WindowChange) {
        match change {
            WindowChange::Added(h) => {
                self.window_added(*h);
            }
            WindowChange::Removed(h) => {
                self.window_destroyed(*h);
            }
            WindowChange::Changed(h) => self.window_changed(*h),
        }
    }

    /// Hides a `Normal` window and gives it the representation the
    /// current placement policy calls for.
    ///
    /// Unknown, hidden or already minimized windows are a no-op. If the tray
    /// icon cannot be created the window stays minimized and the error
    /// is returned.
    pub fn minimize(&mut self, handle: WindowHandle) -> Result<()> {
        let Some(idx) = self.index_of(handle) else {
            tracing::debug!("minimize: {handle} is not tracked");
            return Ok(());
        };
        if self.windows[idx].minimized {
            tracing::debug!("minimize: {handle} is already minimized");
            return Ok(());
        }
        if !self.windows[idx].visible {
            tracing::debug!("minimize: {handle} is not user-visible");
            return Ok(());
        }

        if let Err(e) = self.host.minimize_and_hide(handle) {
            tracing::warn!("hiding {handle} failed: {e}");
        }
        if self.host.is_user_visible(handle) {
            tracing::warn!("{handle} is still visible after minimize");
        }

        self.minimize_seq += 1;
        let window = &mut self.windows[idx];
        window.minimized = true;
        window.visible = false;
        window.minimized_seq = self.minimize_seq;
        tracing::info!("minimized {handle} {:?}", window.title);

        let mut rep = window.representation.take().unwrap_or_default();
        let result = self
            .reps
            .reconcile(handle, &window.title, self.placement, &mut rep);
        window.representation = (!rep.is_empty()).then_some(rep);
        if let Err(e) = &result {
            tracing::warn!("{handle} minimized without tray icon: {e}");
        }
        result
    }

    /// Shows a minimized window again and releases its representation.
    ///
    /// Returns `false` for unknown or non-minimized windows.
    pub fn restore(&mut self, handle: WindowHandle) -> bool {
        let Some(idx) = self.index_of(handle) else {
            tracing::debug!("restore: {handle} is not tracked");
            return false;
        };
        if !self.windows[idx].minimized {
            tracing::debug!("restore: {handle} is not minimized");
            return false;
        }

        if let Err(e) = self.host.show_hidden(handle) {
            tracing::warn!("showing {handle} failed: {e}");
        }
        if let Err(e) = self.host.show_and_restore(handle) {
            tracing::warn!("restoring {handle} failed: {e}");
        }
        if let Err(e) = self.host.set_foreground(handle) {
            tracing::debug!("activating {handle} failed: {e}");
        }

        let window = &mut self.windows[idx];
        if let Some(mut rep) = window.representation.take() {
            self.reps.detach(&mut rep);
        }
        window.minimized = false;
        window.visible = true;
        tracing::info!("restored {handle} {:?}", window.title);
        true
    }

    /// Restores every minimized window, e.g. before exiting.
    pub fn restore_all(&mut self) {
        for handle in self.all_minimized() {
            self.restore(handle);
        }
    }

    /// Switches the placement policy and retrofits every minimized
    /// window to it.
    ///
    /// Windows are updated independently; failures are logged and
    /// returned without stopping the others.
    pub fn update_minimize_placement(&mut self, policy: PlacementPolicy) -> Vec<Error> {
        if policy != self.placement {
            tracing::info!("placement {:?} -> {policy:?}", self.placement);
        }
        self.placement = policy;

        let mut errors = Vec::new();
        for window in self.windows.iter_mut().filter(|w| w.minimized) {
            let mut rep = window.representation.take().unwrap_or_default();
            if let Err(e) = self
                .reps
                .reconcile(window.handle, &window.title, policy, &mut rep)
            {
                tracing::warn!("updating representation of {} failed: {e}", window.handle);
                errors.push(e);
            }
            window.representation = (!rep.is_empty()).then_some(rep);
        }
        errors
    }
}

impl Drop for Tracker {
    /// Shows every window still hidden by the tracker.
    fn drop(&mut self) {
        self.restore_all();
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
