//! Enumeration sweeps and the diff between two of them.

use std::collections::HashMap;

use crate::host::WindowHost;
use crate::{WindowHandle, WindowState};

/// The state of every top-level window at one point in time.
pub type Snapshot = HashMap<WindowHandle, WindowState>;

/// One difference between two consecutive snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowChange {
    Added(WindowHandle),
    Removed(WindowHandle),
    /// Title or visibility differs from the previous sweep.
    Changed(WindowHandle),
}

/// Produces snapshots and remembers the last successful one.
#[derive(Debug, Default)]
pub struct Enumerator {
    last: Snapshot,
}

impl Enumerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last successful snapshot.
    pub fn last(&self) -> &Snapshot {
        &self.last
    }

    /// Takes a fresh snapshot and returns it together with the changes
    /// since the previous one.
    ///
    /// If the host enumeration fails, the previous snapshot is kept,
    /// a warning is logged and no changes are reported.
    pub fn sweep(&mut self, host: &dyn WindowHost) -> Vec<WindowChange> {
        let handles = match host.enumerate_top_level() {
            Ok(h) => h,
            Err(e) => {
                tracing::warn!("window enumeration failed, keeping previous snapshot: {e}");
                return Vec::new();
            }
        };

        let next: Snapshot = handles.into_iter().map(|h| (h, host.state(h))).collect();
        let changes = diff(&self.last, &next);
        self.last = next;
        changes
    }

    /// Returns the current snapshot, refreshing it first.
    pub fn snapshot(&mut self, host: &dyn WindowHost) -> &Snapshot {
        self.sweep(host);
        &self.last
    }
}

/// Computes the changes that turn `previous` into `next`.
///
/// Removals come first so that a handle value reused by the OS within
/// one poll interval is seen as close-then-open rather than a change.
/// Within each group, entries are sorted by handle so the output is
/// deterministic.
pub fn diff(previous: &Snapshot, next: &Snapshot) -> Vec<WindowChange> {
    let mut removed: Vec<WindowHandle> = previous
        .keys()
        .filter(|h| !next.contains_key(h))
        .copied()
        .collect();
    let mut added = Vec::new();
    let mut changed = Vec::new();
    for (handle, state) in next {
        match previous.get(handle) {
            None => added.push(*handle),
            Some(old) if old != state => changed.push(*handle),
            Some(_) => {}
        }
    }
    removed.sort_unstable();
    added.sort_unstable();
    changed.sort_unstable();

    removed
        .into_iter()
        .map(WindowChange::Removed)
        .chain(added.into_iter().map(WindowChange::Added))
        .chain(changed.into_iter().map(WindowChange::Changed))
        .collect()
}
