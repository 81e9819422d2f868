use super::representation::{PlacementPolicy, TRAY_ID_FIRST};
use super::*;
use crate::snapshot::Enumerator;
use crate::testing::{FakeHost, FakeTray};

const A: WindowHandle = WindowHandle(0xA0);
const B: WindowHandle = WindowHandle(0xB0);
const C: WindowHandle = WindowHandle(0xC0);

fn tracker(policy: PlacementPolicy) -> (Tracker, FakeHost, FakeTray) {
    let host = FakeHost::new();
    let tray = FakeTray::new();
    let tracker = Tracker::new(Box::new(host.clone()), Box::new(tray.clone()), policy);
    (tracker, host, tray)
}

fn open_all(tracker: &mut Tracker, host: &FakeHost, handles: &[WindowHandle]) {
    for &h in handles {
        host.open(h, "App", &format!("window {h}"));
        tracker.window_added(h);
    }
}

#[test]
fn added_windows_start_normal() {
    // Arrange
    let (mut tracker, host, _) = tracker(PlacementPolicy::Tray);

    // Act
    open_all(&mut tracker, &host, &[A, B]);

    // Assert
    assert_eq!(tracker.len(), 2);
    let a = tracker.get(A).unwrap();
    assert!(a.is_visible());
    assert!(!a.is_minimized());
    assert!(a.representation().is_none());
    assert_eq!(tracker.all_visible(), vec![A, B]);
}

#[test]
fn duplicate_add_is_a_no_op() {
    // Arrange
    let (mut tracker, host, _) = tracker(PlacementPolicy::Tray);
    open_all(&mut tracker, &host, &[A]);

    // Act
    let added = tracker.window_added(A);

    // Assert
    assert!(!added);
    assert_eq!(tracker.len(), 1);
}

#[test]
fn sweep_order_does_not_change_the_tracked_set() {
    // Arrange
    let (mut forward, host_f, _) = tracker(PlacementPolicy::Tray);
    let (mut backward, host_b, _) = tracker(PlacementPolicy::Tray);
    for h in [A, B, C] {
        host_f.open(h, "App", "t");
        host_b.open(h, "App", "t");
    }

    // Act
    for h in [A, B, C] {
        forward.window_added(h);
    }
    for h in [C, B, A] {
        backward.window_added(h);
    }
    forward.window_destroyed(B);
    backward.window_destroyed(B);

    // Assert
    let mut f: Vec<_> = forward.windows().map(TrackedWindow::handle).collect();
    let mut b: Vec<_> = backward.windows().map(TrackedWindow::handle).collect();
    f.sort();
    b.sort();
    assert_eq!(f, b);
    assert_eq!(f, vec![A, C]);
}

#[test]
fn minimize_attaches_tray_icon() {
    // Arrange
    let (mut tracker, host, tray) = tracker(PlacementPolicy::Tray);
    open_all(&mut tracker, &host, &[A]);

    // Act
    tracker.minimize(A).unwrap();

    // Assert
    let a = tracker.get(A).unwrap();
    assert!(a.is_minimized());
    assert!(!a.is_visible());
    assert_eq!(a.representation().unwrap().tray_id(), Some(TRAY_ID_FIRST));
    assert!(a.representation().unwrap().menu_id().is_none());
    assert!(!host.is_shown(A));
    assert_eq!(tray.live_icons(), 1);
    assert_eq!(tracker.from_tray_id(TRAY_ID_FIRST), Some(A));
}

#[test]
fn minimize_twice_is_idempotent() {
    // Arrange
    let (mut tracker, host, tray) = tracker(PlacementPolicy::TrayAndMenu);
    open_all(&mut tracker, &host, &[A]);
    tracker.minimize(A).unwrap();

    // Act
    tracker.minimize(A).unwrap();

    // Assert
    assert_eq!(host.calls("minimize_and_hide", A), 1);
    assert_eq!(tray.created(), 1);
    assert_eq!(tracker.all_minimized(), vec![A]);
}

#[test]
fn minimize_of_untracked_window_does_nothing() {
    // Arrange
    let (mut tracker, host, tray) = tracker(PlacementPolicy::Tray);
    host.open(A, "App", "t");

    // Act
    let result = tracker.minimize(A);

    // Assert
    assert!(result.is_ok());
    assert_eq!(host.calls("minimize_and_hide", A), 0);
    assert_eq!(tray.created(), 0);
}

#[test]
fn minimize_then_restore_round_trips() {
    // Arrange
    let (mut tracker, host, tray) = tracker(PlacementPolicy::TrayAndMenu);
    open_all(&mut tracker, &host, &[A]);
    tracker.minimize(A).unwrap();

    // Act
    let restored = tracker.restore(A);

    // Assert
    assert!(restored);
    let a = tracker.get(A).unwrap();
    assert!(!a.is_minimized());
    assert!(a.is_visible());
    assert!(a.representation().is_none());
    assert!(host.is_shown(A));
    assert_eq!(host.foreground_window(), Some(A));
    assert_eq!(tray.live_icons(), 0);
    assert!(tracker.from_tray_id(TRAY_ID_FIRST).is_none());
}

#[test]
fn restore_of_normal_window_is_a_no_op() {
    // Arrange
    let (mut tracker, host, _) = tracker(PlacementPolicy::Tray);
    open_all(&mut tracker, &host, &[A]);

    // Act
    let restored = tracker.restore(A);

    // Assert
    assert!(!restored);
    assert_eq!(host.calls("show_and_restore", A), 0);
}

#[test]
fn restore_still_completes_when_foreground_is_refused() {
    // Arrange
    let (mut tracker, host, tray) = tracker(PlacementPolicy::Tray);
    open_all(&mut tracker, &host, &[A]);
    tracker.minimize(A).unwrap();
    host.fail_foreground(true);

    // Act
    let restored = tracker.restore(A);

    // Assert
    assert!(restored);
    assert!(!tracker.get(A).unwrap().is_minimized());
    assert_eq!(tray.live_icons(), 0);
}

#[test]
fn hidden_window_is_not_minimized() {
    // Arrange
    let (mut tracker, host, tray) = tracker(PlacementPolicy::TrayAndMenu);
    host.open_hidden(A, "Shell_TrayWnd", "");
    tracker.window_added(A);

    // Act
    let result = tracker.minimize(A);

    // Assert
    assert!(result.is_ok());
    let a = tracker.get(A).unwrap();
    assert!(!a.is_minimized());
    assert!(a.representation().is_none());
    assert_eq!(tray.created(), 0);
    assert_eq!(host.calls("minimize_and_hide", A), 0);
}

#[test]
fn window_still_visible_after_hide_is_still_minimized() {
    // Arrange
    let (mut tracker, host, _) = tracker(PlacementPolicy::Tray);
    open_all(&mut tracker, &host, &[A]);
    host.refuse_hide(A);

    // Act
    tracker.minimize(A).unwrap();

    // Assert
    let a = tracker.get(A).unwrap();
    assert!(a.is_minimized());
    assert!(!a.is_visible());
}

#[test]
fn tray_failure_leaves_window_minimized_and_returns_error() {
    // Arrange
    let (mut tracker, host, tray) = tracker(PlacementPolicy::Tray);
    open_all(&mut tracker, &host, &[A]);
    tray.fail_create(true);

    // Act
    let result = tracker.minimize(A);

    // Assert
    assert_eq!(result.unwrap_err().code(), crate::ErrorCode::Representation);
    let a = tracker.get(A).unwrap();
    assert!(a.is_minimized());
    assert!(a.representation().is_none());
    assert_eq!(tracker.last_minimized(), Some(A));
}

#[test]
fn closing_minimized_window_releases_its_icon() {
    // Arrange
    let (mut tracker, host, tray) = tracker(PlacementPolicy::Tray);
    open_all(&mut tracker, &host, &[A]);
    tracker.minimize(A).unwrap();

    // Act
    host.close(A);
    let removed = tracker.window_destroyed(A);

    // Assert
    assert!(removed);
    assert!(!tracker.contains(A));
    assert_eq!(tray.live_icons(), 0);
    assert_eq!(tray.destroyed(), 1);
    assert!(tracker.from_tray_id(TRAY_ID_FIRST).is_none());
}

#[test]
fn tooltip_follows_title_changes() {
    // Arrange
    let (mut tracker, host, tray) = tracker(PlacementPolicy::Tray);
    open_all(&mut tracker, &host, &[A]);
    tracker.minimize(A).unwrap();

    // Act
    host.set_title(A, "Inbox (4)");
    tracker.window_changed(A);

    // Assert
    assert_eq!(tracker.get(A).unwrap().title(), "Inbox (4)");
    assert_eq!(tray.tooltip(TRAY_ID_FIRST).as_deref(), Some("Inbox (4)"));
}

#[test]
fn visibility_change_on_normal_window_only_updates_flag() {
    // Arrange
    let (mut tracker, host, tray) = tracker(PlacementPolicy::Tray);
    open_all(&mut tracker, &host, &[A]);

    // Act
    host.set_shown(A, false);
    tracker.window_changed(A);

    // Assert
    let a = tracker.get(A).unwrap();
    assert!(!a.is_visible());
    assert!(!a.is_minimized());
    assert_eq!(tray.created(), 0);
}

#[test]
fn external_restore_drops_representation() {
    // Arrange
    let (mut tracker, host, tray) = tracker(PlacementPolicy::Tray);
    open_all(&mut tracker, &host, &[A]);
    tracker.minimize(A).unwrap();

    // Act
    host.set_shown(A, true);
    tracker.window_changed(A);

    // Assert
    let a = tracker.get(A).unwrap();
    assert!(!a.is_minimized());
    assert!(a.is_visible());
    assert!(a.representation().is_none());
    assert_eq!(tray.live_icons(), 0);
}

#[test]
fn tray_to_menu_migration_releases_icons() {
    // Arrange
    let (mut tracker, host, tray) = tracker(PlacementPolicy::Tray);
    open_all(&mut tracker, &host, &[A, B]);
    tracker.minimize(A).unwrap();
    tracker.minimize(B).unwrap();

    // Act
    let errors = tracker.update_minimize_placement(PlacementPolicy::Menu);

    // Assert
    assert!(errors.is_empty());
    assert_eq!(tray.live_icons(), 0);
    assert!(tracker.from_tray_id(TRAY_ID_FIRST).is_none());
    assert!(tracker.from_tray_id(TRAY_ID_FIRST + 1).is_none());
    for h in [A, B] {
        let rep = tracker.get(h).unwrap().representation().unwrap();
        assert!(rep.tray_id().is_none());
        let menu = rep.menu_id().unwrap();
        assert_eq!(tracker.from_menu_id(menu), Some(h));
    }
}

#[test]
fn placement_update_is_idempotent() {
    // Arrange
    let (mut tracker, host, tray) = tracker(PlacementPolicy::Tray);
    open_all(&mut tracker, &host, &[A, B]);
    tracker.minimize(A).unwrap();
    tracker.minimize(B).unwrap();
    tracker.update_minimize_placement(PlacementPolicy::TrayAndMenu);
    let menu_ids: Vec<_> = [A, B]
        .iter()
        .map(|h| tracker.get(*h).unwrap().representation().unwrap().menu_id())
        .collect();

    // Act
    tracker.update_minimize_placement(PlacementPolicy::TrayAndMenu);

    // Assert
    assert_eq!(tray.created(), 2);
    assert_eq!(tray.destroyed(), 0);
    let again: Vec<_> = [A, B]
        .iter()
        .map(|h| tracker.get(*h).unwrap().representation().unwrap().menu_id())
        .collect();
    assert_eq!(menu_ids, again);
}

#[test]
fn placement_update_leaves_normal_windows_alone() {
    // Arrange
    let (mut tracker, host, tray) = tracker(PlacementPolicy::Menu);
    open_all(&mut tracker, &host, &[A]);

    // Act
    tracker.update_minimize_placement(PlacementPolicy::TrayAndMenu);

    // Assert
    assert!(tracker.get(A).unwrap().representation().is_none());
    assert_eq!(tray.created(), 0);
    assert_eq!(tracker.placement(), PlacementPolicy::TrayAndMenu);
}

#[test]
fn last_minimized_follows_minimize_order() {
    // Arrange
    let (mut tracker, host, _) = tracker(PlacementPolicy::Tray);
    open_all(&mut tracker, &host, &[A, B, C]);

    // Act
    tracker.minimize(C).unwrap();
    tracker.minimize(A).unwrap();

    // Assert
    assert_eq!(tracker.last_minimized(), Some(A));
    tracker.restore(A);
    assert_eq!(tracker.last_minimized(), Some(C));
    tracker.restore(C);
    assert_eq!(tracker.last_minimized(), None);
}

#[test]
fn index_queries_skip_other_states() {
    // Arrange
    let (mut tracker, host, _) = tracker(PlacementPolicy::Menu);
    open_all(&mut tracker, &host, &[A, B, C]);

    // Act
    tracker.minimize(B).unwrap();

    // Assert
    assert_eq!(tracker.visible_index(0), Some(A));
    assert_eq!(tracker.visible_index(1), Some(C));
    assert_eq!(tracker.visible_index(2), None);
    assert_eq!(tracker.minimized_index(0), Some(B));
    assert_eq!(tracker.minimized_index(1), None);
}

#[test]
fn apply_feeds_sweep_changes() {
    // Arrange
    let (mut tracker, host, tray) = tracker(PlacementPolicy::Tray);
    let mut enumerator = Enumerator::new();
    host.open(A, "App", "a");
    host.open(B, "App", "b");
    for change in enumerator.sweep(&host) {
        tracker.apply(&change);
    }
    tracker.minimize(B).unwrap();

    // Act
    host.close(B);
    host.set_title(A, "renamed");
    let changes = enumerator.sweep(&host);
    for change in &changes {
        tracker.apply(change);
    }

    // Assert
    assert_eq!(tracker.len(), 1);
    assert_eq!(tracker.get(A).unwrap().title(), "renamed");
    assert_eq!(tray.live_icons(), 0);
}

#[test]
fn dropping_tracker_restores_hidden_windows() {
    // Arrange
    let (mut tracker, host, tray) = tracker(PlacementPolicy::Tray);
    open_all(&mut tracker, &host, &[A, B]);
    tracker.minimize(A).unwrap();
    tracker.minimize(B).unwrap();

    // Act
    drop(tracker);

    // Assert
    assert!(host.is_shown(A));
    assert!(host.is_shown(B));
    assert_eq!(tray.live_icons(), 0);
}
