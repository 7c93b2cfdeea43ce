#![allow(clippy::float_cmp)]

use super::*;

fn surface_id() -> SurfaceId {
    Uuid::new_v4()
}

// =============================================================
// NaturalSize
// =============================================================

#[test]
fn measured_dims() {
    let n = NaturalSize::Measured { w: 1000.0, h: 500.0 };
    assert_eq!(n.dims(), (1000.0, 500.0));
    assert!(!n.is_estimated());
}

#[test]
fn assumed_is_sixteen_nine_estimate() {
    let n = NaturalSize::assumed();
    assert!(n.is_estimated());
    let (w, h) = n.dims();
    assert_eq!(w / h, 16.0 / 9.0);
}

// =============================================================
// ProbeTracker
// =============================================================

#[test]
fn new_tracker_has_no_live_probe() {
    let mut tracker = ProbeTracker::new();
    let token = ProbeTracker::new().begin(surface_id());
    assert!(tracker.take(token).is_none());
}

#[test]
fn begin_take_round_trip() {
    let mut tracker = ProbeTracker::new();
    let surface = surface_id();
    let token = tracker.begin(surface);
    assert!(tracker.is_current(token));
    assert_eq!(tracker.take(token), Some(surface));
    assert!(!tracker.is_current(token));
}

#[test]
fn take_consumes_probe() {
    let mut tracker = ProbeTracker::new();
    let token = tracker.begin(surface_id());
    tracker.take(token);
    assert!(tracker.take(token).is_none());
}

#[test]
fn superseded_token_is_stale() {
    let mut tracker = ProbeTracker::new();
    let first = tracker.begin(surface_id());
    let second = tracker.begin(surface_id());
    assert!(!tracker.is_current(first));
    assert!(tracker.take(first).is_none());
    // The replacement is still live after the stale take.
    assert!(tracker.is_current(second));
}

#[test]
fn cancel_drops_live_probe() {
    let mut tracker = ProbeTracker::new();
    let token = tracker.begin(surface_id());
    tracker.cancel();
    assert!(tracker.take(token).is_none());
}
