#![allow(clippy::float_cmp)]

use super::*;

use crate::geometry::Rect;
use crate::surface::Media;

// =============================================================
// Helpers
// =============================================================

/// 300×400 wrapper holding a 1000×500 image: cover display is 800×400,
/// so only the x axis is pannable (min −500).
fn panning_fixture() -> (Surface, NodeId, NodeId) {
    let mut s = Surface::new();
    let body = s.body();
    s.set_rect(body, Rect::new(0.0, 0.0, 1080.0, 1350.0));
    let wrapper = s.create_element("div");
    s.set_rect(wrapper, Rect::new(0.0, 0.0, 300.0, 400.0));
    s.append_child(body, wrapper);
    let img = s.create_element("img");
    s.set_media(img, Media::Image { src: "a.jpg".into(), natural: Some((1000.0, 500.0)) });
    s.set_rect(img, Rect::new(0.0, 0.0, 300.0, 400.0));
    s.append_child(wrapper, img);
    (s, wrapper, img)
}

fn image_session(s: &Surface, wrapper: NodeId, img: NodeId, pointer: Point) -> DragSession {
    match begin(s, MediaKind::Image, wrapper, img, NaturalSize::Measured { w: 1000.0, h: 500.0 }, pointer) {
        Ok(session) => session,
        Err(e) => panic!("session should start: {e:?}"),
    }
}

// =============================================================
// begin
// =============================================================

#[test]
fn begin_computes_cover_geometry() {
    let (s, wrapper, img) = panning_fixture();
    let session = image_session(&s, wrapper, img, Point::new(150.0, 200.0));
    assert_eq!(session.display_w, 800.0);
    assert_eq!(session.display_h, 400.0);
    assert_eq!(session.min_left, -500.0);
    assert_eq!(session.min_top, 0.0);
}

#[test]
fn begin_starts_centered_by_default() {
    let (s, wrapper, img) = panning_fixture();
    let session = image_session(&s, wrapper, img, Point::new(150.0, 200.0));
    assert_eq!(session.left, -250.0);
    assert_eq!(session.top, 0.0);
    assert!(!session.moved);
}

#[test]
fn begin_reads_existing_position() {
    let (mut s, wrapper, img) = panning_fixture();
    s.set_style(img, "object-position", "0% 50%");
    let session = image_session(&s, wrapper, img, Point::new(150.0, 200.0));
    assert_eq!(session.left, 0.0);
}

#[test]
fn begin_rejects_zero_size_container() {
    let (mut s, wrapper, img) = panning_fixture();
    s.set_rect(wrapper, Rect::new(0.0, 0.0, 0.0, 0.0));
    let result = begin(
        &s,
        MediaKind::Image,
        wrapper,
        img,
        NaturalSize::Measured { w: 1000.0, h: 500.0 },
        Point::new(0.0, 0.0),
    );
    assert_eq!(result.err(), Some(NotReady::ZeroSizeContainer));
}

#[test]
fn begin_with_estimated_natural_size() {
    let (s, wrapper, img) = panning_fixture();
    let result = begin(&s, MediaKind::Image, wrapper, img, NaturalSize::assumed(), Point::new(0.0, 0.0));
    let Ok(session) = result else {
        panic!("estimated sessions must start");
    };
    assert!(session.natural.is_estimated());
    assert!(session.display_w >= 300.0);
    assert!(session.display_h >= 400.0);
}

// =============================================================
// apply_move
// =============================================================

#[test]
fn move_pans_and_writes_object_position() {
    let (mut s, wrapper, img) = panning_fixture();
    let mut session = image_session(&s, wrapper, img, Point::new(150.0, 200.0));
    session.apply_move(&mut s, Point::new(100.0, 200.0));
    assert_eq!(session.left, -300.0);
    assert_eq!(session.top, 0.0);
    assert!(session.moved);
    assert_eq!(s.style(img, "object-position"), Some("60% 50%"));
}

#[test]
fn move_clamps_at_leading_edge() {
    let (mut s, wrapper, img) = panning_fixture();
    let mut session = image_session(&s, wrapper, img, Point::new(150.0, 200.0));
    session.apply_move(&mut s, Point::new(800.0, 200.0));
    assert_eq!(session.left, 0.0);
    assert_eq!(s.style(img, "object-position"), Some("0% 50%"));
}

#[test]
fn move_clamps_at_trailing_edge() {
    let (mut s, wrapper, img) = panning_fixture();
    let mut session = image_session(&s, wrapper, img, Point::new(150.0, 200.0));
    session.apply_move(&mut s, Point::new(-800.0, 200.0));
    assert_eq!(session.left, -500.0);
    assert_eq!(s.style(img, "object-position"), Some("100% 50%"));
}

#[test]
fn move_on_unpannable_axis_stays_centered() {
    let (mut s, wrapper, img) = panning_fixture();
    let mut session = image_session(&s, wrapper, img, Point::new(150.0, 200.0));
    session.apply_move(&mut s, Point::new(150.0, 350.0));
    assert_eq!(session.top, 0.0);
    assert_eq!(s.style(img, "object-position"), Some("50% 50%"));
}

#[test]
fn each_move_supersedes_the_last() {
    let (mut s, wrapper, img) = panning_fixture();
    let mut session = image_session(&s, wrapper, img, Point::new(150.0, 200.0));
    session.apply_move(&mut s, Point::new(100.0, 200.0));
    session.apply_move(&mut s, Point::new(140.0, 200.0));
    // Deltas are measured from session start, not from the previous move.
    assert_eq!(session.left, -260.0);
    assert_eq!(s.style(img, "object-position"), Some("52% 50%"));
}

#[test]
fn background_move_writes_background_position() {
    let mut s = Surface::new();
    let body = s.body();
    s.set_rect(body, Rect::new(0.0, 0.0, 300.0, 400.0));
    s.set_base_style(body, "background-image", "url(bg.jpg)");
    let result = begin(
        &s,
        MediaKind::Background,
        body,
        body,
        NaturalSize::Measured { w: 1000.0, h: 500.0 },
        Point::new(150.0, 200.0),
    );
    let Ok(mut session) = result else {
        panic!("background session should start");
    };
    session.apply_move(&mut s, Point::new(100.0, 200.0));
    assert_eq!(s.style(body, "background-position-x"), Some("60%"));
    assert_eq!(s.style(body, "background-position-y"), Some("50%"));
}

// =============================================================
// finish
// =============================================================

#[test]
fn finish_reads_back_applied_position() {
    let (mut s, wrapper, img) = panning_fixture();
    let mut session = image_session(&s, wrapper, img, Point::new(150.0, 200.0));
    session.apply_move(&mut s, Point::new(100.0, 200.0));
    let patch = session.finish(&s);
    assert_eq!(patch.object_position.as_deref(), Some("60% 50%"));
    assert!(patch.background_position_x.is_none());
    assert!(patch.height.is_none());
}

#[test]
fn finish_background_patch_fields() {
    let mut s = Surface::new();
    let body = s.body();
    s.set_rect(body, Rect::new(0.0, 0.0, 300.0, 400.0));
    let result = begin(
        &s,
        MediaKind::Background,
        body,
        body,
        NaturalSize::Measured { w: 1000.0, h: 500.0 },
        Point::new(150.0, 200.0),
    );
    let Ok(mut session) = result else {
        panic!("background session should start");
    };
    session.apply_move(&mut s, Point::new(200.0, 200.0));
    let patch = session.finish(&s);
    assert_eq!(patch.background_position_x.as_deref(), Some("40%"));
    assert_eq!(patch.background_position_y.as_deref(), Some("50%"));
    assert!(patch.object_position.is_none());
}

#[test]
fn finish_without_move_persists_current_position() {
    let (mut s, wrapper, img) = panning_fixture();
    s.set_style(img, "object-position", "25% 50%");
    let session = image_session(&s, wrapper, img, Point::new(150.0, 200.0));
    let patch = session.finish(&s);
    assert_eq!(patch.object_position.as_deref(), Some("25% 50%"));
}

// =============================================================
// Staleness
// =============================================================

#[test]
fn session_matches_only_its_surface_generation() {
    let (s, wrapper, img) = panning_fixture();
    let session = image_session(&s, wrapper, img, Point::new(150.0, 200.0));
    assert!(session.matches(&s));
    let other = Surface::new();
    assert!(!session.matches(&other));
}

// =============================================================
// Percent formatting
// =============================================================

#[test]
fn percent_formatting_trims_and_rounds() {
    assert_eq!(fmt_percent(60.0), "60%");
    assert_eq!(fmt_percent(0.0), "0%");
    assert_eq!(fmt_percent(33.333_333), "33.33%");
    assert_eq!(fmt_percent(66.666_666), "66.67%");
}
