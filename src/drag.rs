//! Drag engine: converts pointer deltas into clamped position updates on
//! the active media element.
//!
//! A session is created on pointer-down over classified media, mutated on
//! every pointer-move, and consumed on pointer-up. Offsets are pixel
//! positions of the media's leading edge relative to the container: the
//! maximum is always 0 and the minimum is `container − display`, so the
//! media can never reveal empty container space.

#[cfg(test)]
#[path = "drag_test.rs"]
mod drag_test;

use indextree::NodeId;

use crate::classify::MediaKind;
use crate::geometry::{clamp, cover_fit, min_offset, offset_to_percent, percent_to_offset, Point};
use crate::persist::StylePatch;
use crate::probe::NaturalSize;
use crate::surface::{parse_percent, parse_position_pair, StyleView, Surface, SurfaceId};

/// Why a drag session could not start. Silent by design: the container is
/// treated as "not ready yet" rather than faulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotReady {
    /// The container box has zero width or height (not yet laid out).
    ZeroSizeContainer,
}

/// An in-progress reposition of one media element.
#[derive(Debug, Clone)]
pub struct DragSession {
    pub kind: MediaKind,
    /// Generation id of the owning surface; stale events are ignored.
    pub surface: SurfaceId,
    /// The container being panned within (wrapper, or background host).
    pub container: NodeId,
    /// The element whose position style is written.
    pub target: NodeId,
    pub container_w: f64,
    pub container_h: f64,
    pub natural: NaturalSize,
    pub display_w: f64,
    pub display_h: f64,
    pub min_left: f64,
    pub min_top: f64,
    start_left: f64,
    start_top: f64,
    pub left: f64,
    pub top: f64,
    start: Point,
    pub moved: bool,
}

/// Begin a session for media panned inside `container`, writing position
/// styles to `target`.
pub fn begin(
    surface: &Surface,
    kind: MediaKind,
    container: NodeId,
    target: NodeId,
    natural: NaturalSize,
    pointer: Point,
) -> Result<DragSession, NotReady> {
    let container_rect = surface.rect(container);
    if container_rect.is_empty() {
        return Err(NotReady::ZeroSizeContainer);
    }
    let (container_w, container_h) = (container_rect.width, container_rect.height);

    let (natural_w, natural_h) = natural.dims();
    let fit = cover_fit(natural_w, natural_h, container_w, container_h, 0.0);

    let min_left = min_offset(container_w, fit.display_w);
    let min_top = min_offset(container_h, fit.display_h);

    let (percent_x, percent_y) = current_position(surface, kind, target);
    let start_left = clamp(percent_to_offset(-min_left, percent_x), min_left, 0.0);
    let start_top = clamp(percent_to_offset(-min_top, percent_y), min_top, 0.0);

    Ok(DragSession {
        kind,
        surface: surface.id(),
        container,
        target,
        container_w,
        container_h,
        natural,
        display_w: fit.display_w,
        display_h: fit.display_h,
        min_left,
        min_top,
        start_left,
        start_top,
        left: start_left,
        top: start_top,
        start: pointer,
        moved: false,
    })
}

impl DragSession {
    /// Whether this session belongs to `surface`'s current generation.
    #[must_use]
    pub fn matches(&self, surface: &Surface) -> bool {
        self.surface == surface.id()
    }

    /// Apply a pointer move: clamp the new offset per axis and write the
    /// resulting percentages as live position style. Touches style only.
    pub fn apply_move(&mut self, surface: &mut Surface, pointer: Point) {
        let dx = pointer.x - self.start.x;
        let dy = pointer.y - self.start.y;
        self.left = clamp(self.start_left + dx, self.min_left, 0.0);
        self.top = clamp(self.start_top + dy, self.min_top, 0.0);
        self.moved = true;

        let percent_x = offset_to_percent(-self.min_left, self.left);
        let percent_y = offset_to_percent(-self.min_top, self.top);
        if self.kind.is_object_positioned() {
            let value = format!("{} {}", fmt_percent(percent_x), fmt_percent(percent_y));
            surface.set_style(self.target, "object-position", &value);
        } else {
            surface.set_style(self.target, "background-position-x", &fmt_percent(percent_x));
            surface.set_style(self.target, "background-position-y", &fmt_percent(percent_y));
        }
    }

    /// Read back the computed position that actually took effect and shape
    /// it as a persistence patch.
    #[must_use]
    pub fn finish(&self, surface: &Surface) -> StylePatch {
        let mut patch = StylePatch::default();
        let view = surface.get(self.target).map(StyleView::new);
        if self.kind.is_object_positioned() {
            patch.object_position = Some(match &view {
                Some(v) => v.object_position().to_string(),
                None => format!(
                    "{} {}",
                    fmt_percent(offset_to_percent(-self.min_left, self.left)),
                    fmt_percent(offset_to_percent(-self.min_top, self.top)),
                ),
            });
        } else {
            let (x, y) = match &view {
                Some(v) => (v.background_position_x().to_string(), v.background_position_y().to_string()),
                None => (
                    fmt_percent(offset_to_percent(-self.min_left, self.left)),
                    fmt_percent(offset_to_percent(-self.min_top, self.top)),
                ),
            };
            patch.background_position_x = Some(x);
            patch.background_position_y = Some(y);
        }
        patch
    }
}

/// The element's current fill position as percentages, defaulting to
/// centered when unparseable.
fn current_position(surface: &Surface, kind: MediaKind, target: NodeId) -> (f64, f64) {
    let Some(view) = surface.get(target).map(StyleView::new) else {
        return (50.0, 50.0);
    };
    if kind.is_object_positioned() {
        parse_position_pair(view.object_position()).unwrap_or((50.0, 50.0))
    } else {
        let x = parse_percent(view.background_position_x()).unwrap_or(50.0);
        let y = parse_percent(view.background_position_y()).unwrap_or(50.0);
        (x, y)
    }
}

/// Format a percentage rounded to two decimals, without trailing zeros.
fn fmt_percent(value: f64) -> String {
    // Adding 0.0 folds negative zero so a zero offset prints as "0%".
    let rounded = (value * 100.0).round() / 100.0 + 0.0;
    format!("{rounded}%")
}
