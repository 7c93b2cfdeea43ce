//! Resize engine: invisible edge strips for changing a container's height
//! by dragging.
//!
//! The strips live in viewport coordinates flush with the container's top
//! and bottom edges, independent of the container's own position context,
//! so they stay hittable even under `overflow: hidden`. The engine re-syncs
//! them to the container's live bounding box whenever layout or scroll
//! changes. Height changes are live-persisted on every move, not only on
//! release.

#[cfg(test)]
#[path = "resize_test.rs"]
mod resize_test;

use indextree::NodeId;

use crate::consts::{HANDLE_THICKNESS_PX, MAX_CONTAINER_HEIGHT_PX, MIN_CONTAINER_HEIGHT_PX};
use crate::geometry::{clamp, Point, Rect};
use crate::persist::StylePatch;
use crate::surface::{Surface, SurfaceId};
use crate::wrapper::{ContainerNormalizer, HEIGHT_MARKER_ATTR};

/// Which edge strip a resize grabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
}

/// The pair of edge strips attached to the active container.
///
/// At most one pair exists per surface; attaching to a new container
/// replaces (and thereby disposes) the previous pair.
#[derive(Debug, Clone)]
pub struct ResizeHandles {
    pub surface: SurfaceId,
    pub container: NodeId,
    top: Rect,
    bottom: Rect,
}

impl ResizeHandles {
    /// Attach a handle pair to `container`, synced to its current box.
    #[must_use]
    pub fn attach(surface: &Surface, container: NodeId) -> Self {
        let mut handles =
            Self { surface: surface.id(), container, top: Rect::default(), bottom: Rect::default() };
        handles.sync(surface);
        handles
    }

    /// Re-sync the strips to the container's live bounding box.
    pub fn sync(&mut self, surface: &Surface) {
        let rect = surface.rect(self.container);
        let half = HANDLE_THICKNESS_PX / 2.0;
        self.top = Rect::new(rect.x, rect.y - half, rect.width, HANDLE_THICKNESS_PX);
        self.bottom = Rect::new(rect.x, rect.bottom() - half, rect.width, HANDLE_THICKNESS_PX);
    }

    /// Which strip `point` hits, if either.
    #[must_use]
    pub fn hit(&self, point: Point) -> Option<Edge> {
        if self.top.contains(point) {
            Some(Edge::Top)
        } else if self.bottom.contains(point) {
            Some(Edge::Bottom)
        } else {
            None
        }
    }

    /// Whether the handles belong to `surface`'s current generation.
    #[must_use]
    pub fn matches(&self, surface: &Surface) -> bool {
        self.surface == surface.id()
    }

    #[must_use]
    pub fn top_rect(&self) -> Rect {
        self.top
    }

    #[must_use]
    pub fn bottom_rect(&self) -> Rect {
        self.bottom
    }
}

/// An in-progress height resize of one container.
#[derive(Debug, Clone)]
pub struct ResizeSession {
    pub surface: SurfaceId,
    pub container: NodeId,
    pub edge: Edge,
    pub start_height: f64,
    start_y: f64,
    pub height: f64,
}

/// Begin a resize from a strip pointer-down.
#[must_use]
pub fn begin(surface: &Surface, container: NodeId, edge: Edge, pointer: Point) -> ResizeSession {
    let height = surface.rect(container).height;
    ResizeSession { surface: surface.id(), container, edge, start_height: height, start_y: pointer.y, height }
}

impl ResizeSession {
    /// Whether this session belongs to `surface`'s current generation.
    #[must_use]
    pub fn matches(&self, surface: &Surface) -> bool {
        self.surface == surface.id()
    }

    /// Apply a pointer move: clamp the new height, apply it (overriding any
    /// conflicting sizing), persist it to the height marker, and resync the
    /// contained media fill. Returns the applied height.
    pub fn apply_move(&mut self, surface: &mut Surface, normalizer: &ContainerNormalizer, pointer_y: f64) -> f64 {
        let delta = pointer_y - self.start_y;
        // The container's top is never repositioned: the top edge grows by
        // encroaching upward as a symmetric height delta.
        let desired = match self.edge {
            Edge::Bottom => self.start_height + delta,
            Edge::Top => self.start_height - delta,
        };
        let height = clamp(desired, MIN_CONTAINER_HEIGHT_PX, MAX_CONTAINER_HEIGHT_PX);
        self.height = height;

        surface.set_style(self.container, "height", &format!("{height}px"));
        surface.set_attr(self.container, HEIGHT_MARKER_ATTR, &format!("{height}"));
        let rect = surface.rect(self.container);
        surface.set_rect(self.container, Rect { height, ..rect });
        normalizer.resync(surface, self.container);
        height
    }

    /// The height patch persisted for this session's current state.
    #[must_use]
    pub fn patch(&self) -> StylePatch {
        StylePatch { height: Some(format!("{}px", self.height)), ..StylePatch::default() }
    }
}
