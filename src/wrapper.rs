//! Container normalizer: guarantees every editable media element sits in a
//! structural wrapper with explicit position/overflow/size semantics.
//!
//! The wrapper's visual framing (border-radius, box-shadow, margin) is
//! captured once, before any rewrite, into a side table owned here, and is
//! re-asserted after every structural mutation. Losing framing across a
//! mutation is a regression, not an acceptable side effect. The wrapper
//! height is additionally persisted in a marker attribute so it survives
//! element replacement (image⇄video swaps rebuild the subtree).

#[cfg(test)]
#[path = "wrapper_test.rs"]
mod wrapper_test;

use std::collections::{HashMap, HashSet};

use indextree::NodeId;

use crate::consts::{FALLBACK_WRAPPER_HEIGHT_PX, FALLBACK_WRAPPER_WIDTH_PX};
use crate::geometry::Rect;
use crate::surface::{parse_px, StyleView, Surface, SurfaceId};

/// Marker attribute identifying a structural wrapper.
pub const WRAPPER_MARKER_ATTR: &str = "data-media-wrapper";

/// Attribute persisting the wrapper's height in pixels across rewrites.
pub const HEIGHT_MARKER_ATTR: &str = "data-media-height";

/// Class carried by image wrappers.
pub const WRAPPER_CLASS: &str = "media-wrapper";

/// Class carried by video wrappers.
pub const VIDEO_WRAPPER_CLASS: &str = "video-container";

/// Visual framing captured from an element before it was wrapped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreservedFraming {
    pub border_radius: String,
    pub box_shadow: String,
    pub margin: String,
}

/// Result of normalizing a media element into its wrapper.
#[derive(Debug, Clone, Copy)]
pub struct Wrapped {
    pub wrapper: NodeId,
    pub container_w: f64,
    pub container_h: f64,
}

/// Whether `node` carries the structural wrapper marker.
#[must_use]
pub fn is_wrapper(surface: &Surface, node: NodeId) -> bool {
    surface.attr(node, WRAPPER_MARKER_ATTR).is_some()
}

/// First child of `wrapper` that is a media element.
#[must_use]
pub fn media_child(surface: &Surface, wrapper: NodeId) -> Option<NodeId> {
    surface
        .children(wrapper)
        .into_iter()
        .find(|&child| surface.get(child).is_some_and(|el| el.media.is_some()))
}

/// Owns wrapper invariants: the preserved-framing side table and the watch
/// list of wrappers whose box changes require re-asserting media fill.
#[derive(Default)]
pub struct ContainerNormalizer {
    framing: HashMap<(SurfaceId, NodeId), PreservedFraming>,
    watched: HashSet<(SurfaceId, NodeId)>,
}

impl ContainerNormalizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure `media` sits inside a structural wrapper, synthesizing one if
    /// needed, and return the wrapper with its container dimensions.
    ///
    /// Idempotent with respect to framing: values are captured on first
    /// wrap and re-asserted, never re-derived from wrapper-influenced
    /// computed style. Returns `None` if `media` is gone or detached.
    pub fn ensure_wrapper(&mut self, surface: &mut Surface, media: NodeId) -> Option<Wrapped> {
        if !surface.contains(media) {
            return None;
        }
        let parent = surface.parent(media)?;

        let wrapper = if is_wrapper(surface, parent) {
            parent
        } else {
            let framing = capture_framing(surface, media);
            let wrapper = surface.create_element("div");
            surface.insert_before(media, wrapper);
            surface.detach(media);
            surface.append_child(wrapper, media);
            surface.add_class(wrapper, WRAPPER_CLASS);
            surface.set_attr(wrapper, WRAPPER_MARKER_ATTR, "1");
            self.framing.insert((surface.id(), wrapper), framing);
            wrapper
        };

        // First capture wins; a reused wrapper without an entry (e.g. one
        // re-rendered by the host) captures from the media element, not the
        // wrapper, so wrapper-applied styles never feed back in.
        let key = (surface.id(), wrapper);
        if !self.framing.contains_key(&key) {
            let framing = capture_framing(surface, media);
            self.framing.insert(key, framing);
        }

        let container_w = wrapper_width(surface, wrapper, media);
        let container_h = wrapper_height(surface, wrapper, media);
        surface.set_attr(wrapper, HEIGHT_MARKER_ATTR, &format!("{container_h}"));

        surface.set_style(wrapper, "position", "relative");
        surface.set_style(wrapper, "overflow", "hidden");
        surface.set_style(wrapper, "width", &format!("{container_w}px"));
        surface.set_style(wrapper, "height", &format!("{container_h}px"));
        // A transform or filter on the wrapper would corrupt viewport-based
        // geometry for the drag engine.
        surface.set_style(wrapper, "transform", "none");
        surface.set_style(wrapper, "filter", "none");
        self.assert_framing(surface, wrapper);

        let origin = anchored_origin(surface, wrapper, media);
        surface.set_rect(wrapper, Rect::new(origin.0, origin.1, container_w, container_h));
        assert_media_fill(surface, wrapper, media);

        self.watched.insert(key);
        Some(Wrapped { wrapper, container_w, container_h })
    }

    /// Preserved framing for `wrapper`, if captured.
    #[must_use]
    pub fn framing(&self, surface: SurfaceId, wrapper: NodeId) -> Option<&PreservedFraming> {
        self.framing.get(&(surface, wrapper))
    }

    /// Record framing captured outside `ensure_wrapper` (media swaps keep
    /// the table authoritative across subtree rebuilds).
    pub fn remember_framing(&mut self, surface: SurfaceId, wrapper: NodeId, framing: PreservedFraming) {
        self.framing.insert((surface, wrapper), framing);
    }

    /// Re-assert media fill and preserved framing on one wrapper. External
    /// layout passes can silently clear inline styles; this is the box
    /// change-observer behavior.
    pub fn resync(&self, surface: &mut Surface, wrapper: NodeId) {
        if !surface.contains(wrapper) {
            return;
        }
        if let Some(height) = surface.attr(wrapper, HEIGHT_MARKER_ATTR).and_then(parse_px) {
            surface.set_style(wrapper, "height", &format!("{height}px"));
            let rect = surface.rect(wrapper);
            surface.set_rect(wrapper, Rect { height, ..rect });
        }
        self.assert_framing(surface, wrapper);
        if is_wrapper(surface, wrapper) {
            if let Some(media) = media_child(surface, wrapper) {
                assert_media_fill(surface, wrapper, media);
            }
        }
    }

    /// Re-assert every watched wrapper on `surface`.
    pub fn resync_watched(&self, surface: &mut Surface) {
        let wrappers: Vec<NodeId> = self
            .watched
            .iter()
            .filter(|(id, _)| *id == surface.id())
            .map(|&(_, wrapper)| wrapper)
            .collect();
        for wrapper in wrappers {
            self.resync(surface, wrapper);
        }
    }

    /// Drop all state tied to a discarded surface generation.
    pub fn dispose_surface(&mut self, surface: SurfaceId) {
        self.framing.retain(|(id, _), _| *id != surface);
        self.watched.retain(|(id, _)| *id != surface);
    }

    fn assert_framing(&self, surface: &mut Surface, wrapper: NodeId) {
        let Some(framing) = self.framing.get(&(surface.id(), wrapper)).cloned() else {
            return;
        };
        if !framing.border_radius.is_empty() {
            surface.set_style(wrapper, "border-radius", &framing.border_radius);
        }
        if !framing.box_shadow.is_empty() {
            surface.set_style(wrapper, "box-shadow", &framing.box_shadow);
        }
        if !framing.margin.is_empty() {
            surface.set_style(wrapper, "margin", &framing.margin);
        }
    }
}

/// Capture framing from the element about to be wrapped, preferring its own
/// computed values and falling back to its original parent's.
#[must_use]
pub fn capture_framing(surface: &Surface, media: NodeId) -> PreservedFraming {
    let own = surface.get(media).map(StyleView::new);
    let parent = surface.parent(media).and_then(|p| surface.get(p)).map(StyleView::new);

    let pick = |own_value: Option<&str>, parent_value: Option<&str>| -> String {
        match own_value {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => parent_value.unwrap_or("").to_string(),
        }
    };

    PreservedFraming {
        border_radius: pick(
            own.as_ref().map(StyleView::border_radius),
            parent.as_ref().map(StyleView::border_radius),
        ),
        box_shadow: pick(own.as_ref().map(StyleView::box_shadow), parent.as_ref().map(StyleView::box_shadow)),
        margin: pick(own.as_ref().map(StyleView::margin), parent.as_ref().map(StyleView::margin)),
    }
}

/// Force the media element to fill its wrapper with cover fit.
fn assert_media_fill(surface: &mut Surface, wrapper: NodeId, media: NodeId) {
    surface.set_style(media, "width", "100%");
    surface.set_style(media, "height", "100%");
    surface.set_style(media, "object-fit", "cover");
    surface.set_style(media, "display", "block");
    let rect = surface.rect(wrapper);
    surface.set_rect(media, rect);
}

fn wrapper_width(surface: &Surface, wrapper: NodeId, media: NodeId) -> f64 {
    if let Some(width) = surface.get(wrapper).and_then(|el| el.inline("width")).and_then(parse_px) {
        return width;
    }
    let wrapper_rect = surface.rect(wrapper);
    if wrapper_rect.width > 0.0 {
        return wrapper_rect.width;
    }
    let media_rect = surface.rect(media);
    if media_rect.width > 0.0 { media_rect.width } else { FALLBACK_WRAPPER_WIDTH_PX }
}

fn wrapper_height(surface: &Surface, wrapper: NodeId, media: NodeId) -> f64 {
    if let Some(height) = surface.attr(wrapper, HEIGHT_MARKER_ATTR).and_then(parse_px) {
        return height;
    }
    let wrapper_rect = surface.rect(wrapper);
    if wrapper_rect.height > 0.0 {
        return wrapper_rect.height;
    }
    let media_rect = surface.rect(media);
    if media_rect.height > 0.0 { media_rect.height } else { FALLBACK_WRAPPER_HEIGHT_PX }
}

/// Where the wrapper sits in the viewport: a fresh wrapper inherits the
/// media element's position, a reused one keeps its own.
fn anchored_origin(surface: &Surface, wrapper: NodeId, media: NodeId) -> (f64, f64) {
    let rect = surface.rect(wrapper);
    if rect.width > 0.0 || rect.height > 0.0 {
        return (rect.x, rect.y);
    }
    let media_rect = surface.rect(media);
    (media_rect.x, media_rect.y)
}
