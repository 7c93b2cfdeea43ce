//! Media classifier: decides what kind of editable media a pointer hit
//! landed on, if any.
//!
//! Explicit media elements (video, then image) are unambiguous and win over
//! the CSS-background fallback, which is checked last and bounded because
//! arbitrary ancestors may carry decorative backgrounds. Protected template
//! chrome (logos, avatars) never classifies, regardless of pointer target.

#[cfg(test)]
#[path = "classify_test.rs"]
mod classify_test;

use indextree::NodeId;

use crate::consts::{BACKGROUND_WALK_DEPTH, PROTECTED_MAX_DIM_PX};
use crate::surface::{background_url, parse_px, Media, StyleView, Surface};
use crate::wrapper::WRAPPER_MARKER_ATTR;

/// Conventional class carried by a slide's primary background element.
pub const BACKGROUND_CLASS: &str = "background";

/// Attribute the host sets on assets that must never be edited.
pub const PROTECTED_ATTR: &str = "data-protected";

/// Source substrings identifying assets served from immutable template
/// hosts; media loaded from them is treated as chrome.
const IMMUTABLE_SRC_MARKERS: &[&str] = &["/brand-assets/", "template-chrome."];

/// What kind of editable media a hit resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Background,
}

impl MediaKind {
    /// Whether position is expressed as `object-position` (media elements)
    /// rather than `background-position-*` (background hosts).
    #[must_use]
    pub fn is_object_positioned(self) -> bool {
        matches!(self, Self::Image | Self::Video)
    }
}

/// Result of classification: the media element and the element a drag
/// session should operate on.
#[derive(Debug, Clone, Copy)]
pub struct Classified {
    pub kind: MediaKind,
    /// The media element itself (video, image, or background host).
    pub media: NodeId,
    /// The element a session targets: the structural wrapper for videos,
    /// the element itself otherwise.
    pub target: NodeId,
}

/// Classify a pointer hit. Returns `None` when nothing editable was hit,
/// in which case no session starts.
#[must_use]
pub fn classify(surface: &Surface, hit: NodeId) -> Option<Classified> {
    if let Some(video) = find_self_or_ancestor(surface, hit, is_video) {
        if !is_protected_chain(surface, video) {
            return Some(Classified { kind: MediaKind::Video, media: video, target: video_target(surface, video) });
        }
    }

    if let Some(image) = find_self_or_ancestor(surface, hit, is_image) {
        if !is_protected_chain(surface, image) {
            return Some(Classified { kind: MediaKind::Image, media: image, target: image });
        }
    }

    background_host(surface, hit)
        .map(|host| Classified { kind: MediaKind::Background, media: host, target: host })
}

/// Whether `node` is template chrome that must never be edited: marked by
/// the host, named as chrome, served from an immutable asset host, or a
/// small circular element (logo/avatar heuristic).
#[must_use]
pub fn is_protected(surface: &Surface, node: NodeId) -> bool {
    let Some(el) = surface.get(node) else {
        return false;
    };

    if el.attr(PROTECTED_ATTR).is_some() {
        return true;
    }
    if el.classes().iter().any(|c| c.contains("logo") || c.contains("avatar")) {
        return true;
    }
    if let Some(media) = &el.media {
        if IMMUTABLE_SRC_MARKERS.iter().any(|marker| media.src().contains(marker)) {
            return true;
        }
    }

    let rect = el.rect();
    if rect.is_empty() || rect.width > PROTECTED_MAX_DIM_PX || rect.height > PROTECTED_MAX_DIM_PX {
        return false;
    }
    is_circular(StyleView::new(el).border_radius(), rect.width.min(rect.height))
}

fn is_circular(border_radius: &str, min_dim: f64) -> bool {
    let value = border_radius.trim();
    if let Some(percent) = value.strip_suffix('%') {
        return matches!(percent.trim().parse::<f64>(), Ok(p) if p >= 50.0);
    }
    matches!(parse_px(value), Some(px) if px >= min_dim / 2.0)
}

fn is_protected_chain(surface: &Surface, node: NodeId) -> bool {
    surface.self_and_ancestors(node).any(|n| is_protected(surface, n))
}

fn find_self_or_ancestor(
    surface: &Surface,
    node: NodeId,
    predicate: impl Fn(&Surface, NodeId) -> bool,
) -> Option<NodeId> {
    surface.self_and_ancestors(node).find(|&n| predicate(surface, n))
}

fn is_video(surface: &Surface, node: NodeId) -> bool {
    surface.get(node).is_some_and(|el| matches!(el.media, Some(Media::Video { .. })) || el.tag == "video")
}

fn is_image(surface: &Surface, node: NodeId) -> bool {
    surface.get(node).is_some_and(|el| matches!(el.media, Some(Media::Image { .. })) || el.tag == "img")
}

/// Drag target for a video: the nearest ancestor carrying the structural
/// wrapper marker, or the video's direct parent if none.
fn video_target(surface: &Surface, video: NodeId) -> NodeId {
    surface
        .self_and_ancestors(video)
        .skip(1)
        .find(|&n| surface.attr(n, WRAPPER_MARKER_ATTR).is_some())
        .or_else(|| surface.parent(video))
        .unwrap_or(video)
}

/// Background fallback: the conventional background-classed element, then
/// the body, then a bounded ancestor walk from the hit.
fn background_host(surface: &Surface, hit: NodeId) -> Option<NodeId> {
    let conventional = surface.find(|el| el.has_class(BACKGROUND_CLASS));
    if let Some(host) = conventional.filter(|&n| has_background_url(surface, n) && !is_protected(surface, n)) {
        return Some(host);
    }

    if has_background_url(surface, surface.body()) {
        return Some(surface.body());
    }

    surface
        .self_and_ancestors(hit)
        .take(BACKGROUND_WALK_DEPTH)
        .find(|&n| has_background_url(surface, n) && !is_protected(surface, n))
}

fn has_background_url(surface: &Surface, node: NodeId) -> bool {
    surface
        .get(node)
        .is_some_and(|el| background_url(StyleView::new(el).background_image()).is_some())
}
