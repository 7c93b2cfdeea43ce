//! Document surface: the per-slide element tree the engine reads and mutates.
//!
//! A `Surface` is the scriptable rendering context for one slide. The host
//! (slide renderer) hydrates it — elements, classes, stylesheet-provided base
//! styles, layout rects — and replaces it wholesale when the slide is
//! re-rendered. The engine mutates inline styles, attributes, and structure
//! while the surface is live, and treats its generation id as the identity
//! that stale sessions are checked against.
//!
//! Computed style is modeled as inline-over-base: a property reads from the
//! inline map first, then the base (stylesheet) map. `StyleView` gives typed
//! access to the handful of properties the engine cares about.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use std::collections::HashMap;

use indextree::{Arena, NodeId};
use uuid::Uuid;

use crate::geometry::{Point, Rect};

/// Identity of one hydrated surface generation. Replacing a slide's surface
/// produces a new id, which is how sessions detect staleness.
pub type SurfaceId = Uuid;

/// Media payload of an element, when it is an image or a video.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq)]
pub enum Media {
    Image {
        src: String,
        /// Intrinsic pixel size, `None` until the host reports decode.
        natural: Option<(f64, f64)>,
    },
    Video {
        src: String,
        /// Decoded frame size, `None` until `loadedmetadata`.
        natural: Option<(f64, f64)>,
        muted: bool,
        looping: bool,
        autoplay: bool,
        paused: bool,
    },
}

impl Media {
    /// Natural dimensions if the asset has decoded.
    #[must_use]
    pub fn natural(&self) -> Option<(f64, f64)> {
        match self {
            Self::Image { natural, .. } | Self::Video { natural, .. } => *natural,
        }
    }

    /// Source URL of the asset.
    #[must_use]
    pub fn src(&self) -> &str {
        match self {
            Self::Image { src, .. } | Self::Video { src, .. } => src,
        }
    }
}

/// One element in the surface tree.
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    classes: Vec<String>,
    attrs: HashMap<String, String>,
    base_style: HashMap<String, String>,
    inline_style: HashMap<String, String>,
    rect: Rect,
    pub media: Option<Media>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self { tag: tag.to_string(), ..Self::default() }
    }

    /// Computed value of a property: inline first, then stylesheet base.
    #[must_use]
    pub fn style(&self, property: &str) -> Option<&str> {
        self.inline_style
            .get(property)
            .or_else(|| self.base_style.get(property))
            .map(String::as_str)
    }

    /// Inline value only, ignoring the stylesheet base.
    #[must_use]
    pub fn inline(&self, property: &str) -> Option<&str> {
        self.inline_style.get(property).map(String::as_str)
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    #[must_use]
    pub fn rect(&self) -> Rect {
        self.rect
    }
}

/// Typed access to the computed-style properties the engine reads.
pub struct StyleView<'a> {
    element: &'a Element,
}

impl<'a> StyleView<'a> {
    #[must_use]
    pub fn new(element: &'a Element) -> Self {
        Self { element }
    }

    /// Computed `background-image`. Empty string when absent.
    #[must_use]
    pub fn background_image(&self) -> &'a str {
        self.element.style("background-image").unwrap_or("")
    }

    /// Computed `border-radius`. Empty string when absent.
    #[must_use]
    pub fn border_radius(&self) -> &'a str {
        self.element.style("border-radius").unwrap_or("")
    }

    /// Computed `box-shadow`. Empty string when absent.
    #[must_use]
    pub fn box_shadow(&self) -> &'a str {
        self.element.style("box-shadow").unwrap_or("")
    }

    /// Computed `margin`. Empty string when absent.
    #[must_use]
    pub fn margin(&self) -> &'a str {
        self.element.style("margin").unwrap_or("")
    }

    /// Computed `object-position`. Defaults to centered.
    #[must_use]
    pub fn object_position(&self) -> &'a str {
        self.element.style("object-position").unwrap_or("50% 50%")
    }

    /// Computed `background-position-x`. Defaults to centered.
    #[must_use]
    pub fn background_position_x(&self) -> &'a str {
        self.element.style("background-position-x").unwrap_or("50%")
    }

    /// Computed `background-position-y`. Defaults to centered.
    #[must_use]
    pub fn background_position_y(&self) -> &'a str {
        self.element.style("background-position-y").unwrap_or("50%")
    }
}

/// The element tree for one rendered slide.
pub struct Surface {
    id: SurfaceId,
    arena: Arena<Element>,
    body: NodeId,
}

impl Surface {
    /// Create an empty surface with a `body` root.
    #[must_use]
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let body = arena.new_node(Element::new("body"));
        Self { id: Uuid::new_v4(), arena, body }
    }

    /// Generation id of this surface.
    #[must_use]
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// The root element.
    #[must_use]
    pub fn body(&self) -> NodeId {
        self.body
    }

    // --- Structure ---

    /// Create a detached element. Attach it with `append_child` or
    /// `insert_before`.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.arena.new_node(Element::new(tag))
    }

    /// Append `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        parent.append(child, &mut self.arena);
    }

    /// Insert `new_sibling` immediately before `node`.
    pub fn insert_before(&mut self, node: NodeId, new_sibling: NodeId) {
        node.insert_before(new_sibling, &mut self.arena);
    }

    /// Detach `node` (and its subtree) from its parent, keeping it alive.
    pub fn detach(&mut self, node: NodeId) {
        node.detach(&mut self.arena);
    }

    /// Remove every child of `node`, discarding their subtrees.
    pub fn clear_children(&mut self, node: NodeId) {
        let children: Vec<NodeId> = node.children(&self.arena).collect();
        for child in children {
            child.remove_subtree(&mut self.arena);
        }
    }

    /// Whether `node` is still part of this surface.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.arena.get(node).is_some_and(|n| !n.is_removed())
    }

    /// Parent of `node`, if attached.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node).and_then(indextree::Node::parent)
    }

    /// Children of `node` in document order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        node.children(&self.arena).collect()
    }

    /// `node` followed by its ancestors up to the root.
    pub fn self_and_ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.ancestors(&self.arena)
    }

    // --- Element access ---

    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<&Element> {
        self.arena.get(node).filter(|n| !n.is_removed()).map(indextree::Node::get)
    }

    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.arena.get_mut(node).filter(|n| !n.is_removed()).map(indextree::Node::get_mut)
    }

    /// Layout rect of `node`; zero rect if the node is gone.
    #[must_use]
    pub fn rect(&self, node: NodeId) -> Rect {
        self.get(node).map(Element::rect).unwrap_or_default()
    }

    pub fn set_rect(&mut self, node: NodeId, rect: Rect) {
        if let Some(el) = self.get_mut(node) {
            el.rect = rect;
        }
    }

    /// Computed style of a property on `node`.
    #[must_use]
    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.get(node).and_then(|el| el.style(property))
    }

    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(el) = self.get_mut(node) {
            el.inline_style.insert(property.to_string(), value.to_string());
        }
    }

    pub fn remove_style(&mut self, node: NodeId, property: &str) {
        if let Some(el) = self.get_mut(node) {
            el.inline_style.remove(property);
        }
    }

    /// Drop every inline declaration on `node`, leaving base styles intact.
    pub fn clear_inline_style(&mut self, node: NodeId) {
        if let Some(el) = self.get_mut(node) {
            el.inline_style.clear();
        }
    }

    /// Set a stylesheet-provided base value (hydration only).
    pub fn set_base_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(el) = self.get_mut(node) {
            el.base_style.insert(property.to_string(), value.to_string());
        }
    }

    #[must_use]
    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.get(node).and_then(|el| el.attr(name))
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(el) = self.get_mut(node) {
            el.attrs.insert(name.to_string(), value.to_string());
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let Some(el) = self.get_mut(node) {
            el.attrs.remove(name);
        }
    }

    #[must_use]
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.get(node).is_some_and(|el| el.has_class(class))
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.get_mut(node) {
            if !el.has_class(class) {
                el.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.get_mut(node) {
            el.classes.retain(|c| c != class);
        }
    }

    pub fn set_media(&mut self, node: NodeId, media: Media) {
        if let Some(el) = self.get_mut(node) {
            el.media = Some(media);
        }
    }

    #[must_use]
    pub fn media(&self, node: NodeId) -> Option<&Media> {
        self.get(node).and_then(|el| el.media.as_ref())
    }

    pub fn media_mut(&mut self, node: NodeId) -> Option<&mut Media> {
        self.get_mut(node).and_then(|el| el.media.as_mut())
    }

    /// First element matching `predicate` in document order.
    #[must_use]
    pub fn find(&self, predicate: impl Fn(&Element) -> bool) -> Option<NodeId> {
        self.body.descendants(&self.arena).find(|&id| self.get(id).is_some_and(&predicate))
    }

    // --- Hit testing ---

    /// Deepest element whose rect contains `point`, scanning topmost
    /// siblings first (later siblings render on top).
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<NodeId> {
        self.hit_node(self.body, point)
    }

    fn hit_node(&self, node: NodeId, point: Point) -> Option<NodeId> {
        let el = self.get(node)?;
        if !el.rect().contains(point) {
            return None;
        }
        let children: Vec<NodeId> = node.children(&self.arena).rev().collect();
        for child in children {
            if let Some(hit) = self.hit_node(child, point) {
                return Some(hit);
            }
        }
        Some(node)
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

// --- Style value parsing ---

/// Parse a `"123px"` length. Bare numbers are accepted.
#[must_use]
pub fn parse_px(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed);
    match number.trim().parse() {
        Ok(px) => Some(px),
        Err(_) => None,
    }
}

/// Parse one position component: a percentage or a CSS position keyword.
#[must_use]
pub fn parse_percent(value: &str) -> Option<f64> {
    match value.trim() {
        "left" | "top" => Some(0.0),
        "center" => Some(50.0),
        "right" | "bottom" => Some(100.0),
        other => match other.strip_suffix('%')?.trim().parse() {
            Ok(percent) => Some(percent),
            Err(_) => None,
        },
    }
}

/// Parse a two-component position like `"60% 50%"`. A single component
/// positions the x axis and centers y, per CSS shorthand rules.
#[must_use]
pub fn parse_position_pair(value: &str) -> Option<(f64, f64)> {
    let mut parts = value.split_whitespace();
    let x = parse_percent(parts.next()?)?;
    let y = match parts.next() {
        Some(part) => parse_percent(part)?,
        None => 50.0,
    };
    Some((x, y))
}

/// Extract the URL from a `url(...)` token in a background-image value.
/// Returns `None` for gradient-only or empty values.
#[must_use]
pub fn background_url(value: &str) -> Option<&str> {
    let start = value.find("url(")? + 4;
    let rest = &value[start..];
    let end = rest.find(')')?;
    let url = rest[..end].trim().trim_matches('"').trim_matches('\'');
    if url.is_empty() { None } else { Some(url) }
}
