//! Media swap transition: the structural rewrite performed when an image
//! slot receives a video asset or vice versa.
//!
//! The wrapper survives the swap; its subtree does not. Geometry and
//! preserved framing are captured before teardown and reasserted after the
//! rebuild, so the wrapper is indistinguishable in layout and framing from
//! its pre-swap state except for the media kind itself. The wrapper is
//! never left detached or with zero area.

#[cfg(test)]
#[path = "swap_test.rs"]
mod swap_test;

use indextree::NodeId;

use crate::consts::{FALLBACK_WRAPPER_HEIGHT_PX, FALLBACK_WRAPPER_WIDTH_PX};
use crate::geometry::Rect;
use crate::surface::{parse_px, Media, StyleView, Surface};
use crate::wrapper::{
    ContainerNormalizer, PreservedFraming, HEIGHT_MARKER_ATTR, VIDEO_WRAPPER_CLASS, WRAPPER_CLASS,
    WRAPPER_MARKER_ATTR,
};

/// Class carried by the play/pause overlay attached to user-placed videos.
pub const PLAYBACK_OVERLAY_CLASS: &str = "playback-overlay";

#[derive(Debug, thiserror::Error)]
pub enum SwapError {
    #[error("wrapper is no longer attached to the surface")]
    Detached,
}

/// Rebuild `wrapper` around a new image element. Returns the image node.
pub fn swap_to_image(
    surface: &mut Surface,
    normalizer: &mut ContainerNormalizer,
    wrapper: NodeId,
    src: &str,
) -> Result<NodeId, SwapError> {
    let (width, height, framing) = capture_slot(surface, normalizer, wrapper)?;
    teardown_slot(surface, wrapper);
    rebuild_wrapper(surface, normalizer, wrapper, width, height, &framing);
    surface.remove_class(wrapper, VIDEO_WRAPPER_CLASS);
    surface.add_class(wrapper, WRAPPER_CLASS);

    let image = surface.create_element("img");
    surface.set_media(image, Media::Image { src: src.to_string(), natural: None });
    surface.set_attr(image, "loading", "eager");
    fill_media(surface, wrapper, image);
    surface.append_child(wrapper, image);
    Ok(image)
}

/// Rebuild `wrapper` around a new video element with a playback overlay.
/// Autoplay is intentionally suppressed for user-placed videos. Returns
/// the video node.
pub fn swap_to_video(
    surface: &mut Surface,
    normalizer: &mut ContainerNormalizer,
    wrapper: NodeId,
    src: &str,
) -> Result<NodeId, SwapError> {
    let (width, height, framing) = capture_slot(surface, normalizer, wrapper)?;
    teardown_slot(surface, wrapper);
    rebuild_wrapper(surface, normalizer, wrapper, width, height, &framing);
    surface.remove_class(wrapper, WRAPPER_CLASS);
    surface.add_class(wrapper, VIDEO_WRAPPER_CLASS);

    let video = surface.create_element("video");
    surface.set_media(
        video,
        Media::Video { src: src.to_string(), natural: None, muted: true, looping: true, autoplay: false, paused: true },
    );
    fill_media(surface, wrapper, video);
    surface.append_child(wrapper, video);

    let overlay = surface.create_element("div");
    surface.add_class(overlay, PLAYBACK_OVERLAY_CLASS);
    surface.set_style(overlay, "position", "absolute");
    surface.set_rect(overlay, surface.rect(wrapper));
    surface.append_child(wrapper, overlay);
    Ok(video)
}

/// Capture the slot's geometry and framing before any mutation. Zero-area
/// captures fall back to the wrapper defaults so a failed swap can never
/// collapse the slot.
fn capture_slot(
    surface: &Surface,
    normalizer: &ContainerNormalizer,
    wrapper: NodeId,
) -> Result<(f64, f64, PreservedFraming), SwapError> {
    if !surface.contains(wrapper) || surface.parent(wrapper).is_none() {
        return Err(SwapError::Detached);
    }

    let rect = surface.rect(wrapper);
    let width = if rect.width > 0.0 { rect.width } else { FALLBACK_WRAPPER_WIDTH_PX };
    let height = if rect.height > 0.0 {
        rect.height
    } else {
        surface
            .attr(wrapper, HEIGHT_MARKER_ATTR)
            .and_then(parse_px)
            .unwrap_or(FALLBACK_WRAPPER_HEIGHT_PX)
    };

    let framing = match normalizer.framing(surface.id(), wrapper) {
        Some(framing) => framing.clone(),
        None => {
            let view = surface.get(wrapper).map(StyleView::new);
            PreservedFraming {
                border_radius: view.as_ref().map(StyleView::border_radius).unwrap_or("").to_string(),
                box_shadow: view.as_ref().map(StyleView::box_shadow).unwrap_or("").to_string(),
                margin: view.as_ref().map(StyleView::margin).unwrap_or("").to_string(),
            }
        }
    };
    Ok((width, height, framing))
}

/// Fully release the current occupant: videos are paused and their source
/// cleared so buffers are dropped, then the subtree and inline style go.
fn teardown_slot(surface: &mut Surface, wrapper: NodeId) {
    let children = surface.children(wrapper);
    for child in children {
        if let Some(Media::Video { src, natural, paused, .. }) = surface.media_mut(child) {
            *paused = true;
            src.clear();
            *natural = None;
        }
    }
    surface.clear_children(wrapper);
    surface.clear_inline_style(wrapper);
}

/// Reassert structural styles, captured geometry, framing, and markers on
/// the cleared wrapper.
fn rebuild_wrapper(
    surface: &mut Surface,
    normalizer: &mut ContainerNormalizer,
    wrapper: NodeId,
    width: f64,
    height: f64,
    framing: &PreservedFraming,
) {
    surface.set_style(wrapper, "position", "relative");
    surface.set_style(wrapper, "overflow", "hidden");
    surface.set_style(wrapper, "width", &format!("{width}px"));
    surface.set_style(wrapper, "height", &format!("{height}px"));
    surface.set_attr(wrapper, WRAPPER_MARKER_ATTR, "1");
    surface.set_attr(wrapper, HEIGHT_MARKER_ATTR, &format!("{height}"));

    if !framing.border_radius.is_empty() {
        surface.set_style(wrapper, "border-radius", &framing.border_radius);
    }
    if !framing.box_shadow.is_empty() {
        surface.set_style(wrapper, "box-shadow", &framing.box_shadow);
    }
    if !framing.margin.is_empty() {
        surface.set_style(wrapper, "margin", &framing.margin);
    }
    normalizer.remember_framing(surface.id(), wrapper, framing.clone());

    let rect = surface.rect(wrapper);
    surface.set_rect(wrapper, Rect::new(rect.x, rect.y, width, height));
}

fn fill_media(surface: &mut Surface, wrapper: NodeId, media: NodeId) {
    surface.set_style(media, "width", "100%");
    surface.set_style(media, "height", "100%");
    surface.set_style(media, "object-fit", "cover");
    surface.set_style(media, "display", "block");
    surface.set_rect(media, surface.rect(wrapper));
}
