//! Top-level editor engine: owns per-slide surfaces, the gesture state
//! machine, and the handle overlay, and turns pointer events into actions
//! for the host to process.
//!
//! The host wires raw events (pointer, frame, scroll, probe and media-load
//! callbacks) into the `on_*` methods, which each return the actions to
//! perform: style patches to persist, probe requests, frame requests,
//! cursor and render updates. The engine never talks to the network or the
//! real DOM; surfaces are hydrated and replaced by the host.
//!
//! One session of any kind is active process-wide. Starting a drag cancels
//! a live resize and vice versa, and starting any session invalidates one
//! tied to a different surface. Stale events — a pointer-up for a replaced
//! surface, a probe callback for a superseded token — are no-ops.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::HashMap;

use indextree::NodeId;
use tracing::{error, warn};

use crate::classify::{classify, Classified, MediaKind};
use crate::consts::PROBE_TIMEOUT_MS;
use crate::drag::{self, DragSession, NotReady};
use crate::geometry::Point;
use crate::persist::{SlideIndex, StylePatch, ROLE_BACKGROUND};
use crate::probe::{NaturalSize, ProbeToken, ProbeTracker};
use crate::resize::{self, Edge, ResizeHandles, ResizeSession};
use crate::surface::{background_url, Media, StyleView, Surface, SurfaceId};
use crate::swap::{swap_to_image, swap_to_video, PLAYBACK_OVERLAY_CLASS};
use crate::wrapper::{is_wrapper, media_child, ContainerNormalizer};

/// Actions returned from event handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Persist a partial style patch for `(slide, role)`.
    CommitStyle { slide: SlideIndex, role: String, patch: StylePatch },
    /// Set the unsaved-changes flag.
    MarkUnsaved,
    /// Load `url` off-screen and report its natural size back within
    /// `timeout_ms` via the probe callbacks.
    ProbeImage { token: ProbeToken, url: String, timeout_ms: u64 },
    /// Call `on_frame` after the next rendering frame.
    RequestFrame,
    SetCursor(&'static str),
    RenderNeeded,
}

/// The gesture state machine. One session of any kind at a time.
#[derive(Debug)]
pub enum InputState {
    /// No gesture in progress.
    Idle,
    /// A pointer-down landed on an unmeasured container; re-measure once
    /// after the next frame, then abort silently.
    AwaitingRemeasure { slide: SlideIndex, surface: SurfaceId, classified: Classified, pointer: Point },
    /// A background drag is waiting for the natural-size probe.
    ProbingBackground { token: ProbeToken, slide: SlideIndex, surface: SurfaceId, host: NodeId, pointer: Point },
    /// An active media reposition.
    Dragging { slide: SlideIndex, session: DragSession },
    /// An active container height resize.
    Resizing { slide: SlideIndex, session: ResizeSession },
}

impl Default for InputState {
    fn default() -> Self {
        Self::Idle
    }
}

/// The editor engine for one carousel document.
pub struct Editor {
    surfaces: HashMap<SlideIndex, Surface>,
    normalizer: ContainerNormalizer,
    probes: ProbeTracker,
    handles: Option<ResizeHandles>,
    input: InputState,
    /// Wrappers to resync on the next frame (post-swap safety net).
    pending_resync: Vec<(SlideIndex, SurfaceId, NodeId)>,
}

impl Default for Editor {
    fn default() -> Self {
        Self {
            surfaces: HashMap::new(),
            normalizer: ContainerNormalizer::new(),
            probes: ProbeTracker::new(),
            handles: None,
            input: InputState::Idle,
            pending_resync: Vec::new(),
        }
    }
}

impl Editor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Hydration ---

    /// Install (or replace) the surface for `slide`. Replacing discards
    /// every session, handle pair, and probe tied to the old generation.
    pub fn load_surface(&mut self, slide: SlideIndex, surface: Surface) {
        if let Some(old) = self.surfaces.insert(slide, surface) {
            self.invalidate_surface(old.id());
        }
    }

    /// Tear down the surface for `slide`, removing all state bound to it.
    pub fn remove_surface(&mut self, slide: SlideIndex) {
        if let Some(old) = self.surfaces.remove(&slide) {
            self.invalidate_surface(old.id());
        }
    }

    /// Discard every surface (the slide list was replaced).
    pub fn clear_surfaces(&mut self) {
        let ids: Vec<SurfaceId> = self.surfaces.values().map(Surface::id).collect();
        self.surfaces.clear();
        for id in ids {
            self.invalidate_surface(id);
        }
    }

    #[must_use]
    pub fn surface(&self, slide: SlideIndex) -> Option<&Surface> {
        self.surfaces.get(&slide)
    }

    /// Mutable surface access for host-side hydration and layout updates.
    pub fn surface_mut(&mut self, slide: SlideIndex) -> Option<&mut Surface> {
        self.surfaces.get_mut(&slide)
    }

    // --- Queries ---

    #[must_use]
    pub fn input_state(&self) -> &InputState {
        &self.input
    }

    #[must_use]
    pub fn handles(&self) -> Option<&ResizeHandles> {
        self.handles.as_ref()
    }

    // --- Pointer events ---

    pub fn on_pointer_down(&mut self, slide: SlideIndex, point: Point) -> Vec<Action> {
        let Some(surface) = self.surfaces.get(&slide) else {
            return Vec::new();
        };

        // Edge strips win over content: they overlay the container in
        // viewport coordinates and must stay grabbable under overflow
        // clipping.
        if let Some(handles) = &self.handles {
            if handles.matches(surface) {
                if let Some(edge) = handles.hit(point) {
                    return self.start_resize(slide, handles.container, edge, point);
                }
            }
        }

        let Some(hit) = surface.hit_test(point) else {
            return Vec::new();
        };

        if surface.has_class(hit, PLAYBACK_OVERLAY_CLASS) {
            return self.toggle_playback(slide, hit);
        }

        let Some(classified) = classify(surface, hit) else {
            return Vec::new();
        };
        self.cancel_active_session();
        self.start_session(slide, classified, point, false)
    }

    pub fn on_pointer_move(&mut self, slide: SlideIndex, point: Point) -> Vec<Action> {
        match &mut self.input {
            InputState::Dragging { slide: session_slide, session } if *session_slide == slide => {
                let Some(surface) = self.surfaces.get_mut(&slide) else {
                    return Vec::new();
                };
                if !session.matches(surface) {
                    return Vec::new();
                }
                session.apply_move(surface, point);
                vec![Action::RenderNeeded]
            }
            InputState::Resizing { slide: session_slide, session } if *session_slide == slide => {
                let Some(surface) = self.surfaces.get_mut(&slide) else {
                    return Vec::new();
                };
                if !session.matches(surface) {
                    return Vec::new();
                }
                session.apply_move(surface, &self.normalizer, point.y);
                if let Some(handles) = &mut self.handles {
                    if handles.matches(surface) {
                        handles.sync(surface);
                    }
                }
                // Height is live-persisted on every move, not only on
                // release.
                vec![
                    Action::CommitStyle { slide, role: ROLE_BACKGROUND.to_string(), patch: session.patch() },
                    Action::MarkUnsaved,
                    Action::RenderNeeded,
                ]
            }
            _ => Vec::new(),
        }
    }

    pub fn on_pointer_up(&mut self, slide: SlideIndex, _point: Point) -> Vec<Action> {
        let matches = match &self.input {
            InputState::Dragging { slide: session_slide, session } => {
                *session_slide == slide
                    && self.surfaces.get(&slide).is_some_and(|surface| session.matches(surface))
            }
            InputState::Resizing { slide: session_slide, session } => {
                *session_slide == slide
                    && self.surfaces.get(&slide).is_some_and(|surface| session.matches(surface))
            }
            InputState::ProbingBackground { slide: session_slide, .. } => *session_slide == slide,
            _ => false,
        };
        if !matches {
            // Stale pointer-up for another surface; the active session, if
            // any, stays live.
            return Vec::new();
        }

        match std::mem::take(&mut self.input) {
            InputState::Dragging { session, .. } => {
                let patch = match self.surfaces.get(&slide) {
                    Some(surface) => session.finish(surface),
                    None => return Vec::new(),
                };
                vec![
                    Action::CommitStyle { slide, role: ROLE_BACKGROUND.to_string(), patch },
                    Action::MarkUnsaved,
                    Action::SetCursor("default"),
                    Action::RenderNeeded,
                ]
            }
            InputState::Resizing { session, .. } => vec![
                Action::CommitStyle { slide, role: ROLE_BACKGROUND.to_string(), patch: session.patch() },
                Action::MarkUnsaved,
                Action::SetCursor("default"),
                Action::RenderNeeded,
            ],
            InputState::ProbingBackground { .. } => {
                // Released before the probe resolved: nothing to commit.
                self.probes.cancel();
                vec![Action::SetCursor("default")]
            }
            other => {
                self.input = other;
                Vec::new()
            }
        }
    }

    /// Pointer left the document: discard the session without persisting.
    /// The live style applied during the drag stays (last-applied-wins).
    pub fn on_pointer_leave(&mut self, _slide: SlideIndex) -> Vec<Action> {
        self.abort_session()
    }

    /// Window lost focus: same discard semantics as pointer-leave.
    pub fn on_blur(&mut self) -> Vec<Action> {
        self.abort_session()
    }

    // --- Frame / layout callbacks ---

    /// A rendering frame elapsed: run deferred re-measures and resyncs.
    pub fn on_frame(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();

        let pending = std::mem::take(&mut self.pending_resync);
        for (slide, surface_id, wrapper) in pending {
            let Some(surface) = self.surfaces.get_mut(&slide) else {
                continue;
            };
            if surface.id() != surface_id {
                continue;
            }
            self.normalizer.resync(surface, wrapper);
            if let Some(handles) = &mut self.handles {
                if handles.matches(surface) && handles.container == wrapper {
                    handles.sync(surface);
                }
            }
            actions.push(Action::RenderNeeded);
        }

        if matches!(self.input, InputState::AwaitingRemeasure { .. }) {
            if let InputState::AwaitingRemeasure { slide, surface, classified, pointer } =
                std::mem::take(&mut self.input)
            {
                let live = self.surfaces.get(&slide).is_some_and(|s| s.id() == surface);
                if live {
                    actions.extend(self.start_session(slide, classified, pointer, true));
                }
            }
        }
        actions
    }

    /// The container's box may have moved or changed size (layout pass,
    /// flex reflow): re-assert wrapper invariants and re-sync handles.
    pub fn notify_layout_changed(&mut self, slide: SlideIndex) -> Vec<Action> {
        let Some(surface) = self.surfaces.get_mut(&slide) else {
            return Vec::new();
        };
        self.normalizer.resync_watched(surface);
        if let Some(handles) = &mut self.handles {
            if handles.matches(surface) {
                handles.sync(surface);
            }
        }
        vec![Action::RenderNeeded]
    }

    /// Scroll moved the container under the fixed-position strips.
    pub fn on_scroll(&mut self, slide: SlideIndex) -> Vec<Action> {
        let Some(surface) = self.surfaces.get(&slide) else {
            return Vec::new();
        };
        if let Some(handles) = &mut self.handles {
            if handles.matches(surface) {
                handles.sync(surface);
            }
        }
        Vec::new()
    }

    // --- Probe callbacks ---

    pub fn on_probe_result(&mut self, token: ProbeToken, w: f64, h: f64) -> Vec<Action> {
        self.finish_probe(token, NaturalSize::Measured { w, h })
    }

    pub fn on_probe_failed(&mut self, token: ProbeToken) -> Vec<Action> {
        if self.probes.is_current(token) {
            warn!("background probe failed; falling back to estimated aspect");
        }
        self.finish_probe(token, NaturalSize::assumed())
    }

    pub fn on_probe_timeout(&mut self, token: ProbeToken) -> Vec<Action> {
        if self.probes.is_current(token) {
            warn!(timeout_ms = PROBE_TIMEOUT_MS, "background probe timed out; falling back to estimated aspect");
        }
        self.finish_probe(token, NaturalSize::assumed())
    }

    // --- Media lifecycle ---

    /// An image finished decoding; finalize fill geometry.
    pub fn on_media_loaded(&mut self, slide: SlideIndex, media: NodeId, w: f64, h: f64) -> Vec<Action> {
        self.media_ready(slide, media, w, h)
    }

    /// A video reported `loadedmetadata`; finalize fill geometry.
    pub fn on_video_metadata(&mut self, slide: SlideIndex, media: NodeId, w: f64, h: f64) -> Vec<Action> {
        self.media_ready(slide, media, w, h)
    }

    /// Replace the media in `node`'s slot with a different kind of asset.
    /// `node` may be the wrapper itself or the current media element.
    pub fn swap_media(&mut self, slide: SlideIndex, node: NodeId, url: &str, to: MediaKind) -> Vec<Action> {
        if to == MediaKind::Background {
            warn!(slide, "background slots cannot be swapped; ignoring");
            return Vec::new();
        }
        let Some(surface) = self.surfaces.get_mut(&slide) else {
            return Vec::new();
        };

        let wrapper = if is_wrapper(surface, node) {
            node
        } else {
            match self.normalizer.ensure_wrapper(surface, node) {
                Some(wrapped) => wrapped.wrapper,
                None => return Vec::new(),
            }
        };

        self.input = InputState::Idle;
        self.probes.cancel();
        let result = match to {
            MediaKind::Image => swap_to_image(surface, &mut self.normalizer, wrapper, url),
            MediaKind::Video => swap_to_video(surface, &mut self.normalizer, wrapper, url),
            MediaKind::Background => return Vec::new(),
        };
        match result {
            Ok(_) => {
                self.pending_resync.push((slide, surface.id(), wrapper));
                vec![Action::RequestFrame, Action::RenderNeeded]
            }
            Err(e) => {
                error!(error = %e, slide, "media swap failed; wrapper left as-is");
                Vec::new()
            }
        }
    }

    // --- Internals ---

    fn start_session(
        &mut self,
        slide: SlideIndex,
        classified: Classified,
        pointer: Point,
        retried: bool,
    ) -> Vec<Action> {
        let Some(surface) = self.surfaces.get_mut(&slide) else {
            return Vec::new();
        };
        let surface_id = surface.id();
        let (kind, media) = (classified.kind, classified.media);

        // The classifier's target is the wrapper when one already exists;
        // otherwise the box to measure is the media element itself.
        let container = if kind == MediaKind::Background || is_wrapper(surface, classified.target) {
            classified.target
        } else {
            media
        };
        if surface.rect(container).is_empty() {
            if retried {
                // Still unmeasurable after one frame: not ready, no session.
                return Vec::new();
            }
            self.input = InputState::AwaitingRemeasure { slide, surface: surface_id, classified, pointer };
            return vec![Action::RequestFrame];
        }

        match kind {
            MediaKind::Image | MediaKind::Video => {
                let Some(wrapped) = self.normalizer.ensure_wrapper(surface, media) else {
                    return Vec::new();
                };
                let natural = match surface.media(media).and_then(Media::natural) {
                    Some((w, h)) => NaturalSize::Measured { w, h },
                    None => NaturalSize::assumed(),
                };
                match drag::begin(surface, kind, wrapped.wrapper, media, natural, pointer) {
                    Ok(session) => {
                        self.handles = Some(ResizeHandles::attach(surface, wrapped.wrapper));
                        self.input = InputState::Dragging { slide, session };
                        vec![Action::SetCursor("grabbing"), Action::RenderNeeded]
                    }
                    Err(NotReady::ZeroSizeContainer) => Vec::new(),
                }
            }
            MediaKind::Background => {
                let url = surface
                    .get(media)
                    .map(StyleView::new)
                    .and_then(|view| background_url(view.background_image()).map(ToString::to_string));
                let Some(url) = url else {
                    return Vec::new();
                };
                let token = self.probes.begin(surface_id);
                self.input =
                    InputState::ProbingBackground { token, slide, surface: surface_id, host: media, pointer };
                vec![
                    Action::ProbeImage { token, url, timeout_ms: PROBE_TIMEOUT_MS },
                    Action::SetCursor("grabbing"),
                ]
            }
        }
    }

    fn start_resize(&mut self, slide: SlideIndex, container: NodeId, edge: Edge, point: Point) -> Vec<Action> {
        self.cancel_active_session();
        let Some(surface) = self.surfaces.get(&slide) else {
            return Vec::new();
        };
        let session = resize::begin(surface, container, edge, point);
        self.input = InputState::Resizing { slide, session };
        vec![Action::SetCursor("ns-resize"), Action::RenderNeeded]
    }

    fn finish_probe(&mut self, token: ProbeToken, natural: NaturalSize) -> Vec<Action> {
        let Some(probed_surface) = self.probes.take(token) else {
            return Vec::new();
        };
        let (state_token, slide, surface, host, pointer) = match &self.input {
            InputState::ProbingBackground { token, slide, surface, host, pointer } => {
                (*token, *slide, *surface, *host, *pointer)
            }
            _ => return Vec::new(),
        };
        if state_token != token || surface != probed_surface {
            return Vec::new();
        }
        self.input = InputState::Idle;

        let Some(live) = self.surfaces.get(&slide) else {
            return Vec::new();
        };
        if live.id() != surface {
            return Vec::new();
        }
        match drag::begin(live, MediaKind::Background, host, host, natural, pointer) {
            Ok(session) => {
                self.input = InputState::Dragging { slide, session };
                vec![Action::RenderNeeded]
            }
            Err(NotReady::ZeroSizeContainer) => Vec::new(),
        }
    }

    fn toggle_playback(&mut self, slide: SlideIndex, overlay: NodeId) -> Vec<Action> {
        let Some(surface) = self.surfaces.get_mut(&slide) else {
            return Vec::new();
        };
        let Some(wrapper) = surface.parent(overlay) else {
            return Vec::new();
        };
        let Some(video) = media_child(surface, wrapper) else {
            return Vec::new();
        };
        if let Some(Media::Video { paused, .. }) = surface.media_mut(video) {
            *paused = !*paused;
            return vec![Action::RenderNeeded];
        }
        Vec::new()
    }

    /// Discard the active session of any kind without persisting.
    fn cancel_active_session(&mut self) {
        self.input = InputState::Idle;
        self.probes.cancel();
    }

    fn abort_session(&mut self) -> Vec<Action> {
        match self.input {
            InputState::Idle => Vec::new(),
            _ => {
                self.cancel_active_session();
                vec![Action::SetCursor("default")]
            }
        }
    }

    /// Drop all engine state referencing a discarded surface generation.
    fn invalidate_surface(&mut self, id: SurfaceId) {
        self.normalizer.dispose_surface(id);
        self.pending_resync.retain(|(_, surface_id, _)| *surface_id != id);
        if self.handles.as_ref().is_some_and(|h| h.surface == id) {
            self.handles = None;
        }
        let stale = match &self.input {
            InputState::AwaitingRemeasure { surface, .. }
            | InputState::ProbingBackground { surface, .. } => *surface == id,
            InputState::Dragging { session, .. } => session.surface == id,
            InputState::Resizing { session, .. } => session.surface == id,
            InputState::Idle => false,
        };
        if stale {
            self.cancel_active_session();
        }
    }

    fn media_ready(&mut self, slide: SlideIndex, media: NodeId, w: f64, h: f64) -> Vec<Action> {
        let Some(surface) = self.surfaces.get_mut(&slide) else {
            return Vec::new();
        };
        match surface.media_mut(media) {
            Some(Media::Image { natural, .. } | Media::Video { natural, .. }) => {
                *natural = Some((w, h));
            }
            None => return Vec::new(),
        }
        let Some(wrapper) = surface.parent(media).filter(|&p| is_wrapper(surface, p)) else {
            return vec![Action::RenderNeeded];
        };
        self.normalizer.resync(surface, wrapper);
        self.handles = Some(ResizeHandles::attach(surface, wrapper));
        // One more resync after the next frame guards the race between
        // decode and observer attachment.
        self.pending_resync.push((slide, surface.id(), wrapper));
        vec![Action::RequestFrame, Action::RenderNeeded]
    }
}
