//! Shared numeric constants for the slidecanvas crate.

// ── Containers ──────────────────────────────────────────────────

/// Smallest height a media container can be resized to, in CSS pixels.
pub const MIN_CONTAINER_HEIGHT_PX: f64 = 120.0;

/// Largest height a media container can be resized to, in CSS pixels.
pub const MAX_CONTAINER_HEIGHT_PX: f64 = 4096.0;

/// Wrapper width used when an element has no measurable rendered width.
pub const FALLBACK_WRAPPER_WIDTH_PX: f64 = 1080.0;

/// Wrapper height used when an element has no measurable rendered height.
pub const FALLBACK_WRAPPER_HEIGHT_PX: f64 = 1350.0;

// ── Classification ──────────────────────────────────────────────

/// Maximum ancestor levels walked when searching for a CSS background host.
pub const BACKGROUND_WALK_DEPTH: usize = 20;

/// Elements at or below this size (both axes) with a circular border-radius
/// are treated as template chrome and excluded from editing.
pub const PROTECTED_MAX_DIM_PX: f64 = 120.0;

// ── Resize handles ──────────────────────────────────────────────

/// Thickness of the invisible edge strips used for height resizing.
pub const HANDLE_THICKNESS_PX: f64 = 8.0;

// ── Natural-size probing ────────────────────────────────────────

/// Deadline for an out-of-band background image probe.
pub const PROBE_TIMEOUT_MS: u64 = 2000;

/// Assumed 16:9 natural width when a probe fails or times out.
pub const ESTIMATED_NATURAL_W: f64 = 1600.0;

/// Assumed 16:9 natural height when a probe fails or times out.
pub const ESTIMATED_NATURAL_H: f64 = 900.0;
