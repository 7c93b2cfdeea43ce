//! Out-of-band natural-size probing for CSS background images.
//!
//! Background hosts expose no intrinsic dimensions, so the engine asks the
//! host to load the image off-screen and report back. The request carries a
//! deadline; on failure or timeout the engine falls back to an assumed 16:9
//! estimate so dragging stays usable when CORS or network failures block
//! measurement. Results are tagged so callers can tell a measurement from
//! an estimate.

#[cfg(test)]
#[path = "probe_test.rs"]
mod probe_test;

use uuid::Uuid;

use crate::consts::{ESTIMATED_NATURAL_H, ESTIMATED_NATURAL_W};
use crate::surface::SurfaceId;

/// Identifies one in-flight probe; stale tokens are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeToken(Uuid);

/// A media asset's natural dimensions, either measured from the decoded
/// asset or estimated after a failed/timed-out probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NaturalSize {
    Measured { w: f64, h: f64 },
    Estimated { w: f64, h: f64 },
}

impl NaturalSize {
    #[must_use]
    pub fn dims(self) -> (f64, f64) {
        match self {
            Self::Measured { w, h } | Self::Estimated { w, h } => (w, h),
        }
    }

    #[must_use]
    pub fn is_estimated(self) -> bool {
        matches!(self, Self::Estimated { .. })
    }

    /// The assumed 16:9 size used when measurement is impossible.
    #[must_use]
    pub fn assumed() -> Self {
        Self::Estimated { w: ESTIMATED_NATURAL_W, h: ESTIMATED_NATURAL_H }
    }
}

/// Tracks the single in-flight probe. Starting a new probe supersedes the
/// previous one; callbacks for superseded tokens are no-ops.
#[derive(Debug, Default)]
pub struct ProbeTracker {
    current: Option<(ProbeToken, SurfaceId)>,
}

impl ProbeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a probe for `surface`, invalidating any previous one.
    pub fn begin(&mut self, surface: SurfaceId) -> ProbeToken {
        let token = ProbeToken(Uuid::new_v4());
        self.current = Some((token, surface));
        token
    }

    /// Whether `token` is still the live probe.
    #[must_use]
    pub fn is_current(&self, token: ProbeToken) -> bool {
        self.current.is_some_and(|(t, _)| t == token)
    }

    /// Consume the live probe if `token` matches, returning its surface.
    pub fn take(&mut self, token: ProbeToken) -> Option<SurfaceId> {
        if self.is_current(token) {
            self.current.take().map(|(_, surface)| surface)
        } else {
            None
        }
    }

    /// Drop any in-flight probe (session aborted or surface replaced).
    pub fn cancel(&mut self) {
        self.current = None;
    }
}
