//! Direct-manipulation positioning engine for carousel slide media.
//!
//! This crate owns the editing lifecycle of a slide's visual media: it
//! classifies what a pointer hit, guarantees structural wrapper invariants
//! around editable media, runs the drag and resize gesture state machines
//! with cover-fit crop math, rewrites slots when an image is swapped for a
//! video (or back), and shapes the results as partial style patches for the
//! host to persist. The host layer is responsible only for hydrating
//! per-slide document surfaces, wiring raw input events to the engine, and
//! processing the resulting [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::Editor`] and the host action protocol |
//! | [`surface`] | Per-slide element tree, computed styles, hit testing |
//! | [`classify`] | Pointer-target media classification and protection rules |
//! | [`wrapper`] | Structural wrapper invariants and preserved framing |
//! | [`drag`] | Drag sessions: pointer deltas to clamped positions |
//! | [`resize`] | Edge-strip height resizing of the active container |
//! | [`swap`] | Image⇄video slot rewrites that keep framing intact |
//! | [`probe`] | Deadline-tagged natural-size probing for backgrounds |
//! | [`persist`] | Partial style patches and the in-memory style store |
//! | [`geometry`] | Cover-fit scaling, clamping, percentage conversions |
//! | [`consts`] | Shared numeric constants (height clamps, timeouts, etc.) |

pub mod classify;
pub mod consts;
pub mod drag;
pub mod engine;
pub mod geometry;
pub mod persist;
pub mod probe;
pub mod resize;
pub mod surface;
pub mod swap;
pub mod wrapper;
