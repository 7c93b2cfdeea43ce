//! Style persistence bridge: the durable, per-slide, per-role style
//! records the engine writes on session commit.
//!
//! Writes are always merge-shaped partial patches — never wholesale
//! replacement — and last-write-wins, since each write is scoped to a
//! disjoint `(slide, role)` key and property subset. The store here is the
//! in-memory implementation hosts and tests use; a host that persists to a
//! server consumes the same `Action::CommitStyle` values instead.

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::engine::Action;

/// Position of a slide in the carousel.
pub type SlideIndex = usize;

/// Role under which the primary visual of a slide is keyed. Any primary
/// media — image, video, or CSS background — persists under this role.
pub const ROLE_BACKGROUND: &str = "background";

/// Sparse style update for one `(slide, role)` record. Only present fields
/// are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StylePatch {
    /// New `object-position` value, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_position: Option<String>,
    /// New `background-position-x` value, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_position_x: Option<String>,
    /// New `background-position-y` value, if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_position_y: Option<String>,
    /// New container height (CSS length), if being updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
}

impl StylePatch {
    /// Whether no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.object_position.is_none()
            && self.background_position_x.is_none()
            && self.background_position_y.is_none()
            && self.height.is_none()
    }

    /// Merge `other` into `self`; present fields overwrite.
    pub fn merge(&mut self, other: &StylePatch) {
        if let Some(value) = &other.object_position {
            self.object_position = Some(value.clone());
        }
        if let Some(value) = &other.background_position_x {
            self.background_position_x = Some(value.clone());
        }
        if let Some(value) = &other.background_position_y {
            self.background_position_y = Some(value.clone());
        }
        if let Some(value) = &other.height {
            self.height = Some(value.clone());
        }
    }
}

/// In-memory key-value store of persisted style records.
#[derive(Debug, Default)]
pub struct StyleStore {
    records: HashMap<(SlideIndex, String), StylePatch>,
    unsaved: bool,
}

impl StyleStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a partial patch into the record for `(slide, role)`.
    pub fn apply(&mut self, slide: SlideIndex, role: &str, patch: &StylePatch) {
        self.records.entry((slide, role.to_string())).or_default().merge(patch);
    }

    /// The persisted record for `(slide, role)`, if any.
    #[must_use]
    pub fn get(&self, slide: SlideIndex, role: &str) -> Option<&StylePatch> {
        self.records.get(&(slide, role.to_string()))
    }

    /// Consume one engine action, applying commits and the unsaved flag.
    /// Returns whether the action was persistence-relevant.
    pub fn apply_action(&mut self, action: &Action) -> bool {
        match action {
            Action::CommitStyle { slide, role, patch } => {
                self.apply(*slide, role, patch);
                true
            }
            Action::MarkUnsaved => {
                self.unsaved = true;
                true
            }
            _ => false,
        }
    }

    /// Whether any commit has been recorded since the flag was cleared.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// Clear the unsaved flag (the host saved).
    pub fn mark_saved(&mut self) {
        self.unsaved = false;
    }

    /// Number of `(slide, role)` records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
