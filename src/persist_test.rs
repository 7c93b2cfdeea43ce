use super::*;

// =============================================================
// StylePatch
// =============================================================

#[test]
fn default_patch_is_empty() {
    assert!(StylePatch::default().is_empty());
}

#[test]
fn patch_with_field_is_not_empty() {
    let patch = StylePatch { height: Some("420px".into()), ..Default::default() };
    assert!(!patch.is_empty());
}

#[test]
fn merge_overwrites_present_fields_only() {
    let mut record = StylePatch {
        object_position: Some("50% 50%".into()),
        height: Some("400px".into()),
        ..Default::default()
    };
    let update = StylePatch { object_position: Some("60% 50%".into()), ..Default::default() };
    record.merge(&update);
    assert_eq!(record.object_position.as_deref(), Some("60% 50%"));
    assert_eq!(record.height.as_deref(), Some("400px"));
}

#[test]
fn merge_fills_absent_fields() {
    let mut record = StylePatch::default();
    let update = StylePatch {
        background_position_x: Some("25%".into()),
        background_position_y: Some("75%".into()),
        ..Default::default()
    };
    record.merge(&update);
    assert_eq!(record.background_position_x.as_deref(), Some("25%"));
    assert_eq!(record.background_position_y.as_deref(), Some("75%"));
}

// =============================================================
// Serialization
// =============================================================

#[test]
fn absent_fields_are_skipped_on_the_wire() {
    let patch = StylePatch { object_position: Some("60% 50%".into()), ..Default::default() };
    let json = serde_json::to_value(&patch).unwrap_or_default();
    assert_eq!(json, serde_json::json!({ "objectPosition": "60% 50%" }));
}

#[test]
fn wire_round_trip() {
    let patch = StylePatch {
        background_position_x: Some("10%".into()),
        background_position_y: Some("90%".into()),
        height: Some("640px".into()),
        ..Default::default()
    };
    let json = serde_json::to_string(&patch).unwrap_or_default();
    let back: StylePatch = serde_json::from_str(&json).unwrap_or_default();
    assert_eq!(back, patch);
}

// =============================================================
// StyleStore
// =============================================================

#[test]
fn new_store_is_empty() {
    let store = StyleStore::new();
    assert!(store.is_empty());
    assert!(!store.has_unsaved_changes());
}

#[test]
fn apply_creates_record() {
    let mut store = StyleStore::new();
    let patch = StylePatch { object_position: Some("60% 50%".into()), ..Default::default() };
    store.apply(0, ROLE_BACKGROUND, &patch);
    assert_eq!(store.len(), 1);
    assert_eq!(store.get(0, ROLE_BACKGROUND), Some(&patch));
}

#[test]
fn apply_merges_into_existing_record() {
    let mut store = StyleStore::new();
    store.apply(2, ROLE_BACKGROUND, &StylePatch { height: Some("400px".into()), ..Default::default() });
    store.apply(2, ROLE_BACKGROUND, &StylePatch { object_position: Some("10% 20%".into()), ..Default::default() });
    let record = store.get(2, ROLE_BACKGROUND);
    assert_eq!(record.and_then(|r| r.height.as_deref()), Some("400px"));
    assert_eq!(record.and_then(|r| r.object_position.as_deref()), Some("10% 20%"));
}

#[test]
fn records_are_keyed_by_slide_and_role() {
    let mut store = StyleStore::new();
    store.apply(0, ROLE_BACKGROUND, &StylePatch { height: Some("300px".into()), ..Default::default() });
    store.apply(1, ROLE_BACKGROUND, &StylePatch { height: Some("500px".into()), ..Default::default() });
    assert_eq!(store.get(0, ROLE_BACKGROUND).and_then(|r| r.height.as_deref()), Some("300px"));
    assert_eq!(store.get(1, ROLE_BACKGROUND).and_then(|r| r.height.as_deref()), Some("500px"));
    assert!(store.get(2, ROLE_BACKGROUND).is_none());
}

// =============================================================
// apply_action
// =============================================================

#[test]
fn commit_action_is_applied() {
    let mut store = StyleStore::new();
    let action = Action::CommitStyle {
        slide: 3,
        role: ROLE_BACKGROUND.to_string(),
        patch: StylePatch { height: Some("200px".into()), ..Default::default() },
    };
    assert!(store.apply_action(&action));
    assert_eq!(store.get(3, ROLE_BACKGROUND).and_then(|r| r.height.as_deref()), Some("200px"));
}

#[test]
fn mark_unsaved_action_sets_flag() {
    let mut store = StyleStore::new();
    assert!(store.apply_action(&Action::MarkUnsaved));
    assert!(store.has_unsaved_changes());
    store.mark_saved();
    assert!(!store.has_unsaved_changes());
}

#[test]
fn other_actions_are_ignored() {
    let mut store = StyleStore::new();
    assert!(!store.apply_action(&Action::RenderNeeded));
    assert!(store.is_empty());
}
