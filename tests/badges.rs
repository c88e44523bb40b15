//! Badge table population and badge directory load states.

use chat_render::badge::{BadgeDirectory, BadgeKind, BadgeLoadState, BadgeTable};

// ============================================================================
// Static table
// ============================================================================

/// Every badge kind has embedded artwork that decodes.
#[test]
fn table_is_populated_for_every_kind() {
    let table = BadgeTable::load();
    for kind in BadgeKind::ALL {
        let image = table.get(kind);
        assert!(image.is_some(), "missing bitmap for {kind:?}");
        let image = image.unwrap();
        assert!(image.width() > 0 && image.height() > 0);
    }
}

/// The table hands out shared references; repeated gets are the same bitmap.
#[test]
fn table_gets_are_stable() {
    let table = BadgeTable::load();
    let a = table.get(BadgeKind::Moderator).unwrap();
    let b = table.get(BadgeKind::Moderator).unwrap();
    assert!(std::sync::Arc::ptr_eq(a, b));
}

// ============================================================================
// Directory / manifest
// ============================================================================

const MANIFEST: &str = r#"{
    "badges": [
        {
            "image": "https://example.com/badges/contributor.png",
            "tooltip": "Contributor",
            "users": ["alice", "bob"]
        },
        {
            "image": "https://example.com/badges/supporter.png",
            "tooltip": "Supporter",
            "users": ["carol"]
        }
    ]
}"#;

#[test]
fn manifest_merge_populates_users() {
    let dir = BadgeDirectory::new();
    assert_eq!(dir.state(), BadgeLoadState::Loading);

    let applied = dir.apply_manifest(MANIFEST.as_bytes()).unwrap();
    assert_eq!(applied, 2);
    assert_eq!(dir.state(), BadgeLoadState::Ready);
    assert_eq!(dir.len(), 3);

    let alice = dir.get("alice").unwrap();
    assert_eq!(alice.tooltip, "Contributor");
    let carol = dir.get("carol").unwrap();
    assert_eq!(carol.image_url, "https://example.com/badges/supporter.png");
    assert!(dir.get("nobody").is_none());
}

/// A parse failure surfaces as an error and a distinguishable state instead
/// of being swallowed.
#[test]
fn bad_manifest_marks_unavailable() {
    let dir = BadgeDirectory::new();
    let err = dir.apply_manifest(b"{ not json }");
    assert!(err.is_err());
    assert_eq!(dir.state(), BadgeLoadState::Unavailable);
    assert!(dir.is_empty());
}

/// A later successful merge retries out of the unavailable state.
#[test]
fn retry_recovers_from_unavailable() {
    let dir = BadgeDirectory::new();
    dir.mark_unavailable();
    assert_eq!(dir.state(), BadgeLoadState::Unavailable);

    dir.apply_manifest(MANIFEST.as_bytes()).unwrap();
    assert_eq!(dir.state(), BadgeLoadState::Ready);
    assert!(dir.get("bob").is_some());
}

/// Background merges land without the caller waiting on the result.
#[tokio::test]
async fn background_merge_reaches_ready() {
    let dir = std::sync::Arc::new(BadgeDirectory::new());
    let handle = dir.clone().merge_in_background(MANIFEST.as_bytes().to_vec());
    handle.await.unwrap();
    assert_eq!(dir.state(), BadgeLoadState::Ready);
    assert!(dir.get("alice").is_some());
}

/// Badges without a users list are accepted (empty assignment).
#[test]
fn users_field_is_optional() {
    let dir = BadgeDirectory::new();
    let applied = dir
        .apply_manifest(br#"{"badges": [{"image": "u", "tooltip": "t"}]}"#)
        .unwrap();
    assert_eq!(applied, 1);
    assert_eq!(dir.len(), 0);
    assert_eq!(dir.state(), BadgeLoadState::Ready);
}
