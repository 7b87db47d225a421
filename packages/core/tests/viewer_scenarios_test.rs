//! Integration tests for viewer-scoped permission scenarios
//!
//! Tests cover:
//! - Public objects readable by everyone, including anonymous viewers
//! - Private objects suppressed (null) for viewers without a path
//! - Owner rights, including the "cannot report own content" rule
//! - Organization membership elevation (admin and permission bits)
//! - Sharing grants opening read-only access
//! - Denied reads leaking nothing through the output

use prism_core::models::{
    EntityKind, EntityRecord, InteractionState, OrgMembership, OwnerRef, Permissions,
    ProjectionRequest, ProjectionVariant, ResolveOptions, Version, Viewer,
};
use prism_core::services::ProjectionAssembler;
use prism_core::store::MemoryStore;
use serde_json::json;
use std::sync::Arc;

fn init_logs() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

async fn seeded_store() -> Arc<MemoryStore> {
    init_logs();
    let store = Arc::new(MemoryStore::new());

    store
        .insert_entity(EntityRecord::with_id(
            "u-owner".to_string(),
            EntityKind::User,
            json!({ "name": "Ada", "handle": "ada", "isBot": false }),
        ))
        .await;
    store
        .insert_entity(EntityRecord::with_id(
            "org-1".to_string(),
            EntityKind::Organization,
            json!({ "name": "Atlas", "handle": "atlas" }),
        ))
        .await;

    // Public project owned by a user
    store
        .insert_entity(
            EntityRecord::with_id(
                "p-pub".to_string(),
                EntityKind::Project,
                json!({ "name": "Telemetry", "handle": "telemetry", "summary": "Pipeline" }),
            )
            .owned_by(OwnerRef::user("u-owner")),
        )
        .await;
    store
        .insert_version(Version::new("p-pub", 1))
        .await;
    store
        .insert_version(Version::new("p-pub", 2).latest().with_label("v0.2"))
        .await;

    // Private note owned by the same user
    store
        .insert_entity(
            EntityRecord::with_id(
                "n-priv".to_string(),
                EntityKind::Note,
                json!({ "name": "Scratchpad" }),
            )
            .owned_by(OwnerRef::user("u-owner"))
            .private(),
        )
        .await;
    store.insert_version(Version::new("n-priv", 1).latest()).await;

    // Private routine owned by the organization
    store
        .insert_entity(
            EntityRecord::with_id(
                "r-org".to_string(),
                EntityKind::Routine,
                json!({ "name": "Deploy", "handle": "deploy" }),
            )
            .owned_by(OwnerRef::organization("org-1"))
            .private(),
        )
        .await;
    store.insert_version(Version::new("r-org", 1).latest()).await;

    store
}

async fn assemble_one(
    store: Arc<MemoryStore>,
    request: ProjectionRequest,
    viewer: Viewer,
) -> serde_json::Value {
    let assembler = ProjectionAssembler::new(store);
    let out = assembler
        .assemble(&request, &viewer, &ResolveOptions::new())
        .await
        .unwrap();
    out.as_array().unwrap()[0].clone()
}

// =========================================================================
// Anonymous viewer
// =========================================================================

#[tokio::test]
async fn test_anonymous_list_of_public_project() {
    let store = seeded_store().await;
    let node = assemble_one(
        store,
        ProjectionRequest::by_ids(EntityKind::Project, ProjectionVariant::List, ["p-pub"]),
        Viewer::anonymous(),
    )
    .await;

    assert_eq!(node["you"]["canRead"], true);
    assert_eq!(node["you"]["canUpdate"], false);
    assert_eq!(node["you"]["isBookmarked"], false);
    assert_eq!(node["name"], "Telemetry");
}

#[tokio::test]
async fn test_anonymous_denied_private_object() {
    let store = seeded_store().await;
    let node = assemble_one(
        store,
        ProjectionRequest::by_ids(EntityKind::Note, ProjectionVariant::Full, ["n-priv"]),
        Viewer::anonymous(),
    )
    .await;
    assert!(node.is_null(), "denied reads emit null, not partial objects");
}

// =========================================================================
// Owner viewer
// =========================================================================

#[tokio::test]
async fn test_owner_full_projection_of_private_note() {
    let store = seeded_store().await;
    let node = assemble_one(
        store,
        ProjectionRequest::by_ids(EntityKind::Note, ProjectionVariant::Full, ["n-priv"]),
        Viewer::user("u-owner"),
    )
    .await;

    assert_eq!(node["you"]["canRead"], true);
    assert_eq!(node["you"]["canUpdate"], true);
    assert_eq!(
        node["you"]["canReport"], false,
        "owners cannot report their own content"
    );
    assert_eq!(node["you"]["canCopy"], true);
}

// =========================================================================
// Organization membership
// =========================================================================

#[tokio::test]
async fn test_org_admin_updates_private_routine_via_membership() {
    let store = seeded_store().await;
    let viewer = Viewer::user("u-admin").with_membership(OrgMembership::admin("org-1"));
    let node = assemble_one(
        store,
        ProjectionRequest::by_ids(EntityKind::Routine, ProjectionVariant::Full, ["r-org"]),
        viewer,
    )
    .await;

    assert_eq!(node["you"]["canRead"], true);
    assert_eq!(
        node["you"]["canUpdate"], true,
        "admin membership elevates even though the viewer is not the direct owner"
    );
}

#[tokio::test]
async fn test_org_member_bits_gate_capabilities() {
    let store = seeded_store().await;
    let viewer = Viewer::user("u-member").with_membership(
        OrgMembership::member("org-1").with_permissions(Permissions::UPDATE),
    );
    let node = assemble_one(
        store.clone(),
        ProjectionRequest::by_ids(EntityKind::Routine, ProjectionVariant::Full, ["r-org"]),
        viewer,
    )
    .await;

    assert_eq!(node["you"]["canRead"], true);
    assert_eq!(node["you"]["canUpdate"], true);
    assert_eq!(node["you"]["canDelete"], false);

    // Plain membership opens the read but grants no mutation
    let plain = Viewer::user("u-plain").with_membership(OrgMembership::member("org-1"));
    let node = assemble_one(
        store,
        ProjectionRequest::by_ids(EntityKind::Routine, ProjectionVariant::Full, ["r-org"]),
        plain,
    )
    .await;
    assert_eq!(node["you"]["canRead"], true);
    assert_eq!(node["you"]["canUpdate"], false);
}

#[tokio::test]
async fn test_stranger_sees_null_for_org_private_routine() {
    let store = seeded_store().await;
    let node = assemble_one(
        store,
        ProjectionRequest::by_ids(EntityKind::Routine, ProjectionVariant::Full, ["r-org"]),
        Viewer::user("u-stranger"),
    )
    .await;
    assert!(node.is_null());
}

// =========================================================================
// Sharing grants
// =========================================================================

#[tokio::test]
async fn test_sharing_grant_opens_read_only_access() {
    let store = seeded_store().await;
    store
        .grant_read(EntityKind::Note, "n-priv", "u-guest")
        .await;

    let node = assemble_one(
        store,
        ProjectionRequest::by_ids(EntityKind::Note, ProjectionVariant::Full, ["n-priv"]),
        Viewer::user("u-guest"),
    )
    .await;

    assert_eq!(node["you"]["canRead"], true);
    assert_eq!(node["you"]["canUpdate"], false);
    assert_eq!(node["you"]["canCopy"], false, "private and not owned");
}

// =========================================================================
// Interaction state
// =========================================================================

#[tokio::test]
async fn test_interaction_state_is_viewer_scoped() {
    let store = seeded_store().await;
    store
        .set_interaction(
            EntityKind::Project,
            "p-pub",
            "u-fan",
            InteractionState {
                is_bookmarked: true,
                is_viewed: true,
                reaction: Some("star".to_string()),
            },
        )
        .await;

    let node = assemble_one(
        store.clone(),
        ProjectionRequest::by_ids(EntityKind::Project, ProjectionVariant::List, ["p-pub"]),
        Viewer::user("u-fan"),
    )
    .await;
    assert_eq!(node["you"]["isBookmarked"], true);
    assert_eq!(node["you"]["isViewed"], true);
    assert_eq!(node["you"]["reaction"], "star");

    // A different viewer never sees that state
    let node = assemble_one(
        store,
        ProjectionRequest::by_ids(EntityKind::Project, ProjectionVariant::List, ["p-pub"]),
        Viewer::user("u-other"),
    )
    .await;
    assert_eq!(node["you"]["isBookmarked"], false);
    assert!(node["you"].get("reaction").is_none());
}

#[tokio::test]
async fn test_denied_read_leaks_no_interaction_state() {
    let store = seeded_store().await;
    // The viewer bookmarked the note before it went private
    store
        .set_interaction(
            EntityKind::Note,
            "n-priv",
            "u-stranger",
            InteractionState {
                is_bookmarked: true,
                ..Default::default()
            },
        )
        .await;

    let node = assemble_one(
        store,
        ProjectionRequest::by_ids(EntityKind::Note, ProjectionVariant::Full, ["n-priv"]),
        Viewer::user("u-stranger"),
    )
    .await;
    assert!(node.is_null());
}
