//! ContentStore Trait - Storage Abstraction Layer
//!
//! This trait is the engine's only path to durable state. Every method is
//! batched: the projection assembler issues one call per (kind, facet)
//! pair per request, never one per object.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: all methods are async to support both embedded and
//!    network backends
//! 2. **Batched Contract**: methods take id slices and return maps keyed
//!    by id; absent keys mean "no data", not failure
//! 3. **Error Handling**: `anyhow::Result` for flexible backend error
//!    context; content-level misses are not errors
//! 4. **Read-Only**: the engine never writes; counter maintenance and
//!    entity mutation belong to write-side collaborators
//!
//! # Examples
//!
//! ```rust,no_run
//! use prism_core::store::{ContentStore, MemoryStore};
//! use prism_core::models::EntityKind;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
//!     let rows = store
//!         .fetch_by_ids(EntityKind::Project, &["p-1".to_string()])
//!         .await?;
//!     assert!(rows.is_empty());
//!     Ok(())
//! }
//! ```

use crate::models::{
    EntityKind, EntityRecord, InteractionState, Label, SearchFilter, Tag, Version, VersionMode,
};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

/// Abstraction layer for batched, read-only content lookups.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the assembler runs facet calls
/// concurrently and may move futures between threads.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch entity rows by id.
    ///
    /// Ids with no backing row are simply absent from the result; the
    /// caller maps them to null output nodes. Row order is unspecified -
    /// callers join by id.
    async fn fetch_by_ids(&self, kind: EntityKind, ids: &[String]) -> Result<Vec<EntityRecord>>;

    /// Fetch version history for a batch of roots.
    ///
    /// `mode` lets a backend skip non-latest rows when only the latest
    /// version is projected. Returned vectors carry whatever order the
    /// backend has; the version selector re-orders and checks integrity.
    async fn fetch_versions(
        &self,
        root_ids: &[String],
        mode: VersionMode,
    ) -> Result<HashMap<String, Vec<Version>>>;

    /// Fetch named pre-maintained counters for a batch of objects.
    ///
    /// Counters are never computed by iterating relations - they are
    /// read through from write-side maintained values. Unknown names may
    /// be absent per object; missing objects may be absent entirely.
    async fn fetch_counters(
        &self,
        kind: EntityKind,
        ids: &[String],
        names: &[&str],
    ) -> Result<HashMap<String, HashMap<String, i64>>>;

    /// Fetch tag annotations for a batch of objects.
    async fn fetch_tags(
        &self,
        kind: EntityKind,
        ids: &[String],
    ) -> Result<HashMap<String, Vec<Tag>>>;

    /// Fetch label annotations for a batch of objects.
    async fn fetch_labels(
        &self,
        kind: EntityKind,
        ids: &[String],
    ) -> Result<HashMap<String, Vec<Label>>>;

    /// Fetch the viewer's own bookmark/view/reaction state for a batch of
    /// objects. Objects the viewer never interacted with may be absent.
    async fn fetch_interactions(
        &self,
        kind: EntityKind,
        ids: &[String],
        viewer_id: &str,
    ) -> Result<HashMap<String, InteractionState>>;

    /// Fetch the subset of `ids` the viewer holds an explicit read grant
    /// for.
    async fn fetch_sharing_grants(
        &self,
        kind: EntityKind,
        ids: &[String],
        viewer_id: &str,
    ) -> Result<HashSet<String>>;

    /// Evaluate a search filter to a root id set (e.g. a "popular"
    /// ranking). Ranking semantics belong to the backend; the engine only
    /// consumes the resulting ids, in order.
    async fn search(&self, kind: EntityKind, filter: &SearchFilter) -> Result<Vec<String>>;
}
