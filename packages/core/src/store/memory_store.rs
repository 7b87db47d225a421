//! In-Memory Reference Store
//!
//! A `ContentStore` implementation over plain hash maps behind an async
//! read/write lock. It backs the integration tests and doubles as the
//! seeding surface for demo data; a production deployment supplies its
//! own backend behind the same trait.

use crate::models::{
    EntityKind, EntityRecord, InteractionState, Label, SearchFilter, SortOrder, Tag, Version,
    VersionMode,
};
use crate::store::content_store::ContentStore;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    entities: HashMap<EntityKind, HashMap<String, EntityRecord>>,
    /// root_id -> version rows, insertion order preserved
    versions: HashMap<String, Vec<Version>>,
    counters: HashMap<(EntityKind, String), HashMap<String, i64>>,
    tags: HashMap<(EntityKind, String), Vec<Tag>>,
    labels: HashMap<(EntityKind, String), Vec<Label>>,
    /// (kind, object id, viewer id) -> state
    interactions: HashMap<(EntityKind, String, String), InteractionState>,
    /// (kind, object id, viewer id)
    grants: HashSet<(EntityKind, String, String)>,
}

/// In-memory `ContentStore` with a seeding API.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one entity row. Replaces any existing row with the same id.
    pub async fn insert_entity(&self, record: EntityRecord) {
        let mut inner = self.inner.write().await;
        inner
            .entities
            .entry(record.kind)
            .or_default()
            .insert(record.id.clone(), record);
    }

    /// Seed one version row, appended in store order.
    pub async fn insert_version(&self, version: Version) {
        let mut inner = self.inner.write().await;
        inner
            .versions
            .entry(version.root_id.clone())
            .or_default()
            .push(version);
    }

    /// Seed a named counter value.
    pub async fn set_counter(&self, kind: EntityKind, id: &str, name: &str, value: i64) {
        let mut inner = self.inner.write().await;
        inner
            .counters
            .entry((kind, id.to_string()))
            .or_default()
            .insert(name.to_string(), value);
    }

    /// Seed a tag annotation on an object.
    pub async fn add_tag(&self, kind: EntityKind, id: &str, tag: Tag) {
        let mut inner = self.inner.write().await;
        inner.tags.entry((kind, id.to_string())).or_default().push(tag);
    }

    /// Seed a label annotation on an object.
    pub async fn add_label(&self, kind: EntityKind, id: &str, label: Label) {
        let mut inner = self.inner.write().await;
        inner
            .labels
            .entry((kind, id.to_string()))
            .or_default()
            .push(label);
    }

    /// Seed a viewer's interaction state with an object.
    pub async fn set_interaction(
        &self,
        kind: EntityKind,
        id: &str,
        viewer_id: &str,
        state: InteractionState,
    ) {
        let mut inner = self.inner.write().await;
        inner
            .interactions
            .insert((kind, id.to_string(), viewer_id.to_string()), state);
    }

    /// Seed an explicit read grant for a viewer on an object.
    pub async fn grant_read(&self, kind: EntityKind, id: &str, viewer_id: &str) {
        let mut inner = self.inner.write().await;
        inner
            .grants
            .insert((kind, id.to_string(), viewer_id.to_string()));
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn fetch_by_ids(&self, kind: EntityKind, ids: &[String]) -> Result<Vec<EntityRecord>> {
        let inner = self.inner.read().await;
        let Some(rows) = inner.entities.get(&kind) else {
            return Ok(Vec::new());
        };
        Ok(ids.iter().filter_map(|id| rows.get(id).cloned()).collect())
    }

    async fn fetch_versions(
        &self,
        root_ids: &[String],
        mode: VersionMode,
    ) -> Result<HashMap<String, Vec<Version>>> {
        let inner = self.inner.read().await;
        let mut out = HashMap::new();
        for root_id in root_ids {
            if let Some(versions) = inner.versions.get(root_id) {
                let slice = match mode {
                    // Latest mode still returns every row here: the
                    // selector owns the fallback when no is_latest flag
                    // survives, so it needs the full set to pick from.
                    VersionMode::Latest | VersionMode::All => versions.clone(),
                };
                out.insert(root_id.clone(), slice);
            }
        }
        Ok(out)
    }

    async fn fetch_counters(
        &self,
        kind: EntityKind,
        ids: &[String],
        names: &[&str],
    ) -> Result<HashMap<String, HashMap<String, i64>>> {
        let inner = self.inner.read().await;
        let mut out = HashMap::new();
        for id in ids {
            if let Some(values) = inner.counters.get(&(kind, id.clone())) {
                let picked: HashMap<String, i64> = names
                    .iter()
                    .filter_map(|name| values.get(*name).map(|v| (name.to_string(), *v)))
                    .collect();
                out.insert(id.clone(), picked);
            }
        }
        Ok(out)
    }

    async fn fetch_tags(
        &self,
        kind: EntityKind,
        ids: &[String],
    ) -> Result<HashMap<String, Vec<Tag>>> {
        let inner = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| {
                inner
                    .tags
                    .get(&(kind, id.clone()))
                    .map(|tags| (id.clone(), tags.clone()))
            })
            .collect())
    }

    async fn fetch_labels(
        &self,
        kind: EntityKind,
        ids: &[String],
    ) -> Result<HashMap<String, Vec<Label>>> {
        let inner = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| {
                inner
                    .labels
                    .get(&(kind, id.clone()))
                    .map(|labels| (id.clone(), labels.clone()))
            })
            .collect())
    }

    async fn fetch_interactions(
        &self,
        kind: EntityKind,
        ids: &[String],
        viewer_id: &str,
    ) -> Result<HashMap<String, InteractionState>> {
        let inner = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| {
                inner
                    .interactions
                    .get(&(kind, id.clone(), viewer_id.to_string()))
                    .map(|state| (id.clone(), state.clone()))
            })
            .collect())
    }

    async fn fetch_sharing_grants(
        &self,
        kind: EntityKind,
        ids: &[String],
        viewer_id: &str,
    ) -> Result<HashSet<String>> {
        let inner = self.inner.read().await;
        Ok(ids
            .iter()
            .filter(|id| {
                inner
                    .grants
                    .contains(&(kind, (*id).clone(), viewer_id.to_string()))
            })
            .cloned()
            .collect())
    }

    async fn search(&self, kind: EntityKind, filter: &SearchFilter) -> Result<Vec<String>> {
        let inner = self.inner.read().await;
        let Some(rows) = inner.entities.get(&kind) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<&EntityRecord> = rows
            .values()
            .filter(|record| {
                if filter.public_only.unwrap_or(false) && record.is_hidden() {
                    return false;
                }
                if let Some(after) = filter.updated_after {
                    if record.updated_at <= after {
                        return false;
                    }
                }
                true
            })
            .collect();

        match filter.sort {
            Some(SortOrder::Popular) => {
                let score_of = |record: &EntityRecord| {
                    inner
                        .counters
                        .get(&(kind, record.id.clone()))
                        .and_then(|values| values.get("score"))
                        .copied()
                        .unwrap_or(0)
                };
                matched.sort_by_key(|record| std::cmp::Reverse(score_of(record)));
            }
            Some(SortOrder::Newest) => {
                matched.sort_by_key(|record| std::cmp::Reverse(record.created_at));
            }
            Some(SortOrder::RecentlyUpdated) | None => {
                matched.sort_by_key(|record| std::cmp::Reverse(record.updated_at));
            }
        }

        let take = filter.take.unwrap_or(usize::MAX);
        Ok(matched.into_iter().take(take).map(|r| r.id.clone()).collect())
    }
}
