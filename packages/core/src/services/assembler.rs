//! Projection Assembler
//!
//! Walks a root-level projection request in three passes:
//!
//! - **Pass 1 (collect)**: look up the registry shape, validate the
//!   optional selection tree against the fixed-projection-level rules,
//!   and work out which facets (owner, versions, counters, tags, labels,
//!   interactions, grants) this request actually needs
//! - **Pass 2 (resolve)**: one batched collaborator call per facet, run
//!   concurrently; the request deadline is propagated into every call and
//!   a slow or failing facet degrades to empty rather than failing the
//!   request
//! - **Pass 3 (assemble)**: join resolved facets back onto the requested
//!   id order, evaluating permissions per object; denied or missing
//!   objects are emitted as null, never as partial objects
//!
//! Termination is structural: relation hops that re-enter the graph
//! (owner, label owner) always render through the relation-free nav
//! shape, so nesting bottoms out in one hop regardless of the caller's
//! selection. A depth guard remains as a defensive backstop only.

use crate::catalog::{ProjectionRegistry, ProjectionSpec};
use crate::models::{
    EntityKind, EntityRecord, InteractionState, Label, Owner, OwnerRef, ProjectionRequest,
    ResolveOptions, RootSelector, SelectionNode, Tag, Version, VersionMode, Viewer, You,
};
use crate::services::counts::AggregateCounter;
use crate::services::error::ResolveError;
use crate::services::ownership::OwnershipResolver;
use crate::services::permissions::PermissionEvaluator;
use crate::services::versions::VersionSelector;
use crate::store::{ContentStore, StoreError};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::time::Instant;

/// Relation field names a selection tree may name.
const RELATION_FIELDS: [&str; 4] = ["owner", "versions", "tags", "labels"];

/// Assembler tuning.
#[derive(Debug, Clone, Copy)]
pub struct AssemblerConfig {
    /// Defensive depth guard. The fixed projection levels make depths
    /// beyond 2 structurally unreachable; tripping this aborts only the
    /// offending subtree.
    pub max_depth: usize,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self { max_depth: 8 }
    }
}

/// The engine's orchestrating service.
#[derive(Clone)]
pub struct ProjectionAssembler {
    store: Arc<dyn ContentStore>,
    registry: Arc<ProjectionRegistry>,
    ownership: OwnershipResolver,
    versions: VersionSelector,
    counters: AggregateCounter,
    config: AssemblerConfig,
}

/// Everything pass 2 resolved, keyed for the join pass.
struct ResolvedFacets {
    owners: HashMap<OwnerRef, Owner>,
    versions: HashMap<String, Vec<Version>>,
    counts: HashMap<String, HashMap<String, i64>>,
    tags: HashMap<String, Vec<Tag>>,
    labels: HashMap<String, Vec<Label>>,
    tag_states: HashMap<String, InteractionState>,
    label_owners: HashMap<OwnerRef, Owner>,
}

/// Which facets pass 1 decided this request needs.
struct FacetPlan {
    owner: bool,
    versions: Option<VersionMode>,
    tags: bool,
    labels: bool,
    counters: Vec<&'static str>,
}

impl ProjectionAssembler {
    /// Assembler over the built-in projection registry.
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self::with_registry(store, Arc::new(ProjectionRegistry::builtin()))
    }

    /// Assembler over a caller-supplied registry.
    pub fn with_registry(store: Arc<dyn ContentStore>, registry: Arc<ProjectionRegistry>) -> Self {
        Self {
            ownership: OwnershipResolver::new(store.clone()),
            versions: VersionSelector::new(store.clone()),
            counters: AggregateCounter::new(store.clone()),
            store,
            registry,
            config: AssemblerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AssemblerConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolve one root-level request for one viewer.
    ///
    /// Returns an array isomorphic to the requested id order; not-found
    /// and permission-denied entries are null. Only malformed input or a
    /// wholesale failure fetching the root rows is an error.
    pub async fn assemble(
        &self,
        request: &ProjectionRequest,
        viewer: &Viewer,
        options: &ResolveOptions,
    ) -> Result<Value, ResolveError> {
        let spec = *self
            .registry
            .get(request.kind, request.variant)
            .ok_or_else(|| ResolveError::unknown_variant(request.kind, request.variant))?;
        validate_selection(request)?;
        let selection = request.selection.as_ref();

        let deadline = options.deadline;
        let ids = self.resolve_root_ids(request, deadline).await?;
        let rows = hard_call(
            deadline,
            "fetching root rows",
            self.store.fetch_by_ids(request.kind, &ids),
        )
        .await?;
        tracing::debug!(
            "Assembling {} of {} requested {} rows as {}",
            rows.len(),
            ids.len(),
            request.kind,
            request.variant
        );
        let by_id: HashMap<String, EntityRecord> =
            rows.into_iter().map(|r| (r.id.clone(), r)).collect();

        // Pass 1: decide which facets this request needs.
        let plan = FacetPlan {
            owner: spec.owner && relation_selected(selection, "owner"),
            versions: spec
                .versions
                .filter(|_| relation_selected(selection, "versions")),
            tags: spec.tags && relation_selected(selection, "tags"),
            labels: spec.labels && relation_selected(selection, "labels"),
            counters: spec
                .counters
                .iter()
                .copied()
                .filter(|name| field_selected(selection, name))
                .collect(),
        };

        let facets = self
            .resolve_facets(request, viewer, &plan, &ids, &by_id, deadline)
            .await;
        let grants = self
            .resolve_grants(request, viewer, &by_id, &ids, deadline)
            .await;
        let interactions = self
            .resolve_interactions(request, viewer, &ids, deadline)
            .await;

        // Pass 3: join by id, in requested order.
        let mut out = Vec::with_capacity(ids.len());
        for id in &ids {
            let Some(record) = by_id.get(id) else {
                tracing::debug!("Requested {} {} not found", request.kind, id);
                out.push(Value::Null);
                continue;
            };

            let mut you = PermissionEvaluator::capabilities(record, viewer, grants.contains(id));
            if !you.can_read {
                out.push(Value::Null);
                continue;
            }
            if request.variant.is_rich() {
                let state = interactions.get(id).cloned().unwrap_or_default();
                you = you.with_interactions(&state);
            }

            out.push(self.render_object(record, &spec, selection, &plan, you, viewer, &facets, 0));
        }

        Ok(Value::Array(out))
    }

    async fn resolve_root_ids(
        &self,
        request: &ProjectionRequest,
        deadline: Option<Instant>,
    ) -> Result<Vec<String>, ResolveError> {
        match &request.selector {
            RootSelector::Ids(ids) => Ok(ids.clone()),
            RootSelector::Search(filter) => {
                hard_call(
                    deadline,
                    "searching root ids",
                    self.store.search(request.kind, filter),
                )
                .await
            }
        }
    }

    /// Pass 2: resolve every needed facet, concurrently, each degrading
    /// to empty on failure or deadline expiry.
    #[allow(clippy::too_many_arguments)]
    async fn resolve_facets(
        &self,
        request: &ProjectionRequest,
        viewer: &Viewer,
        plan: &FacetPlan,
        ids: &[String],
        by_id: &HashMap<String, EntityRecord>,
        deadline: Option<Instant>,
    ) -> ResolvedFacets {
        let mut owner_refs: Vec<OwnerRef> = if plan.owner {
            by_id.values().filter_map(|r| r.owner.clone()).collect()
        } else {
            Vec::new()
        };
        owner_refs.sort_by(|a, b| (a.kind as u8, &a.id).cmp(&(b.kind as u8, &b.id)));
        owner_refs.dedup();

        let (owners, versions, counts, tags, labels) = tokio::join!(
            async {
                if owner_refs.is_empty() {
                    HashMap::new()
                } else {
                    soft_call(
                        deadline,
                        "owner",
                        HashMap::new(),
                        self.ownership.resolve_batch(&owner_refs),
                    )
                    .await
                }
            },
            async {
                match plan.versions {
                    Some(mode) => {
                        soft_call(
                            deadline,
                            "versions",
                            HashMap::new(),
                            self.versions.select_batch(ids, mode),
                        )
                        .await
                    }
                    None => HashMap::new(),
                }
            },
            async {
                if plan.counters.is_empty() {
                    HashMap::new()
                } else {
                    soft_call(
                        deadline,
                        "counters",
                        HashMap::new(),
                        self.counters.counts_for(request.kind, ids, &plan.counters),
                    )
                    .await
                }
            },
            async {
                if plan.tags {
                    soft_call(
                        deadline,
                        "tags",
                        HashMap::new(),
                        self.store.fetch_tags(request.kind, ids),
                    )
                    .await
                } else {
                    HashMap::new()
                }
            },
            async {
                if plan.labels {
                    soft_call(
                        deadline,
                        "labels",
                        HashMap::new(),
                        self.store.fetch_labels(request.kind, ids),
                    )
                    .await
                } else {
                    HashMap::new()
                }
            },
        );

        // Tag viewer-state and label owners depend on the rows above, so
        // they resolve in a second (still batched, still concurrent)
        // round.
        let mut tag_ids: Vec<String> = tags
            .values()
            .flat_map(|list| list.iter().map(|t| t.id.clone()))
            .collect();
        tag_ids.sort();
        tag_ids.dedup();

        let mut label_owner_refs: Vec<OwnerRef> = labels
            .values()
            .flat_map(|list| list.iter().map(|l| l.owner.clone()))
            .collect();
        label_owner_refs.sort_by(|a, b| (a.kind as u8, &a.id).cmp(&(b.kind as u8, &b.id)));
        label_owner_refs.dedup();

        let (tag_states, label_owners) = tokio::join!(
            async {
                match &viewer.id {
                    Some(viewer_id) if !tag_ids.is_empty() => {
                        soft_call(
                            deadline,
                            "tag interactions",
                            HashMap::new(),
                            self.store
                                .fetch_interactions(EntityKind::Tag, &tag_ids, viewer_id),
                        )
                        .await
                    }
                    _ => HashMap::new(),
                }
            },
            async {
                if label_owner_refs.is_empty() {
                    HashMap::new()
                } else {
                    soft_call(
                        deadline,
                        "label owners",
                        HashMap::new(),
                        self.ownership.resolve_batch(&label_owner_refs),
                    )
                    .await
                }
            },
        );

        ResolvedFacets {
            owners,
            versions,
            counts,
            tags,
            labels,
            tag_states,
            label_owners,
        }
    }

    async fn resolve_grants(
        &self,
        request: &ProjectionRequest,
        viewer: &Viewer,
        by_id: &HashMap<String, EntityRecord>,
        ids: &[String],
        deadline: Option<Instant>,
    ) -> HashSet<String> {
        let any_hidden = by_id.values().any(|r| r.is_hidden());
        match &viewer.id {
            Some(viewer_id) if any_hidden => {
                soft_call(
                    deadline,
                    "sharing grants",
                    HashSet::new(),
                    self.store
                        .fetch_sharing_grants(request.kind, ids, viewer_id),
                )
                .await
            }
            _ => HashSet::new(),
        }
    }

    async fn resolve_interactions(
        &self,
        request: &ProjectionRequest,
        viewer: &Viewer,
        ids: &[String],
        deadline: Option<Instant>,
    ) -> HashMap<String, InteractionState> {
        match &viewer.id {
            Some(viewer_id) if request.variant.is_rich() => {
                soft_call(
                    deadline,
                    "interactions",
                    HashMap::new(),
                    self.store.fetch_interactions(request.kind, ids, viewer_id),
                )
                .await
            }
            _ => HashMap::new(),
        }
    }

    /// Render one readable record into its projected shape.
    #[allow(clippy::too_many_arguments)]
    fn render_object(
        &self,
        record: &EntityRecord,
        spec: &ProjectionSpec,
        selection: Option<&SelectionNode>,
        plan: &FacetPlan,
        you: You,
        viewer: &Viewer,
        facets: &ResolvedFacets,
        depth: usize,
    ) -> Value {
        if depth > self.config.max_depth {
            tracing::error!(
                "Projection depth guard tripped at {} {}; aborting subtree",
                record.kind,
                record.id
            );
            return Value::Null;
        }

        let mut obj = Map::new();
        obj.insert("__typename".into(), Value::from(record.kind.as_str()));
        obj.insert("id".into(), Value::from(record.id.clone()));
        obj.insert("isPrivate".into(), Value::from(record.is_private));
        obj.insert("isInternal".into(), Value::from(record.is_internal));
        obj.insert("createdAt".into(), timestamp(record.created_at));
        obj.insert("updatedAt".into(), timestamp(record.updated_at));

        for field in spec.scalar_fields {
            if !field_selected(selection, field) {
                continue;
            }
            if let Some(value) = record.property(field) {
                obj.insert((*field).to_string(), value.clone());
            }
        }

        for name in &plan.counters {
            let value = facets
                .counts
                .get(&record.id)
                .and_then(|values| values.get(*name))
                .copied()
                .unwrap_or(0);
            obj.insert((*name).to_string(), Value::from(value));
        }

        if spec.you {
            obj.insert("you".into(), to_value_or_null(&you));
        }

        if plan.owner {
            let owner_value = record
                .owner
                .as_ref()
                .and_then(|owner_ref| facets.owners.get(owner_ref))
                .map(|owner| self.render_nav(owner.record(), viewer, depth + 1))
                .unwrap_or(Value::Null);
            obj.insert("owner".into(), owner_value);
        }

        match plan.versions {
            Some(VersionMode::Latest) => {
                let latest = facets
                    .versions
                    .get(&record.id)
                    .and_then(|versions| versions.first())
                    .map(to_value_or_null)
                    .unwrap_or(Value::Null);
                obj.insert("latestVersion".into(), latest);
            }
            Some(VersionMode::All) => {
                let history = facets
                    .versions
                    .get(&record.id)
                    .map(|versions| versions.iter().map(to_value_or_null).collect())
                    .unwrap_or_default();
                obj.insert("versions".into(), Value::Array(history));
            }
            None => {}
        }

        if plan.tags {
            let tags = facets
                .tags
                .get(&record.id)
                .map(|tags| {
                    tags.iter()
                        .map(|tag| render_tag(tag, viewer, &facets.tag_states))
                        .collect()
                })
                .unwrap_or_default();
            obj.insert("tags".into(), Value::Array(tags));
        }

        if plan.labels {
            let labels = facets
                .labels
                .get(&record.id)
                .map(|labels| {
                    labels
                        .iter()
                        .map(|label| self.render_label(label, viewer, facets, depth + 1))
                        .collect()
                })
                .unwrap_or_default();
            obj.insert("labels".into(), Value::Array(labels));
        }

        Value::Object(obj)
    }

    /// Render a record through its nav shape: scalar leaves plus the
    /// viewer's capability leaf, no relations, no counters. Unreadable
    /// records render as null.
    fn render_nav(&self, record: &EntityRecord, viewer: &Viewer, depth: usize) -> Value {
        if depth > self.config.max_depth {
            tracing::error!(
                "Projection depth guard tripped at {} {}; aborting subtree",
                record.kind,
                record.id
            );
            return Value::Null;
        }

        let Some(nav) = self.registry.nav(record.kind) else {
            tracing::warn!("No nav shape registered for {}; emitting null", record.kind);
            return Value::Null;
        };

        let you = PermissionEvaluator::capabilities(record, viewer, false);
        if !you.can_read {
            return Value::Null;
        }

        let mut obj = Map::new();
        obj.insert("__typename".into(), Value::from(record.kind.as_str()));
        obj.insert("id".into(), Value::from(record.id.clone()));
        obj.insert("isPrivate".into(), Value::from(record.is_private));
        for field in nav.scalar_fields {
            if let Some(value) = record.property(field) {
                obj.insert((*field).to_string(), value.clone());
            }
        }
        if nav.you {
            obj.insert("you".into(), to_value_or_null(&you));
        }
        Value::Object(obj)
    }

    fn render_label(
        &self,
        label: &Label,
        viewer: &Viewer,
        facets: &ResolvedFacets,
        depth: usize,
    ) -> Value {
        let (can_update, can_delete) = PermissionEvaluator::label_capabilities(&label.owner, viewer);
        let owner_value = facets
            .label_owners
            .get(&label.owner)
            .map(|owner| self.render_nav(owner.record(), viewer, depth))
            .unwrap_or(Value::Null);

        let mut obj = Map::new();
        obj.insert("__typename".into(), Value::from("Label"));
        obj.insert("id".into(), Value::from(label.id.clone()));
        obj.insert("label".into(), Value::from(label.label.clone()));
        if let Some(color) = &label.color {
            obj.insert("color".into(), Value::from(color.clone()));
        }
        obj.insert("owner".into(), owner_value);
        obj.insert(
            "you".into(),
            serde_json::json!({ "canUpdate": can_update, "canDelete": can_delete }),
        );
        Value::Object(obj)
    }
}

fn render_tag(tag: &Tag, viewer: &Viewer, states: &HashMap<String, InteractionState>) -> Value {
    let is_own = match (&viewer.id, &tag.created_by) {
        (Some(viewer_id), Some(creator)) => viewer_id == creator,
        _ => false,
    };
    serde_json::json!({
        "__typename": "Tag",
        "id": tag.id,
        "tag": tag.tag,
        "bookmarks": tag.bookmarks,
        "isOwn": is_own,
        "isBookmarked": states.get(&tag.id).map(|s| s.is_bookmarked).unwrap_or(false),
    })
}

/// Whether a relation survives the selection's narrowing. An empty
/// relations map means "everything the shape defines".
fn relation_selected(selection: Option<&SelectionNode>, name: &str) -> bool {
    match selection {
        None => true,
        Some(node) => node.relations.is_empty() || node.relations.contains_key(name),
    }
}

/// Whether a scalar/counter field survives the selection's narrowing.
fn field_selected(selection: Option<&SelectionNode>, name: &str) -> bool {
    match selection {
        None => true,
        Some(node) => node.selects_field(name),
    }
}

/// Reject selection trees that break the fixed-projection-level rules.
fn validate_selection(request: &ProjectionRequest) -> Result<(), ResolveError> {
    let Some(selection) = &request.selection else {
        return Ok(());
    };
    if selection.kind != request.kind {
        return Err(ResolveError::invalid_selection(format!(
            "selection kind {} does not match requested kind {}",
            selection.kind, request.kind
        )));
    }
    if selection.variant != request.variant {
        return Err(ResolveError::invalid_selection(format!(
            "selection variant {} does not match requested variant {}",
            selection.variant, request.variant
        )));
    }

    for (name, nested) in &selection.relations {
        if !RELATION_FIELDS.contains(&name.as_str()) {
            return Err(ResolveError::invalid_selection(format!(
                "unknown relation field: {name}"
            )));
        }
        // Relation hops are structurally nav: rich variants exist only
        // where a kind is the direct subject of the request.
        if nested.variant.is_rich() {
            return Err(ResolveError::invalid_selection(format!(
                "relation {name} cannot request the {} variant; hops render through nav",
                nested.variant
            )));
        }
        if !nested.relations.is_empty() {
            return Err(ResolveError::invalid_selection(format!(
                "relation {name} selects nested relations; nav selections are relation-free"
            )));
        }
    }
    Ok(())
}

fn timestamp(at: chrono::DateTime<chrono::Utc>) -> Value {
    Value::from(at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
}

fn to_value_or_null<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Run a facet call under the request deadline, degrading to `default`
/// on failure or expiry. Content facets never fail a request wholesale.
async fn soft_call<T, E, F>(deadline: Option<Instant>, facet: &str, default: T, fut: F) -> T
where
    E: std::fmt::Display,
    F: std::future::Future<Output = Result<T, E>>,
{
    let outcome = match deadline {
        Some(at) => match tokio::time::timeout_at(at, fut).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!("Facet {} exceeded the request deadline; degrading", facet);
                return default;
            }
        },
        None => fut.await,
    };
    match outcome {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Facet {} failed: {}; degrading", facet, e);
            default
        }
    }
}

/// Run a call the request cannot proceed without under the deadline.
async fn hard_call<T, F>(
    deadline: Option<Instant>,
    context: &str,
    fut: F,
) -> Result<T, ResolveError>
where
    F: std::future::Future<Output = anyhow::Result<T>>,
{
    let outcome = match deadline {
        Some(at) => tokio::time::timeout_at(at, fut).await.map_err(|_| {
            ResolveError::store(context, anyhow::Error::new(StoreError::timeout(context)))
        })?,
        None => fut.await,
    };
    outcome.map_err(|e| ResolveError::store(context, e))
}
