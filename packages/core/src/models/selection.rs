//! Decoded Request Shapes
//!
//! Requests arrive already decoded from the wire: a root request names a
//! kind, a set of ids (or a store-understood search filter), and a named
//! projection variant; an optional selection tree narrows the fields and
//! relations the registry shape would otherwise emit in full.
//!
//! Two fixed projection levels exist per kind: a rich variant (`List` /
//! `Full`) usable only where the caller explicitly asked for that kind,
//! and the minimal `Nav` variant used for every relation hop that leads
//! back into the graph. The selection tree cannot request a rich variant
//! at a hop point; the assembler rejects such input as malformed.

use crate::models::entity::EntityKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::time::Instant;

/// Named projection levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectionVariant {
    /// Minimal, relation-free shape used at every re-entrant relation hop
    Nav,
    /// Rich shape for listing contexts
    List,
    /// Richest shape, used when a single object is the subject
    Full,
}

impl ProjectionVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectionVariant::Nav => "nav",
            ProjectionVariant::List => "list",
            ProjectionVariant::Full => "full",
        }
    }

    /// Rich variants may only appear where a kind is the direct subject
    /// of the request.
    pub fn is_rich(&self) -> bool {
        !matches!(self, ProjectionVariant::Nav)
    }
}

impl std::fmt::Display for ProjectionVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of a decoded selection tree.
///
/// `fields` narrows the scalar fields emitted (empty = everything the
/// registry shape defines); `relations` narrows and recurses into relation
/// fields by name (`owner`, `versions`, `tags`, `labels`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionNode {
    pub kind: EntityKind,
    pub variant: ProjectionVariant,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub relations: HashMap<String, SelectionNode>,
}

impl SelectionNode {
    pub fn new(kind: EntityKind, variant: ProjectionVariant) -> Self {
        Self {
            kind,
            variant,
            fields: Vec::new(),
            relations: HashMap::new(),
        }
    }

    pub fn with_fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_relation(mut self, name: impl Into<String>, node: SelectionNode) -> Self {
        self.relations.insert(name.into(), node);
        self
    }

    /// Whether a scalar field survives this node's narrowing.
    pub fn selects_field(&self, name: &str) -> bool {
        self.fields.is_empty() || self.fields.iter().any(|f| f == name)
    }
}

/// Sort orders a search-driven root selection can ask the storage
/// collaborator for. The ranking itself (e.g. what "popular" means) is the
/// collaborator's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    Popular,
    Newest,
    RecentlyUpdated,
}

/// A store-understood filter that yields the root id set for a request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortOrder>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_after: Option<DateTime<Utc>>,

    /// Restrict to public rows only (private rows would be nulled per
    /// viewer anyway; this lets the store skip them)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_only: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub take: Option<usize>,
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sorted_by(mut self, sort: SortOrder) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn updated_after(mut self, after: DateTime<Utc>) -> Self {
        self.updated_after = Some(after);
        self
    }

    pub fn public_only(mut self) -> Self {
        self.public_only = Some(true);
        self
    }

    pub fn take(mut self, take: usize) -> Self {
        self.take = Some(take);
        self
    }
}

/// How the root id set of a request is determined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RootSelector {
    /// Explicit ids, output order mirrors this order
    Ids(Vec<String>),
    /// Filter evaluated by the storage collaborator
    Search(SearchFilter),
}

/// A root-level projection request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRequest {
    pub kind: EntityKind,
    pub variant: ProjectionVariant,
    pub selector: RootSelector,

    /// Optional narrowing selection; when absent the registry shape for
    /// `(kind, variant)` is emitted in full
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionNode>,
}

impl ProjectionRequest {
    /// Request explicit ids through a named variant.
    pub fn by_ids(
        kind: EntityKind,
        variant: ProjectionVariant,
        ids: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            kind,
            variant,
            selector: RootSelector::Ids(ids.into_iter().map(Into::into).collect()),
            selection: None,
        }
    }

    /// Request a search-driven id set through a named variant.
    pub fn by_search(kind: EntityKind, variant: ProjectionVariant, filter: SearchFilter) -> Self {
        Self {
            kind,
            variant,
            selector: RootSelector::Search(filter),
            selection: None,
        }
    }

    pub fn with_selection(mut self, selection: SelectionNode) -> Self {
        self.selection = Some(selection);
        self
    }
}

/// Per-request resolution options.
///
/// The deadline is propagated into every batched collaborator call; the
/// engine enforces no timeout of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    pub deadline: Option<Instant>,
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}
