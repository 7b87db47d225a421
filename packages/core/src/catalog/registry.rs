//! Projection Registry
//!
//! Reusable named projection shapes, keyed by `(EntityKind,
//! ProjectionVariant)`. A shape declares which scalar fields it surfaces
//! from `properties`, which counters it carries, and which facets (owner,
//! versions, permissions, tags, labels) the assembler must resolve for it.
//!
//! Rich shapes (`list`/`full`) exist only where a kind is the direct
//! subject of a request. The `nav` shape is relation-free for every kind:
//! no owner, no versions, no tags, no labels, no counters - only scalar
//! leaves and the viewer's capability block. That property, checked by the
//! tests at the bottom of this module, is what bounds projection depth
//! without any runtime bookkeeping.

use crate::models::{EntityKind, ProjectionVariant, VersionMode};
use std::collections::HashMap;

/// Counter field names, as they appear in output.
pub mod counters {
    pub const COMMENTS: &str = "commentsCount";
    pub const FORKS: &str = "forksCount";
    pub const ISSUES: &str = "issuesCount";
    pub const REPORTS: &str = "reportsCount";
    pub const TRANSFERS: &str = "transfersCount";
    pub const MEMBERS: &str = "membersCount";
    pub const VIEWS: &str = "views";
    pub const BOOKMARKS: &str = "bookmarks";
    pub const SCORE: &str = "score";
    pub const QUESTIONS: &str = "questionsCount";
    pub const NODES: &str = "nodesCount";
    pub const INPUTS: &str = "inputsCount";
}

const CONTENT_COUNTERS: &[&str] = &[
    counters::COMMENTS,
    counters::FORKS,
    counters::ISSUES,
    counters::REPORTS,
    counters::TRANSFERS,
    counters::VIEWS,
    counters::BOOKMARKS,
    counters::SCORE,
    counters::QUESTIONS,
];

const ROUTINE_COUNTERS: &[&str] = &[
    counters::COMMENTS,
    counters::FORKS,
    counters::ISSUES,
    counters::REPORTS,
    counters::TRANSFERS,
    counters::VIEWS,
    counters::BOOKMARKS,
    counters::SCORE,
    counters::QUESTIONS,
    counters::NODES,
    counters::INPUTS,
];

const ORGANIZATION_COUNTERS: &[&str] = &[
    counters::MEMBERS,
    counters::REPORTS,
    counters::VIEWS,
    counters::BOOKMARKS,
];

const USER_COUNTERS: &[&str] = &[counters::REPORTS, counters::VIEWS, counters::BOOKMARKS];

const QUESTION_COUNTERS: &[&str] = &[
    counters::COMMENTS,
    counters::REPORTS,
    counters::BOOKMARKS,
    counters::SCORE,
];

const TAG_COUNTERS: &[&str] = &[counters::BOOKMARKS];

/// Every counter name defined for a kind.
///
/// The aggregate counter drops requested names outside this set rather
/// than erroring.
pub fn known_counters(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::Api
        | EntityKind::Note
        | EntityKind::Project
        | EntityKind::SmartContract
        | EntityKind::Standard => CONTENT_COUNTERS,
        EntityKind::Routine => ROUTINE_COUNTERS,
        EntityKind::Organization => ORGANIZATION_COUNTERS,
        EntityKind::User => USER_COUNTERS,
        EntityKind::Question => QUESTION_COUNTERS,
        EntityKind::Tag => TAG_COUNTERS,
        EntityKind::Label | EntityKind::Schedule => &[],
    }
}

/// One named projection shape for one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionSpec {
    pub kind: EntityKind,
    pub variant: ProjectionVariant,

    /// Scalar fields surfaced from `properties` (absent properties are
    /// simply omitted from output)
    pub scalar_fields: &'static [&'static str],

    /// Counter names this shape carries
    pub counters: &'static [&'static str],

    /// Include the owner relation, rendered through the owner's nav shape
    pub owner: bool,

    /// Include version data, and which slice of the history
    pub versions: Option<VersionMode>,

    /// Include the viewer's `you` capability block
    pub you: bool,

    /// Include tag annotations
    pub tags: bool,

    /// Include label annotations
    pub labels: bool,
}

impl ProjectionSpec {
    /// Whether this shape reaches any relation at all. Nav shapes must be
    /// relation-free; this is the structural anti-cycle property.
    pub fn is_relation_free(&self) -> bool {
        !self.owner && self.versions.is_none() && !self.tags && !self.labels
    }

    /// Whether this shape carries the named counter.
    pub fn has_counter(&self, name: &str) -> bool {
        self.counters.contains(&name)
    }
}

/// Lookup of projection shapes by `(kind, variant)`.
///
/// Built-in shapes cover every kind at every variant; `register` allows a
/// deployment to override a shape before the registry is shared.
#[derive(Debug)]
pub struct ProjectionRegistry {
    specs: HashMap<(EntityKind, ProjectionVariant), ProjectionSpec>,
}

impl ProjectionRegistry {
    /// Registry with the built-in shape set for all twelve kinds.
    pub fn builtin() -> Self {
        let mut registry = Self {
            specs: HashMap::new(),
        };
        for kind in EntityKind::ALL {
            for spec in builtin_specs(kind) {
                registry.register(spec);
            }
        }
        registry
    }

    /// Register or replace one shape.
    pub fn register(&mut self, spec: ProjectionSpec) {
        self.specs.insert((spec.kind, spec.variant), spec);
    }

    /// Look up the shape for `(kind, variant)`.
    pub fn get(&self, kind: EntityKind, variant: ProjectionVariant) -> Option<&ProjectionSpec> {
        self.specs.get(&(kind, variant))
    }

    /// The nav shape for a kind. Built-ins define one for every kind, so
    /// relation hops can always render.
    pub fn nav(&self, kind: EntityKind) -> Option<&ProjectionSpec> {
        self.get(kind, ProjectionVariant::Nav)
    }
}

impl Default for ProjectionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn nav_spec(kind: EntityKind, scalar_fields: &'static [&'static str]) -> ProjectionSpec {
    ProjectionSpec {
        kind,
        variant: ProjectionVariant::Nav,
        scalar_fields,
        counters: &[],
        owner: false,
        versions: None,
        you: true,
        tags: false,
        labels: false,
    }
}

fn builtin_specs(kind: EntityKind) -> Vec<ProjectionSpec> {
    let traits = kind.traits();
    let (nav_fields, list_fields, full_fields): (
        &'static [&'static str],
        &'static [&'static str],
        &'static [&'static str],
    ) = match kind {
        EntityKind::Api
        | EntityKind::Note
        | EntityKind::Project
        | EntityKind::Routine
        | EntityKind::SmartContract
        | EntityKind::Standard => (
            &["name", "handle"],
            &["name", "handle", "summary"],
            &["name", "handle", "summary", "description"],
        ),
        EntityKind::Organization => (
            &["name", "handle", "profileImage", "bannerImage"],
            &["name", "handle", "profileImage", "bannerImage", "bio"],
            &["name", "handle", "profileImage", "bannerImage", "bio"],
        ),
        EntityKind::User => (
            &["name", "handle", "profileImage", "bannerImage", "isBot"],
            &["name", "handle", "profileImage", "bannerImage", "isBot", "bio"],
            &["name", "handle", "profileImage", "bannerImage", "isBot", "bio"],
        ),
        EntityKind::Question => (
            &["name"],
            &["name", "summary"],
            &["name", "summary", "description"],
        ),
        EntityKind::Tag => (&["tag"], &["tag", "description"], &["tag", "description"]),
        EntityKind::Label => (
            &["label", "color"],
            &["label", "color"],
            &["label", "color"],
        ),
        EntityKind::Schedule => (
            &["timezone"],
            &["timezone", "startTime", "endTime"],
            &["timezone", "startTime", "endTime"],
        ),
    };

    let list_counters: &'static [&'static str] = match kind {
        EntityKind::Organization => ORGANIZATION_COUNTERS,
        EntityKind::User => USER_COUNTERS,
        EntityKind::Question => QUESTION_COUNTERS,
        EntityKind::Tag => TAG_COUNTERS,
        EntityKind::Label | EntityKind::Schedule => &[],
        // Content kinds keep the lighter set in listings
        _ => &[
            counters::SCORE,
            counters::BOOKMARKS,
            counters::VIEWS,
            counters::COMMENTS,
        ],
    };

    vec![
        nav_spec(kind, nav_fields),
        ProjectionSpec {
            kind,
            variant: ProjectionVariant::List,
            scalar_fields: list_fields,
            counters: list_counters,
            owner: traits.ownable,
            versions: traits.versioned.then_some(VersionMode::Latest),
            you: true,
            tags: traits.taggable,
            labels: false,
        },
        ProjectionSpec {
            kind,
            variant: ProjectionVariant::Full,
            scalar_fields: full_fields,
            counters: known_counters(kind),
            owner: traits.ownable,
            versions: traits.versioned.then_some(VersionMode::All),
            you: true,
            tags: traits.taggable,
            labels: traits.labelable,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_all_three_variants() {
        let registry = ProjectionRegistry::builtin();
        for kind in EntityKind::ALL {
            for variant in [
                ProjectionVariant::Nav,
                ProjectionVariant::List,
                ProjectionVariant::Full,
            ] {
                assert!(
                    registry.get(kind, variant).is_some(),
                    "missing shape for {kind}/{variant}"
                );
            }
        }
    }

    #[test]
    fn test_nav_shapes_are_relation_free() {
        // The engine's termination guarantee: expanding any nav node
        // bottoms out in one hop.
        let registry = ProjectionRegistry::builtin();
        for kind in EntityKind::ALL {
            let nav = registry.nav(kind).unwrap();
            assert!(nav.is_relation_free(), "nav shape for {kind} has relations");
            assert!(nav.counters.is_empty(), "nav shape for {kind} has counters");
            assert!(nav.you, "nav shape for {kind} lost its capability leaf");
        }
    }

    #[test]
    fn test_rich_shapes_follow_trait_table() {
        let registry = ProjectionRegistry::builtin();
        for kind in EntityKind::ALL {
            let traits = kind.traits();
            let full = registry.get(kind, ProjectionVariant::Full).unwrap();
            assert_eq!(full.owner, traits.ownable);
            assert_eq!(full.versions.is_some(), traits.versioned);
            assert_eq!(full.tags, traits.taggable);
            assert_eq!(full.labels, traits.labelable);
        }
    }

    #[test]
    fn test_version_slice_per_variant() {
        let registry = ProjectionRegistry::builtin();
        let list = registry
            .get(EntityKind::Project, ProjectionVariant::List)
            .unwrap();
        assert_eq!(list.versions, Some(VersionMode::Latest));

        let full = registry
            .get(EntityKind::Project, ProjectionVariant::Full)
            .unwrap();
        assert_eq!(full.versions, Some(VersionMode::All));
    }

    #[test]
    fn test_counter_tables() {
        assert!(known_counters(EntityKind::Routine).contains(&counters::NODES));
        assert!(!known_counters(EntityKind::Project).contains(&counters::NODES));
        assert!(known_counters(EntityKind::Organization).contains(&counters::MEMBERS));
        assert!(known_counters(EntityKind::Label).is_empty());

        let registry = ProjectionRegistry::builtin();
        let full = registry
            .get(EntityKind::Routine, ProjectionVariant::Full)
            .unwrap();
        assert!(full.has_counter(counters::INPUTS));
        assert!(!full.has_counter("unknownCount"));
    }

    #[test]
    fn test_register_overrides_shape() {
        let mut registry = ProjectionRegistry::builtin();
        let custom = ProjectionSpec {
            kind: EntityKind::Note,
            variant: ProjectionVariant::List,
            scalar_fields: &["name"],
            counters: &[],
            owner: false,
            versions: None,
            you: true,
            tags: false,
            labels: false,
        };
        registry.register(custom);
        let spec = registry.get(EntityKind::Note, ProjectionVariant::List).unwrap();
        assert_eq!(spec.scalar_fields, &["name"]);
    }
}
