//! Entity Catalog and Universal Record
//!
//! This module defines the closed set of entity kinds the engine serves,
//! the structural traits each kind carries, and the universal
//! `EntityRecord` row shape shared by all of them.
//!
//! # Architecture
//!
//! - **Universal Record**: a single struct represents every content kind
//! - **Pure JSON Properties**: kind-specific scalars live in `properties`
//! - **Static Trait Table**: which kinds are versioned, ownable, taggable,
//!   etc. is compile-time data, not runtime configuration
//!
//! # Examples
//!
//! ```rust
//! use prism_core::models::{EntityKind, EntityRecord};
//! use serde_json::json;
//!
//! let project = EntityRecord::new(
//!     EntityKind::Project,
//!     json!({ "name": "Atlas", "handle": "atlas" }),
//! );
//! assert!(EntityKind::Project.traits().versioned);
//! assert!(!EntityKind::User.traits().ownable);
//! # drop(project);
//! ```

use crate::models::owner::OwnerRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors for entity records
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Unknown entity kind: {0}")]
    UnknownKind(String),

    #[error("Properties validation failed: {0}")]
    InvalidProperties(String),

    #[error("Kind {kind} requires an owner but none is set")]
    MissingOwner { kind: EntityKind },

    #[error("Kind {kind} does not support an owner reference")]
    UnexpectedOwner { kind: EntityKind },
}

/// Every content kind the engine can project.
///
/// The set is closed: requests naming anything else are rejected before
/// resolution starts. `User` and `Organization` double as the two sides
/// of the owner union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Api,
    Note,
    Organization,
    Project,
    Question,
    Routine,
    SmartContract,
    Standard,
    Tag,
    Label,
    Schedule,
    User,
}

/// Structural traits a kind can carry.
///
/// These gate which facets a projection may include and which capability
/// flags the permission evaluator can ever grant. A flag the kind does not
/// carry is always `false` in the output, regardless of viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindTraits {
    /// Has an append-only version history
    pub versioned: bool,
    /// Owned by exactly one User or Organization
    pub ownable: bool,
    /// Accepts tag annotations
    pub taggable: bool,
    /// Accepts label annotations
    pub labelable: bool,
    /// Viewers can bookmark it
    pub bookmarkable: bool,
    /// View events are tracked for it
    pub viewable: bool,
    /// Viewers can react to it
    pub reactable: bool,
    /// Viewers can comment on it
    pub commentable: bool,
    /// Viewers can report it
    pub reportable: bool,
    /// Ownership can be transferred
    pub transferable: bool,
}

impl KindTraits {
    const NONE: KindTraits = KindTraits {
        versioned: false,
        ownable: false,
        taggable: false,
        labelable: false,
        bookmarkable: false,
        viewable: false,
        reactable: false,
        commentable: false,
        reportable: false,
        transferable: false,
    };

    /// The full trait set carried by versioned content kinds
    /// (Api, Note, Project, Routine, SmartContract, Standard).
    const CONTENT: KindTraits = KindTraits {
        versioned: true,
        ownable: true,
        taggable: true,
        labelable: true,
        bookmarkable: true,
        viewable: true,
        reactable: true,
        commentable: true,
        reportable: true,
        transferable: true,
    };
}

impl EntityKind {
    /// All kinds, in declaration order.
    pub const ALL: [EntityKind; 12] = [
        EntityKind::Api,
        EntityKind::Note,
        EntityKind::Organization,
        EntityKind::Project,
        EntityKind::Question,
        EntityKind::Routine,
        EntityKind::SmartContract,
        EntityKind::Standard,
        EntityKind::Tag,
        EntityKind::Label,
        EntityKind::Schedule,
        EntityKind::User,
    ];

    /// The wire/type name for this kind (used as `__typename` in output).
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Api => "Api",
            EntityKind::Note => "Note",
            EntityKind::Organization => "Organization",
            EntityKind::Project => "Project",
            EntityKind::Question => "Question",
            EntityKind::Routine => "Routine",
            EntityKind::SmartContract => "SmartContract",
            EntityKind::Standard => "Standard",
            EntityKind::Tag => "Tag",
            EntityKind::Label => "Label",
            EntityKind::Schedule => "Schedule",
            EntityKind::User => "User",
        }
    }

    /// Parse a wire kind name.
    pub fn parse(name: &str) -> Result<EntityKind, ValidationError> {
        EntityKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == name)
            .ok_or_else(|| ValidationError::UnknownKind(name.to_string()))
    }

    /// The static structural trait table.
    pub fn traits(&self) -> KindTraits {
        match self {
            EntityKind::Api
            | EntityKind::Note
            | EntityKind::Project
            | EntityKind::Routine
            | EntityKind::SmartContract
            | EntityKind::Standard => KindTraits::CONTENT,
            EntityKind::Question => KindTraits {
                ownable: true,
                taggable: true,
                bookmarkable: true,
                reactable: true,
                commentable: true,
                reportable: true,
                ..KindTraits::NONE
            },
            EntityKind::Organization => KindTraits {
                taggable: true,
                bookmarkable: true,
                viewable: true,
                reportable: true,
                ..KindTraits::NONE
            },
            EntityKind::User => KindTraits {
                bookmarkable: true,
                viewable: true,
                reportable: true,
                ..KindTraits::NONE
            },
            EntityKind::Tag => KindTraits {
                bookmarkable: true,
                ..KindTraits::NONE
            },
            EntityKind::Label => KindTraits {
                ownable: true,
                ..KindTraits::NONE
            },
            EntityKind::Schedule => KindTraits {
                ownable: true,
                ..KindTraits::NONE
            },
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Universal record shape for all content kinds.
///
/// # Fields
///
/// - `id`: stable identity (UUID string)
/// - `kind`: which entity kind this row is
/// - `is_private` / `is_internal`: visibility flags consulted by the
///   permission evaluator
/// - `is_deleted`: terminal state; update/delete capabilities are never
///   granted on a deleted row
/// - `owner`: polymorphic owner reference, present exactly when the kind
///   is ownable
/// - `properties`: all kind-specific scalar fields as a JSON object
///
/// # Pure JSON Properties
///
/// Kind-specific data (name, handle, summary, ...) is stored in the
/// `properties` field. Projection shapes pick named scalars out of it;
/// nothing in the engine depends on per-kind structs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRecord {
    /// Unique identifier
    pub id: String,

    /// Entity kind of this row
    pub kind: EntityKind,

    /// Hidden from viewers without an ownership/membership/grant path
    #[serde(default)]
    pub is_private: bool,

    /// Restricted to the owning organization's members
    #[serde(default)]
    pub is_internal: bool,

    /// Terminal state; mutating capabilities are never granted once set
    #[serde(default)]
    pub is_deleted: bool,

    /// Polymorphic owner reference (User or Organization)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerRef>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,

    /// All kind-specific scalar fields (pure JSON)
    pub properties: serde_json::Value,
}

impl EntityRecord {
    /// Create a new record with an auto-generated UUID.
    pub fn new(kind: EntityKind, properties: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            is_private: false,
            is_internal: false,
            is_deleted: false,
            owner: None,
            created_at: now,
            updated_at: now,
            properties,
        }
    }

    /// Create a new record with an explicit id.
    pub fn with_id(id: String, kind: EntityKind, properties: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id,
            kind,
            is_private: false,
            is_internal: false,
            is_deleted: false,
            owner: None,
            created_at: now,
            updated_at: now,
            properties,
        }
    }

    /// Builder: set the owner reference.
    pub fn owned_by(mut self, owner: OwnerRef) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Builder: mark the record private.
    pub fn private(mut self) -> Self {
        self.is_private = true;
        self
    }

    /// Builder: mark the record internal to the owning organization.
    pub fn internal(mut self) -> Self {
        self.is_internal = true;
        self
    }

    /// Builder: mark the record deleted (terminal state).
    pub fn deleted(mut self) -> Self {
        self.is_deleted = true;
        self
    }

    /// Whether the record is hidden from viewers without an elevated path.
    pub fn is_hidden(&self) -> bool {
        self.is_private || self.is_internal
    }

    /// Read a named scalar out of `properties`.
    pub fn property(&self, name: &str) -> Option<&serde_json::Value> {
        self.properties.as_object().and_then(|map| map.get(name))
    }

    /// Validate structural invariants.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if:
    /// - `id` is empty
    /// - `properties` is not a JSON object
    /// - an ownable kind has no owner reference, or a non-ownable kind
    ///   carries one (User/Organization own themselves implicitly and are
    ///   not ownable)
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::MissingField("id".to_string()));
        }

        if !self.properties.is_object() {
            return Err(ValidationError::InvalidProperties(
                "properties must be a JSON object".to_string(),
            ));
        }

        let traits = self.kind.traits();
        if traits.ownable && self.owner.is_none() {
            return Err(ValidationError::MissingOwner { kind: self.kind });
        }
        if !traits.ownable && self.owner.is_some() {
            return Err(ValidationError::UnexpectedOwner { kind: self.kind });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::owner::{OwnerKind, OwnerRef};
    use serde_json::json;

    #[test]
    fn test_record_creation() {
        let record = EntityRecord::new(EntityKind::Note, json!({ "name": "Scratch" }));

        assert!(!record.id.is_empty());
        assert_eq!(record.kind, EntityKind::Note);
        assert!(!record.is_private);
        assert!(!record.is_deleted);
        assert_eq!(record.property("name"), Some(&json!("Scratch")));
    }

    #[test]
    fn test_record_with_explicit_id() {
        let record = EntityRecord::with_id("org-1".to_string(), EntityKind::Organization, json!({}));
        assert_eq!(record.id, "org-1");
    }

    #[test]
    fn test_validation_requires_owner_for_ownable_kinds() {
        let record = EntityRecord::new(EntityKind::Project, json!({}));
        assert!(matches!(
            record.validate(),
            Err(ValidationError::MissingOwner { .. })
        ));

        let owned = record.owned_by(OwnerRef::new(OwnerKind::User, "user-1"));
        assert!(owned.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_owner_on_non_ownable_kinds() {
        let record = EntityRecord::new(EntityKind::User, json!({}))
            .owned_by(OwnerRef::new(OwnerKind::User, "user-1"));
        assert!(matches!(
            record.validate(),
            Err(ValidationError::UnexpectedOwner { .. })
        ));
    }

    #[test]
    fn test_validation_rejects_non_object_properties() {
        let mut record = EntityRecord::new(EntityKind::Tag, json!({}));
        record.properties = json!("not an object");
        assert!(matches!(
            record.validate(),
            Err(ValidationError::InvalidProperties(_))
        ));
    }

    #[test]
    fn test_kind_parse_roundtrip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::parse(kind.as_str()).unwrap(), kind);
        }
        assert!(matches!(
            EntityKind::parse("Widget"),
            Err(ValidationError::UnknownKind(_))
        ));
    }

    #[test]
    fn test_trait_table_content_kinds() {
        for kind in [
            EntityKind::Api,
            EntityKind::Note,
            EntityKind::Project,
            EntityKind::Routine,
            EntityKind::SmartContract,
            EntityKind::Standard,
        ] {
            let traits = kind.traits();
            assert!(traits.versioned, "{kind} should be versioned");
            assert!(traits.ownable, "{kind} should be ownable");
            assert!(traits.transferable, "{kind} should be transferable");
        }
    }

    #[test]
    fn test_trait_table_non_versioned_kinds() {
        assert!(!EntityKind::Organization.traits().versioned);
        assert!(!EntityKind::Organization.traits().ownable);
        assert!(!EntityKind::User.traits().ownable);
        assert!(EntityKind::Label.traits().ownable);
        assert!(!EntityKind::Label.traits().taggable);
        assert!(EntityKind::Question.traits().commentable);
        assert!(!EntityKind::Question.traits().versioned);
        assert!(EntityKind::Tag.traits().bookmarkable);
        assert!(!EntityKind::Tag.traits().reportable);
    }

    #[test]
    fn test_hidden_flags() {
        let record = EntityRecord::new(EntityKind::Note, json!({}));
        assert!(!record.is_hidden());
        assert!(record.clone().private().is_hidden());
        assert!(record.internal().is_hidden());
    }

    #[test]
    fn test_record_serialization_camel_case() {
        let record = EntityRecord::new(EntityKind::Project, json!({ "name": "Atlas" })).private();
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["isPrivate"], json!(true));
        assert_eq!(value["kind"], json!("Project"));
        assert!(value.get("createdAt").is_some());

        let back: EntityRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
