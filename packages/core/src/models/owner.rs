//! Owner Union
//!
//! A root object is owned by exactly one User or one Organization - never
//! both, never neither, for ownable kinds. The stored side of that
//! relation is [`OwnerRef`] (kind + id); the resolved side is the tagged
//! [`Owner`] enum, which makes "exactly one populated" a compile-time
//! property rather than a pair of nullable fields.

use crate::models::entity::{EntityKind, EntityRecord};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

// Handles are 3-32 chars of [A-Za-z0-9_], same alphabet for users and
// organizations.
const HANDLE_PATTERN: &str = r"^[A-Za-z0-9_]{3,32}$";

/// Validate an owner handle.
///
/// # Examples
///
/// ```
/// # use prism_core::models::is_valid_handle;
/// assert!(is_valid_handle("atlas_team"));
/// assert!(!is_valid_handle("no"));
/// assert!(!is_valid_handle("spaces not allowed"));
/// ```
pub fn is_valid_handle(handle: &str) -> bool {
    static HANDLE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = HANDLE_REGEX.get_or_init(|| Regex::new(HANDLE_PATTERN).unwrap());
    regex.is_match(handle)
}

/// The two concrete kinds an owner reference can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwnerKind {
    User,
    Organization,
}

impl OwnerKind {
    /// The entity kind this owner side is stored under.
    pub fn entity_kind(&self) -> EntityKind {
        match self {
            OwnerKind::User => EntityKind::User,
            OwnerKind::Organization => EntityKind::Organization,
        }
    }
}

/// Stored polymorphic owner reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerRef {
    pub kind: OwnerKind,
    pub id: String,
}

impl OwnerRef {
    pub fn new(kind: OwnerKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// Reference a user owner.
    pub fn user(id: impl Into<String>) -> Self {
        Self::new(OwnerKind::User, id)
    }

    /// Reference an organization owner.
    pub fn organization(id: impl Into<String>) -> Self {
        Self::new(OwnerKind::Organization, id)
    }
}

/// A resolved owner: the concrete record behind an [`OwnerRef`].
///
/// Exactly one variant is ever populated, by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Owner {
    User(EntityRecord),
    Organization(EntityRecord),
}

impl Owner {
    /// Wrap a fetched record, checking that its kind matches the
    /// reference it was fetched for. Returns `None` on a mismatch
    /// (a data-integrity anomaly the caller logs and degrades on).
    pub fn from_record(expected: OwnerKind, record: EntityRecord) -> Option<Owner> {
        match (expected, record.kind) {
            (OwnerKind::User, EntityKind::User) => Some(Owner::User(record)),
            (OwnerKind::Organization, EntityKind::Organization) => {
                Some(Owner::Organization(record))
            }
            _ => None,
        }
    }

    pub fn kind(&self) -> OwnerKind {
        match self {
            Owner::User(_) => OwnerKind::User,
            Owner::Organization(_) => OwnerKind::Organization,
        }
    }

    pub fn id(&self) -> &str {
        &self.record().id
    }

    pub fn record(&self) -> &EntityRecord {
        match self {
            Owner::User(record) | Owner::Organization(record) => record,
        }
    }

    /// The stored reference form of this owner.
    pub fn to_ref(&self) -> OwnerRef {
        OwnerRef::new(self.kind(), self.id().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_owner_ref_constructors() {
        let user_ref = OwnerRef::user("user-1");
        assert_eq!(user_ref.kind, OwnerKind::User);
        assert_eq!(user_ref.id, "user-1");

        let org_ref = OwnerRef::organization("org-1");
        assert_eq!(org_ref.kind, OwnerKind::Organization);
    }

    #[test]
    fn test_owner_from_record_matching_kind() {
        let user = EntityRecord::with_id("user-1".to_string(), EntityKind::User, json!({}));
        let owner = Owner::from_record(OwnerKind::User, user).unwrap();
        assert_eq!(owner.kind(), OwnerKind::User);
        assert_eq!(owner.id(), "user-1");
        assert_eq!(owner.to_ref(), OwnerRef::user("user-1"));
    }

    #[test]
    fn test_owner_from_record_rejects_kind_mismatch() {
        let project = EntityRecord::with_id("p-1".to_string(), EntityKind::Project, json!({}));
        assert!(Owner::from_record(OwnerKind::User, project).is_none());

        let user = EntityRecord::with_id("user-1".to_string(), EntityKind::User, json!({}));
        assert!(Owner::from_record(OwnerKind::Organization, user).is_none());
    }

    #[test]
    fn test_handle_validation() {
        assert!(is_valid_handle("abc"));
        assert!(is_valid_handle("Atlas_Team_01"));
        assert!(!is_valid_handle("ab"));
        assert!(!is_valid_handle(""));
        assert!(!is_valid_handle("has space"));
        assert!(!is_valid_handle("way_too_long_for_a_handle_by_any_measure"));
    }

    #[test]
    fn test_owner_ref_serialization() {
        let owner_ref = OwnerRef::organization("org-9");
        let value = serde_json::to_value(&owner_ref).unwrap();
        assert_eq!(value, json!({ "kind": "Organization", "id": "org-9" }));

        let back: OwnerRef = serde_json::from_value(value).unwrap();
        assert_eq!(back, owner_ref);
    }
}
