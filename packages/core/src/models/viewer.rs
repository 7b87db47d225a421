//! Viewer Principal
//!
//! The identity and organization-membership context a request is evaluated
//! against. The principal is supplied by the identity collaborator - this
//! engine never authenticates - and is threaded as an explicit parameter
//! through every component call, never stored in shared state.

use serde::{Deserialize, Serialize};

/// Named permission bits an organization can grant a member.
///
/// Stored as a plain bitmask; `is_admin` on the membership supersedes
/// individual bits (admin OR sufficient bit grants a capability).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(u32);

impl Permissions {
    /// Update objects owned by the organization
    pub const UPDATE: Permissions = Permissions(1 << 0);
    /// Delete objects owned by the organization
    pub const DELETE: Permissions = Permissions(1 << 1);
    /// Transfer ownership away from the organization
    pub const TRANSFER: Permissions = Permissions(1 << 2);
    /// Invite/add members to the organization
    pub const ADD_MEMBERS: Permissions = Permissions(1 << 3);

    /// No bits set.
    pub fn none() -> Permissions {
        Permissions(0)
    }

    /// Every defined bit set.
    pub fn all() -> Permissions {
        Permissions::UPDATE | Permissions::DELETE | Permissions::TRANSFER | Permissions::ADD_MEMBERS
    }

    /// Whether every bit in `other` is set in `self`.
    pub fn contains(&self, other: Permissions) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for Permissions {
    type Output = Permissions;

    fn bitor(self, rhs: Permissions) -> Permissions {
        Permissions(self.0 | rhs.0)
    }
}

/// One (organization, viewer) membership record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgMembership {
    /// The organization granting the membership
    pub org_id: String,

    /// Admins hold every capability the organization can grant
    #[serde(default)]
    pub is_admin: bool,

    /// Individual capability bits for non-admin members
    #[serde(default)]
    pub permissions: Permissions,
}

impl OrgMembership {
    pub fn member(org_id: impl Into<String>) -> Self {
        Self {
            org_id: org_id.into(),
            is_admin: false,
            permissions: Permissions::none(),
        }
    }

    pub fn admin(org_id: impl Into<String>) -> Self {
        Self {
            org_id: org_id.into(),
            is_admin: true,
            permissions: Permissions::all(),
        }
    }

    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }

    /// Admin status or the given bit.
    pub fn can(&self, permission: Permissions) -> bool {
        self.is_admin || self.permissions.contains(permission)
    }
}

/// The requesting viewer.
///
/// `id: None` is an anonymous viewer: it can only read public objects and
/// never carries memberships or interaction state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewer {
    /// Identity of the viewer, or `None` when anonymous
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Active, non-revoked organization memberships
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub memberships: Vec<OrgMembership>,
}

impl Viewer {
    /// An anonymous viewer.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An identified viewer with no memberships.
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            memberships: Vec::new(),
        }
    }

    pub fn with_membership(mut self, membership: OrgMembership) -> Self {
        self.memberships.push(membership);
        self
    }

    pub fn is_anonymous(&self) -> bool {
        self.id.is_none()
    }

    /// Whether this viewer is the user `user_id`.
    pub fn is_user(&self, user_id: &str) -> bool {
        self.id.as_deref() == Some(user_id)
    }

    /// The viewer's membership in `org_id`, if any.
    pub fn membership_in(&self, org_id: &str) -> Option<&OrgMembership> {
        self.memberships.iter().find(|m| m.org_id == org_id)
    }
}
