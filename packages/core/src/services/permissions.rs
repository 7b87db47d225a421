//! Viewer Permission Evaluator
//!
//! Computes the per-(object, viewer) `You` record. This is a pure
//! derivation: inputs are the record (with its owner reference and
//! visibility flags), the viewer principal, whether an explicit sharing
//! grant exists, and nothing else. No store access happens here - the
//! assembler batches grant and interaction lookups and feeds the results
//! in.
//!
//! # Rule Order
//!
//! Flags are derived in a fixed precedence:
//!
//! 1. `canRead` - public, or direct owner, or member of the owning
//!    organization, or explicitly granted. Anonymous viewers only pass
//!    the public check.
//! 2. A denied read forces every other flag false and omits interaction
//!    state entirely (nothing leaks through a denied read).
//! 3. `canUpdate`/`canDelete` - ownership or membership elevation
//!    (admin OR the relevant permission bit), and never on a deleted row.
//! 4. `canTransfer` - update rights on a transferable kind.
//! 5. `canComment`/`canReport`/`canBookmark`/`canReact` - readable and
//!    the kind carries the trait; owners cannot report their own content.
//! 6. `canCopy`/`canUse` - readable, and public or owned directly.
//! 7. `canAddMembers` - organizations only, admin or the add-members bit.
//!
//! A missing or inconsistent membership record means "no elevated
//! rights", never an error.

use crate::models::{
    EntityKind, EntityRecord, InteractionState, OrgMembership, OwnerKind, OwnerRef, Permissions,
    Viewer, You,
};
use std::collections::{HashMap, HashSet};

/// Stateless evaluator; all methods are pure.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionEvaluator;

/// The ownership view the rules run against: who owns the record, and
/// what path (if any) connects the viewer to that owner.
struct OwnershipView<'a> {
    direct_owner: bool,
    membership: Option<&'a OrgMembership>,
}

/// The reference the permission rules treat as the record's owner.
///
/// Ownable kinds carry an explicit reference; User and Organization rows
/// own themselves, which is what routes membership elevation to the
/// organization record itself.
fn effective_owner(record: &EntityRecord) -> Option<OwnerRef> {
    if let Some(owner) = &record.owner {
        return Some(owner.clone());
    }
    match record.kind {
        EntityKind::User => Some(OwnerRef::user(record.id.clone())),
        EntityKind::Organization => Some(OwnerRef::organization(record.id.clone())),
        _ => None,
    }
}

fn ownership_view<'a>(record: &EntityRecord, viewer: &'a Viewer) -> OwnershipView<'a> {
    match effective_owner(record) {
        Some(OwnerRef {
            kind: OwnerKind::User,
            id,
        }) => OwnershipView {
            direct_owner: viewer.is_user(&id),
            membership: None,
        },
        Some(OwnerRef {
            kind: OwnerKind::Organization,
            id,
        }) => OwnershipView {
            direct_owner: false,
            membership: viewer.membership_in(&id),
        },
        None => OwnershipView {
            direct_owner: false,
            membership: None,
        },
    }
}

impl PermissionEvaluator {
    /// Derive the capability flags for one (record, viewer) pair.
    ///
    /// Interaction state is not attached here; callers that project it
    /// join the batched lookup results via [`You::with_interactions`].
    pub fn capabilities(record: &EntityRecord, viewer: &Viewer, has_share_grant: bool) -> You {
        let view = ownership_view(record, viewer);
        let member = view.membership.is_some();

        let can_read =
            !record.is_hidden() || view.direct_owner || member || has_share_grant;
        if !can_read {
            return You::denied();
        }

        let traits = record.kind.traits();
        let live = !record.is_deleted;
        let can = |permission: Permissions| {
            view.direct_owner
                || view
                    .membership
                    .map(|m| m.can(permission))
                    .unwrap_or(false)
        };

        let can_update = live && can(Permissions::UPDATE);
        let can_delete = live && can(Permissions::DELETE);
        let copyable = !record.is_hidden() || view.direct_owner;

        You {
            can_read: true,
            can_update,
            can_delete,
            can_transfer: can_update && traits.transferable && can(Permissions::TRANSFER),
            can_comment: traits.commentable,
            can_report: traits.reportable && !view.direct_owner,
            can_bookmark: traits.bookmarkable,
            can_react: traits.reactable,
            can_copy: traits.versioned && copyable,
            can_use: traits.versioned && copyable,
            can_add_members: record.kind == EntityKind::Organization
                && view
                    .membership
                    .map(|m| m.can(Permissions::ADD_MEMBERS))
                    .unwrap_or(false),
            is_bookmarked: None,
            is_viewed: None,
            reaction: None,
        }
    }

    /// Batch form: one `You` per record, keyed by id.
    ///
    /// `grants` is the id subset the viewer holds explicit read grants
    /// for; `interactions` is the viewer's observed state, attached only
    /// to allowed reads.
    pub fn evaluate_batch(
        records: &[EntityRecord],
        viewer: &Viewer,
        grants: &HashSet<String>,
        interactions: &HashMap<String, InteractionState>,
    ) -> HashMap<String, You> {
        records
            .iter()
            .map(|record| {
                let mut you =
                    Self::capabilities(record, viewer, grants.contains(&record.id));
                if you.can_read {
                    let state = interactions.get(&record.id).cloned().unwrap_or_default();
                    you = you.with_interactions(&state);
                }
                (record.id.clone(), you)
            })
            .collect()
    }

    /// Update/delete flags for a label, derived from its owner reference
    /// alone (labels carry no visibility flags of their own).
    pub fn label_capabilities(owner: &OwnerRef, viewer: &Viewer) -> (bool, bool) {
        match owner.kind {
            OwnerKind::User => {
                let owned = viewer.is_user(&owner.id);
                (owned, owned)
            }
            OwnerKind::Organization => match viewer.membership_in(&owner.id) {
                Some(membership) => (
                    membership.can(Permissions::UPDATE),
                    membership.can(Permissions::DELETE),
                ),
                None => (false, false),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrgMembership;
    use serde_json::json;

    fn project_owned_by_user(owner_id: &str) -> EntityRecord {
        EntityRecord::with_id("p-1".to_string(), EntityKind::Project, json!({}))
            .owned_by(OwnerRef::user(owner_id))
    }

    fn routine_owned_by_org(org_id: &str) -> EntityRecord {
        EntityRecord::with_id("r-1".to_string(), EntityKind::Routine, json!({}))
            .owned_by(OwnerRef::organization(org_id))
    }

    #[test]
    fn test_public_object_readable_by_anonymous() {
        let record = project_owned_by_user("u-1");
        let you = PermissionEvaluator::capabilities(&record, &Viewer::anonymous(), false);
        assert!(you.can_read);
        assert!(!you.can_update);
        assert!(you.can_bookmark);
        assert!(you.can_comment);
    }

    #[test]
    fn test_private_object_denied_for_strangers() {
        let record = project_owned_by_user("u-1").private();
        let you = PermissionEvaluator::capabilities(&record, &Viewer::user("u-2"), false);
        assert!(!you.can_read);
        // Denial forces everything else off and omits interaction state
        assert_eq!(you, You::denied());
    }

    #[test]
    fn test_private_object_denied_for_anonymous() {
        let record = project_owned_by_user("u-1").private();
        let you = PermissionEvaluator::capabilities(&record, &Viewer::anonymous(), false);
        assert!(!you.can_read);
    }

    #[test]
    fn test_owner_holds_full_rights_but_cannot_report() {
        let record = EntityRecord::with_id("n-1".to_string(), EntityKind::Note, json!({}))
            .owned_by(OwnerRef::user("u-1"))
            .private();
        let you = PermissionEvaluator::capabilities(&record, &Viewer::user("u-1"), false);

        assert!(you.can_read);
        assert!(you.can_update);
        assert!(you.can_delete);
        assert!(you.can_transfer);
        assert!(you.can_copy);
        assert!(!you.can_report, "owners cannot report their own content");
    }

    #[test]
    fn test_sharing_grant_opens_read_only() {
        let record = project_owned_by_user("u-1").private();
        let you = PermissionEvaluator::capabilities(&record, &Viewer::user("u-2"), true);

        assert!(you.can_read);
        assert!(!you.can_update);
        assert!(!you.can_delete);
        // Private and not owned: no copy/use path
        assert!(!you.can_copy);
        assert!(you.can_report);
    }

    #[test]
    fn test_org_admin_elevated_via_membership() {
        let record = routine_owned_by_org("org-1").private();
        let viewer = Viewer::user("u-2").with_membership(OrgMembership::admin("org-1"));
        let you = PermissionEvaluator::capabilities(&record, &viewer, false);

        assert!(you.can_read);
        assert!(you.can_update, "admin membership path grants update");
        assert!(you.can_delete);
        assert!(you.can_transfer);
    }

    #[test]
    fn test_org_member_needs_the_relevant_bit() {
        let record = routine_owned_by_org("org-1").private();

        let editor = Viewer::user("u-2").with_membership(
            OrgMembership::member("org-1").with_permissions(Permissions::UPDATE),
        );
        let you = PermissionEvaluator::capabilities(&record, &editor, false);
        assert!(you.can_read);
        assert!(you.can_update);
        assert!(!you.can_delete, "delete requires its own bit");
        assert!(!you.can_transfer, "transfer requires its own bit");

        let plain = Viewer::user("u-3").with_membership(OrgMembership::member("org-1"));
        let you = PermissionEvaluator::capabilities(&record, &plain, false);
        assert!(you.can_read, "membership alone opens reads");
        assert!(!you.can_update);
    }

    #[test]
    fn test_membership_in_other_org_grants_nothing() {
        let record = routine_owned_by_org("org-1").private();
        let viewer = Viewer::user("u-2").with_membership(OrgMembership::admin("org-2"));
        let you = PermissionEvaluator::capabilities(&record, &viewer, false);
        assert!(!you.can_read);
    }

    #[test]
    fn test_deleted_record_is_terminal() {
        let record = project_owned_by_user("u-1").deleted();
        let you = PermissionEvaluator::capabilities(&record, &Viewer::user("u-1"), false);

        assert!(you.can_read);
        assert!(!you.can_update);
        assert!(!you.can_delete);
        assert!(!you.can_transfer);
    }

    #[test]
    fn test_trait_gating_per_kind() {
        // Questions are not versioned: no copy/use/transfer even for the owner
        let question =
            EntityRecord::with_id("q-1".to_string(), EntityKind::Question, json!({}))
                .owned_by(OwnerRef::user("u-1"));
        let you = PermissionEvaluator::capabilities(&question, &Viewer::user("u-1"), false);
        assert!(you.can_comment);
        assert!(!you.can_copy);
        assert!(!you.can_transfer);

        // Schedules carry almost nothing
        let schedule =
            EntityRecord::with_id("s-1".to_string(), EntityKind::Schedule, json!({}))
                .owned_by(OwnerRef::user("u-1"));
        let you = PermissionEvaluator::capabilities(&schedule, &Viewer::user("u-1"), false);
        assert!(!you.can_comment);
        assert!(!you.can_bookmark);
        assert!(you.can_update);
    }

    #[test]
    fn test_organization_owns_itself() {
        let org =
            EntityRecord::with_id("org-1".to_string(), EntityKind::Organization, json!({}))
                .private();

        let admin = Viewer::user("u-1").with_membership(OrgMembership::admin("org-1"));
        let you = PermissionEvaluator::capabilities(&org, &admin, false);
        assert!(you.can_read);
        assert!(you.can_update);
        assert!(you.can_add_members);

        let stranger = Viewer::user("u-2");
        let you = PermissionEvaluator::capabilities(&org, &stranger, false);
        assert!(!you.can_read);
    }

    #[test]
    fn test_user_owns_themselves() {
        let user = EntityRecord::with_id("u-1".to_string(), EntityKind::User, json!({})).private();

        let you = PermissionEvaluator::capabilities(&user, &Viewer::user("u-1"), false);
        assert!(you.can_read);
        assert!(you.can_update);
        assert!(!you.can_report);

        let you = PermissionEvaluator::capabilities(&user, &Viewer::user("u-2"), false);
        assert!(!you.can_read);
    }

    #[test]
    fn test_evaluate_batch_attaches_interactions_to_allowed_reads() {
        let public = project_owned_by_user("u-1");
        let mut hidden = project_owned_by_user("u-1").private();
        hidden.id = "p-2".to_string();

        let mut interactions = HashMap::new();
        interactions.insert(
            "p-1".to_string(),
            InteractionState {
                is_bookmarked: true,
                is_viewed: true,
                reaction: Some("star".to_string()),
            },
        );
        interactions.insert(
            "p-2".to_string(),
            InteractionState {
                is_bookmarked: true,
                ..Default::default()
            },
        );

        let out = PermissionEvaluator::evaluate_batch(
            &[public, hidden],
            &Viewer::user("u-9"),
            &HashSet::new(),
            &interactions,
        );

        let allowed = out.get("p-1").unwrap();
        assert_eq!(allowed.is_bookmarked, Some(true));
        assert_eq!(allowed.reaction.as_deref(), Some("star"));

        // Denied read leaks nothing, even with stored interaction state
        let denied = out.get("p-2").unwrap();
        assert!(!denied.can_read);
        assert!(denied.is_bookmarked.is_none());
        assert!(denied.reaction.is_none());
    }

    #[test]
    fn test_label_capabilities() {
        let user_owned = OwnerRef::user("u-1");
        assert_eq!(
            PermissionEvaluator::label_capabilities(&user_owned, &Viewer::user("u-1")),
            (true, true)
        );
        assert_eq!(
            PermissionEvaluator::label_capabilities(&user_owned, &Viewer::user("u-2")),
            (false, false)
        );

        let org_owned = OwnerRef::organization("org-1");
        let editor = Viewer::user("u-2").with_membership(
            OrgMembership::member("org-1").with_permissions(Permissions::UPDATE),
        );
        assert_eq!(
            PermissionEvaluator::label_capabilities(&org_owned, &editor),
            (true, false)
        );
    }
}
