//! Ownership Resolver
//!
//! Resolves polymorphic owner references to their concrete User or
//! Organization records, batched per kind. Everything resolved here is
//! later rendered through the nav shape only - the primary anti-cycle
//! guarantee for the whole engine, since every place the graph could
//! re-enter itself passes through this resolver.
//!
//! Data-integrity anomalies (a reference to a missing row, a row whose
//! kind does not match its reference) are reported via `tracing::warn!`
//! and degrade to a null owner; they never fail the request.

use crate::models::{Owner, OwnerKind, OwnerRef};
use crate::services::error::ResolveError;
use crate::store::ContentStore;
use std::collections::HashMap;
use std::sync::Arc;

/// Batched resolver for the owner union.
#[derive(Clone)]
pub struct OwnershipResolver {
    store: Arc<dyn ContentStore>,
}

impl OwnershipResolver {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Resolve a batch of owner references.
    ///
    /// Issues at most one store call per owner kind. References that
    /// cannot be resolved cleanly are absent from the result; callers
    /// emit a null owner for them.
    pub async fn resolve_batch(
        &self,
        refs: &[OwnerRef],
    ) -> Result<HashMap<OwnerRef, Owner>, ResolveError> {
        let mut resolved = HashMap::new();

        for owner_kind in [OwnerKind::User, OwnerKind::Organization] {
            let mut ids: Vec<String> = refs
                .iter()
                .filter(|r| r.kind == owner_kind)
                .map(|r| r.id.clone())
                .collect();
            ids.sort();
            ids.dedup();
            if ids.is_empty() {
                continue;
            }

            let rows = self
                .store
                .fetch_by_ids(owner_kind.entity_kind(), &ids)
                .await
                .map_err(|e| ResolveError::store("resolving owner references", e))?;

            let mut by_id: HashMap<String, _> =
                rows.into_iter().map(|r| (r.id.clone(), r)).collect();

            for id in ids {
                let owner_ref = OwnerRef::new(owner_kind, id.clone());
                match by_id.remove(&id) {
                    Some(record) => match Owner::from_record(owner_kind, record) {
                        Some(owner) => {
                            resolved.insert(owner_ref, owner);
                        }
                        None => {
                            tracing::warn!(
                                "Owner reference {:?}/{} resolved to a row of the wrong kind",
                                owner_kind,
                                id
                            );
                        }
                    },
                    None => {
                        tracing::warn!(
                            "Owner reference {:?}/{} points at a missing row",
                            owner_kind,
                            id
                        );
                    }
                }
            }
        }

        Ok(resolved)
    }
}
