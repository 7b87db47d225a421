//! Aggregate Counter
//!
//! Batched read-through of pre-maintained counters. The engine never
//! computes a count by iterating relations - that would reintroduce
//! per-object query cost; values come from write-side maintained counters
//! exposed by the storage collaborator.
//!
//! Requested names unknown for a kind are dropped from the call (debug
//! log) rather than erroring; negative stored values clamp to zero with a
//! warning.

use crate::catalog::known_counters;
use crate::models::EntityKind;
use crate::services::error::ResolveError;
use crate::store::ContentStore;
use std::collections::HashMap;
use std::sync::Arc;

/// Batched counter reader.
#[derive(Clone)]
pub struct AggregateCounter {
    store: Arc<dyn ContentStore>,
}

impl AggregateCounter {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Read the named counters for a batch of objects in one store call.
    ///
    /// Objects the store has no counters for are absent from the result;
    /// the caller defaults absent values to zero when projecting.
    pub async fn counts_for(
        &self,
        kind: EntityKind,
        ids: &[String],
        names: &[&str],
    ) -> Result<HashMap<String, HashMap<String, i64>>, ResolveError> {
        let known = known_counters(kind);
        let (valid, dropped): (Vec<&str>, Vec<&str>) =
            names.iter().copied().partition(|name| known.contains(name));

        if !dropped.is_empty() {
            tracing::debug!(
                "Dropping counters unknown for {}: {}",
                kind,
                dropped.join(", ")
            );
        }
        if valid.is_empty() || ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut counts = self
            .store
            .fetch_counters(kind, ids, &valid)
            .await
            .map_err(|e| ResolveError::store("fetching counters", e))?;

        for (id, values) in counts.iter_mut() {
            for (name, value) in values.iter_mut() {
                if *value < 0 {
                    tracing::warn!("Counter {} on {} {} is negative; clamping", name, kind, id);
                    *value = 0;
                }
            }
        }

        Ok(counts)
    }
}
