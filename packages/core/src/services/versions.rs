//! Version Selector
//!
//! Selects the requested slice of a root's append-only version history:
//! the single `is_latest` version, or the full history ordered ascending
//! by `version_index`.
//!
//! Integrity anomalies never surface as errors. A root with no
//! `is_latest` flag falls back deterministically to the highest
//! `version_index`; a root with several flagged rows keeps the flagged
//! row with the highest index (later store order on ties). Both cases
//! emit a `tracing::warn!`.

use crate::models::{Version, VersionMode};
use crate::services::error::ResolveError;
use crate::store::ContentStore;
use std::collections::HashMap;
use std::sync::Arc;

/// Batched selector over version history.
#[derive(Clone)]
pub struct VersionSelector {
    store: Arc<dyn ContentStore>,
}

impl VersionSelector {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Select versions for one root.
    pub async fn select(
        &self,
        root_id: &str,
        mode: VersionMode,
    ) -> Result<Vec<Version>, ResolveError> {
        let mut batch = self.select_batch(&[root_id.to_string()], mode).await?;
        Ok(batch.remove(root_id).unwrap_or_default())
    }

    /// Select versions for a batch of roots in one store call.
    ///
    /// Roots without versions are absent from the result. `Latest`
    /// entries hold zero or one version; `All` entries hold the full
    /// ascending history.
    pub async fn select_batch(
        &self,
        root_ids: &[String],
        mode: VersionMode,
    ) -> Result<HashMap<String, Vec<Version>>, ResolveError> {
        let fetched = self
            .store
            .fetch_versions(root_ids, mode)
            .await
            .map_err(|e| ResolveError::store("fetching version history", e))?;

        let mut out = HashMap::new();
        for (root_id, versions) in fetched {
            let selected = match mode {
                VersionMode::Latest => pick_latest(&root_id, versions)
                    .map(|v| vec![v])
                    .unwrap_or_default(),
                VersionMode::All => ordered_history(&root_id, versions),
            };
            out.insert(root_id, selected);
        }
        Ok(out)
    }
}

/// Pick the latest version out of a root's history.
///
/// Exactly one `is_latest` flag is the well-formed case. Zero flags falls
/// back to the highest `version_index`; multiple flags keep the flagged
/// row with the highest index. Both anomalies are logged.
pub(crate) fn pick_latest(root_id: &str, versions: Vec<Version>) -> Option<Version> {
    if versions.is_empty() {
        return None;
    }

    let flagged = versions.iter().filter(|v| v.is_latest).count();
    match flagged {
        1 => versions.into_iter().find(|v| v.is_latest),
        0 => {
            tracing::warn!(
                "Root {} has no version flagged latest; falling back to highest index",
                root_id
            );
            max_by_index(versions.into_iter())
        }
        n => {
            tracing::warn!(
                "Root {} has {} versions flagged latest; keeping the highest index",
                root_id,
                n
            );
            max_by_index(versions.into_iter().filter(|v| v.is_latest))
        }
    }
}

// Later store order wins ties, which keeps the choice deterministic for
// a fixed snapshot.
fn max_by_index(versions: impl Iterator<Item = Version>) -> Option<Version> {
    versions.fold(None, |best: Option<Version>, candidate| match best {
        Some(current) if current.version_index > candidate.version_index => Some(current),
        _ => Some(candidate),
    })
}

/// Order a root's full history ascending by `version_index`.
///
/// Duplicate indexes are an integrity violation; the sort is stable so
/// duplicates keep store order, and the anomaly is logged.
pub(crate) fn ordered_history(root_id: &str, mut versions: Vec<Version>) -> Vec<Version> {
    versions.sort_by_key(|v| v.version_index);

    let duplicated = versions
        .windows(2)
        .any(|pair| pair[0].version_index == pair[1].version_index);
    if duplicated {
        tracing::warn!(
            "Root {} has duplicate version indexes in its history",
            root_id
        );
    }

    versions
}
