//! Engine Error Types
//!
//! Only malformed input is a hard failure: an unknown kind, an
//! unregistered projection shape, or a selection tree that breaks the
//! fixed-projection-level rules. Content-level conditions (missing rows,
//! denied reads, integrity anomalies) degrade to null/omitted output and
//! surface as log lines, never as these errors.

use crate::models::{EntityKind, ProjectionVariant, ValidationError};
use thiserror::Error;

/// Projection resolution errors.
///
/// A request naming a kind outside the catalog surfaces as
/// `Validation(ValidationError::UnknownKind)` via [`EntityKind::parse`]
/// at the decoding boundary.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// No projection shape is registered for the requested pair
    #[error("No projection shape registered for {kind}/{variant}")]
    UnknownVariant {
        kind: EntityKind,
        variant: ProjectionVariant,
    },

    /// The selection tree is malformed (kind mismatch, rich variant at a
    /// relation hop, unknown relation name)
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// A model-level invariant was violated
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The storage collaborator failed wholesale for a call the request
    /// cannot proceed without
    #[error("Store operation failed: {context}")]
    Store {
        context: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ResolveError {
    /// Create an unknown-variant error
    pub fn unknown_variant(kind: EntityKind, variant: ProjectionVariant) -> Self {
        Self::UnknownVariant { kind, variant }
    }

    /// Create an invalid-selection error
    pub fn invalid_selection(msg: impl Into<String>) -> Self {
        Self::InvalidSelection(msg.into())
    }

    /// Wrap a store failure with call context
    pub fn store(context: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Store {
            context: context.into(),
            source,
        }
    }
}
