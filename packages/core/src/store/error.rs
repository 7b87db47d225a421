//! Store Error Types
//!
//! Error types a storage backend can surface through the `ContentStore`
//! trait. Content-level conditions (a missing row, an empty counter) are
//! not errors - they come back as absent map entries. These variants
//! cover infrastructure failure only.

use thiserror::Error;

/// Storage backend errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend could not be reached or the call failed wholesale
    #[error("Store backend failure: {0}")]
    Backend(String),

    /// A row could not be decoded into the expected shape
    #[error("Failed to decode stored row: {context}")]
    Decode { context: String },

    /// The batched call exceeded the deadline propagated by the caller
    #[error("Store call timed out: {operation}")]
    Timeout { operation: String },
}

impl StoreError {
    /// Create a backend failure error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Create a decode error with context
    pub fn decode(context: impl Into<String>) -> Self {
        Self::Decode {
            context: context.into(),
        }
    }

    /// Create a timeout error for an operation
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }
}
