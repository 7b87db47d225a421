//! Storage Collaborator Boundary
//!
//! The engine never executes queries itself; all durable state is reached
//! through the [`ContentStore`] trait, batched per (kind, facet). This
//! module provides:
//!
//! - `ContentStore` - the async, batched collaborator trait
//! - `StoreError` - error types a backend can surface
//! - `MemoryStore` - an in-memory reference implementation used by the
//!   integration tests and for seeding demo data

mod content_store;
mod error;
mod memory_store;

pub use content_store::ContentStore;
pub use error::StoreError;
pub use memory_store::MemoryStore;
