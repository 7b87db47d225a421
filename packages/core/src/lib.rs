//! Prism Core Projection Engine
//!
//! This crate provides viewer-scoped read projection over a polymorphic,
//! versioned content graph: given a set of root object ids, a named
//! projection shape, and a viewer principal, it produces a nested value
//! tree containing stored attributes and derived, viewer-relative values
//! (permission flags, interaction state, aggregate counts).
//!
//! # Architecture
//!
//! - **Universal record**: a single [`models::EntityRecord`] shape carries
//!   every entity kind; kind-specific scalars live in a pure-JSON
//!   `properties` field
//! - **Fixed projection levels**: rich shapes (`list`/`full`) appear only
//!   where a kind is the direct subject of a request; every relation hop
//!   that re-enters the graph renders through the minimal `nav` shape,
//!   which is what bounds recursion structurally
//! - **Batched collaborators**: storage is reached only through the
//!   [`store::ContentStore`] trait, one batched call per (kind, facet)
//! - **Per-viewer derivation**: the `you` block is computed fresh for
//!   every (object, viewer) pair and never cached across viewers
//!
//! # Modules
//!
//! - [`models`] - Data structures (EntityRecord, Version, Viewer, You, etc.)
//! - [`catalog`] - Entity trait table and the projection registry
//! - [`store`] - Storage collaborator trait and the in-memory reference store
//! - [`services`] - Resolution services (ownership, versions, permissions,
//!   counts) and the projection assembler

pub mod catalog;
pub mod models;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use catalog::*;
pub use models::*;
pub use services::*;
