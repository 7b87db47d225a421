//! Entity Catalog and Projection Registry
//!
//! This module holds the static shape data the engine resolves against:
//!
//! - `counters` - the named aggregate counters each kind can expose
//! - `ProjectionSpec` - one named projection shape for one kind
//! - `ProjectionRegistry` - lookup of built-in shapes keyed by
//!   `(EntityKind, ProjectionVariant)`
//!
//! The registry is where the engine's termination guarantee lives: every
//! `nav` shape is relation-free by construction, so any relation hop that
//! re-enters the graph bottoms out in one step.

pub mod registry;

pub use registry::{counters, known_counters, ProjectionRegistry, ProjectionSpec};
