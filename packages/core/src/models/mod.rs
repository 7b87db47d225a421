//! Data Structures
//!
//! This module defines the data shapes the projection engine operates on:
//!
//! - `EntityKind` / `EntityRecord` - the polymorphic universal record
//! - `OwnerRef` / `Owner` - the exclusive User-or-Organization owner union
//! - `Version` / `Translation` - append-only per-root version history
//! - `Viewer` / `OrgMembership` - the viewer principal a request runs as
//! - `You` / `InteractionState` - the per-viewer derived capability block
//! - `Tag` / `Label` - many-to-many annotations
//! - `SelectionNode` / `ProjectionRequest` - decoded request shapes

pub mod annotation;
pub mod entity;
pub mod owner;
pub mod selection;
pub mod version;
pub mod viewer;
pub mod you;

pub use annotation::{Label, Tag};
pub use entity::{EntityKind, EntityRecord, KindTraits, ValidationError};
pub use owner::{is_valid_handle, Owner, OwnerKind, OwnerRef};
pub use selection::{
    ProjectionRequest, ProjectionVariant, ResolveOptions, RootSelector, SearchFilter,
    SelectionNode, SortOrder,
};
pub use version::{Translation, Version, VersionMode};
pub use viewer::{OrgMembership, Permissions, Viewer};
pub use you::{InteractionState, You};
