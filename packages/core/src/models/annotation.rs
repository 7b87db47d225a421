//! Tag and Label Annotations
//!
//! Many-to-many annotations attached to root objects. Tags are global
//! names with a bookmark count and per-viewer `isOwn`/`isBookmarked`
//! state; labels are owned (by a User or Organization) and carry
//! per-viewer update/delete permissions when projected.

use crate::models::owner::OwnerRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tag annotation row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Stable identity of the tag row
    pub id: String,

    /// The tag text itself
    pub tag: String,

    /// Pre-maintained bookmark count (read-through, see Aggregate Counter)
    #[serde(default)]
    pub bookmarks: i64,

    /// The user who created the tag; drives the per-viewer `isOwn` flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Tag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tag: tag.into(),
            bookmarks: 0,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    pub fn created_by(mut self, user_id: impl Into<String>) -> Self {
        self.created_by = Some(user_id.into());
        self
    }

    pub fn with_bookmarks(mut self, bookmarks: i64) -> Self {
        self.bookmarks = bookmarks;
        self
    }
}

/// A label annotation row. Labels carry an owner and are projected with
/// per-viewer update/delete flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: String,

    /// Display text
    pub label: String,

    /// Optional display color (hex string, opaque to the engine)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Labels are always owned
    pub owner: OwnerRef,

    pub created_at: DateTime<Utc>,
}

impl Label {
    pub fn new(label: impl Into<String>, owner: OwnerRef) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            label: label.into(),
            color: None,
            owner,
            created_at: Utc::now(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}
