//! Version History
//!
//! Versioned roots carry an append-only, ordered collection of `Version`
//! rows. `version_index` is assigned at creation, increases monotonically
//! per root, and is never reused; at most one row per root is flagged
//! `is_latest`. Each version carries a set of localized translations keyed
//! uniquely by language.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which slice of a root's version history a projection wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VersionMode {
    /// The single version flagged `is_latest`
    Latest,
    /// Every version, ascending by `version_index`
    All,
}

/// Localized display strings for one version.
///
/// `language` is unique within a version's translation set. The engine
/// passes translations through whole; language selection is left to the
/// caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    /// BCP-47 language key, unique per version
    pub language: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Translation {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            name: None,
            description: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// One immutable snapshot of a versioned root's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    /// Unique identifier of the version row itself
    pub id: String,

    /// The root object this version belongs to
    pub root_id: String,

    /// Monotonically increasing per root, assigned at creation, never reused
    pub version_index: i64,

    /// Optional display label, independent of the index
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_label: Option<String>,

    /// At most one version per root carries this flag
    pub is_latest: bool,

    /// Localized display strings, `language` unique within the set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub translations: Vec<Translation>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Version {
    /// Create a new version row with an auto-generated id.
    pub fn new(root_id: impl Into<String>, version_index: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            root_id: root_id.into(),
            version_index,
            version_label: None,
            is_latest: false,
            translations: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.version_label = Some(label.into());
        self
    }

    pub fn latest(mut self) -> Self {
        self.is_latest = true;
        self
    }

    pub fn with_translation(mut self, translation: Translation) -> Self {
        self.translations.push(translation);
        self
    }
}
