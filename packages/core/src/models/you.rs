//! Viewer-Scoped "You" Record
//!
//! The per-(object, viewer) block of capability flags and interaction
//! state attached to every projected object. It is computed fresh on every
//! read and never persisted or reused across viewers.
//!
//! A denied read produces the [`You::denied`] shape: every capability
//! false and interaction state omitted entirely, so nothing leaks through
//! a read the viewer is not allowed.

use serde::{Deserialize, Serialize};

/// The viewer's own observed relations to an object.
///
/// This is state, not capability: it reflects the viewer's prior
/// bookmark/view/reaction rows, looked up from the storage collaborator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionState {
    pub is_bookmarked: bool,
    pub is_viewed: bool,
    /// The viewer's own prior reaction, never an aggregate. Opaque to the
    /// engine; values are defined by the write-side collaborator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reaction: Option<String>,
}

/// Per-viewer capability and interaction block.
///
/// Capability flags are derived in a fixed precedence order by the
/// permission evaluator; `can_read == false` forces everything else false
/// and omits the interaction fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct You {
    pub can_read: bool,
    pub can_update: bool,
    pub can_delete: bool,
    pub can_comment: bool,
    pub can_copy: bool,
    pub can_report: bool,
    pub can_bookmark: bool,
    pub can_transfer: bool,
    pub can_use: bool,
    pub can_react: bool,
    pub can_add_members: bool,

    /// Present only when the read is allowed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_bookmarked: Option<bool>,

    /// Present only when the read is allowed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_viewed: Option<bool>,

    /// The viewer's own prior reaction; present only when the read is
    /// allowed and a reaction exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reaction: Option<String>,
}

impl You {
    /// The deny-all shape: every capability false, interaction state
    /// omitted.
    pub fn denied() -> You {
        You::default()
    }

    /// Attach observed interaction state to an allowed read.
    pub fn with_interactions(mut self, state: &InteractionState) -> You {
        self.is_bookmarked = Some(state.is_bookmarked);
        self.is_viewed = Some(state.is_viewed);
        self.reaction = state.reaction.clone();
        self
    }
}
