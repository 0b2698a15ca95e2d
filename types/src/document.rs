//! The per-user document: everything read and written as one unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{GoalTree, ProgressionState, Revision};

/// Where and how the user exchanges Markdown files with their note vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterchangeSettings {
    pub export_path: String,
    /// Re-export both documents after every change.
    #[serde(default)]
    pub auto_sync: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderLog {
    #[serde(default)]
    pub last_sent_at: Option<DateTime<Utc>>,
}

impl ReminderLog {
    fn is_empty(&self) -> bool {
        self.last_sent_at.is_none()
    }
}

/// Typed view of a stored user document.
///
/// Every field defaults when absent, so documents written by older versions
/// (or partially written by other tools) hydrate into a complete value.
/// Fields this type does not know are kept in `extra` and written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub goal_tree: GoalTree,
    #[serde(default)]
    pub progression: ProgressionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interchange: Option<InterchangeSettings>,
    #[serde(default, skip_serializing_if = "ReminderLog::is_empty")]
    pub reminders: ReminderLog,
    /// Revision this copy was loaded at. Maintained by the store.
    #[serde(default)]
    pub revision: Revision,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new_default()
    }
}

impl Document {
    /// A first-use document: placeholder tree, level 1, nothing recorded.
    #[must_use]
    pub fn new_default() -> Self {
        Self {
            goal_tree: GoalTree::placeholder(),
            progression: ProgressionState::default(),
            interchange: None,
            reminders: ReminderLog::default(),
            revision: Revision::default(),
            extra: Map::new(),
        }
    }

    /// Fill every missing field of a raw stored value with its default.
    pub fn hydrate(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}
