use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot of an entity's persisted columns.
pub type EntityData = serde_json::Map<String, serde_json::Value>;

/// Columns managed by the database, never part of a restore payload.
pub const METADATA_FIELDS: &[&str] = &["id", "created_at", "updated_at"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionType {
    Insert,
    Update,
    Delete,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Insert => "+",
            Self::Update => "~",
            Self::Delete => "-",
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub from: serde_json::Value,
    pub to: serde_json::Value,
}

/// One immutable row of an entity's change history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub version_number: u32,
    pub action_type: ActionType,
    pub changed_at: DateTime<Utc>,
    pub entity_data: EntityData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed_fields: Option<BTreeMap<String, FieldChange>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

impl HistoryEntry {
    /// The entity snapshot with database-managed columns removed.
    pub fn restore_payload(&self) -> EntityData {
        self.entity_data
            .iter()
            .filter(|(key, _)| !METADATA_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    pub fn changed_field_count(&self) -> usize {
        self.changed_fields.as_ref().map_or(0, |fields| fields.len())
    }
}

/// Highest version number in a loaded history list.
pub fn latest_version(entries: &[HistoryEntry]) -> Option<u32> {
    entries.iter().map(|entry| entry.version_number).max()
}

pub fn find_version(entries: &[HistoryEntry], version: u32) -> Option<&HistoryEntry> {
    entries.iter().find(|entry| entry.version_number == version)
}

/// Field-level delta between two snapshots, skipping metadata columns.
pub fn changed_fields(
    previous: &EntityData,
    next: &EntityData,
) -> BTreeMap<String, FieldChange> {
    let mut changes = BTreeMap::new();
    for (key, to) in next {
        if METADATA_FIELDS.contains(&key.as_str()) {
            continue;
        }
        let from = previous.get(key).cloned().unwrap_or(serde_json::Value::Null);
        if &from != to {
            changes.insert(
                key.clone(),
                FieldChange {
                    from,
                    to: to.clone(),
                },
            );
        }
    }
    for (key, from) in previous {
        if METADATA_FIELDS.contains(&key.as_str()) || next.contains_key(key) {
            continue;
        }
        changes.insert(
            key.clone(),
            FieldChange {
                from: from.clone(),
                to: serde_json::Value::Null,
            },
        );
    }
    changes
}
