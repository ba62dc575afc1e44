use std::collections::BTreeSet;

use crate::domain::{EntityData, METADATA_FIELDS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    Same,
    Changed,
    Added,
    Removed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDiff {
    pub field: String,
    pub left: Option<serde_json::Value>,
    pub right: Option<serde_json::Value>,
    pub status: FieldStatus,
}

impl FieldDiff {
    pub fn is_metadata(&self) -> bool {
        METADATA_FIELDS.contains(&self.field.as_str())
    }
}

/// Field-by-field comparison of two snapshots, metadata columns last.
pub fn compare_snapshots(left: &EntityData, right: &EntityData) -> Vec<FieldDiff> {
    let keys: BTreeSet<&String> = left.keys().chain(right.keys()).collect();
    let mut rows: Vec<FieldDiff> = keys
        .into_iter()
        .map(|key| {
            let l = left.get(key).cloned();
            let r = right.get(key).cloned();
            let status = match (&l, &r) {
                (Some(a), Some(b)) if a == b => FieldStatus::Same,
                (Some(_), Some(_)) => FieldStatus::Changed,
                (None, Some(_)) => FieldStatus::Added,
                (Some(_), None) | (None, None) => FieldStatus::Removed,
            };
            FieldDiff {
                field: key.clone(),
                left: l,
                right: r,
                status,
            }
        })
        .collect();
    rows.sort_by_key(|row| row.is_metadata());
    rows
}

pub fn changed_count(rows: &[FieldDiff]) -> usize {
    rows.iter()
        .filter(|row| row.status != FieldStatus::Same && !row.is_metadata())
        .count()
}

/// Compact rendering of a JSON value for a table cell.
pub fn display_value(value: Option<&serde_json::Value>) -> String {
    match value {
        None => "-".to_string(),
        Some(serde_json::Value::Null) => "null".to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
