use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;

use super::memory::Dataset;
use crate::domain::*;

struct SeedRow {
    table: EntityTable,
    id: &'static str,
    initial: serde_json::Value,
    edits: Vec<(&'static str, serde_json::Value)>,
}

fn object(value: serde_json::Value) -> EntityData {
    match value {
        serde_json::Value::Object(map) => map,
        _ => EntityData::new(),
    }
}

fn rows() -> Vec<SeedRow> {
    vec![
        SeedRow {
            table: EntityTable::Items,
            id: "itm-0001",
            initial: json!({
                "code": "PCT-500",
                "name": "Paracetamol",
                "category_id": "cat-analgesic",
                "base_unit": "tablet",
                "base_price": 500,
                "sell_price": 700,
                "min_stock": 100,
                "rack": null,
            }),
            edits: vec![
                ("apoteker", json!({"name": "Paracetamol 500mg", "rack": "A-1"})),
                ("admin", json!({"sell_price": 800})),
                ("apoteker", json!({"min_stock": 150, "sell_price": 750})),
            ],
        },
        SeedRow {
            table: EntityTable::Items,
            id: "itm-0002",
            initial: json!({
                "code": "AMX-500",
                "name": "Amoxicillin 500mg",
                "category_id": "cat-antibiotic",
                "base_unit": "capsule",
                "base_price": 1200,
                "sell_price": 1600,
                "min_stock": 50,
                "rack": "B-2",
            }),
            edits: vec![("admin", json!({"base_price": 1300, "sell_price": 1750}))],
        },
        SeedRow {
            table: EntityTable::Items,
            id: "itm-0003",
            initial: json!({
                "code": "OBH-100",
                "name": "OBH Syrup 100ml",
                "category_id": "cat-cough",
                "base_unit": "bottle",
                "base_price": 9000,
                "sell_price": 12500,
                "min_stock": 20,
                "rack": "C-4",
            }),
            edits: vec![],
        },
        SeedRow {
            table: EntityTable::ItemCategories,
            id: "cat-analgesic",
            initial: json!({"code": "ANL", "name": "Analgesic", "description": null}),
            edits: vec![("admin", json!({"description": "Pain relief"}))],
        },
        SeedRow {
            table: EntityTable::ItemCategories,
            id: "cat-antibiotic",
            initial: json!({"code": "ABX", "name": "Antibiotic", "description": "Prescription only"}),
            edits: vec![],
        },
        SeedRow {
            table: EntityTable::ItemTypes,
            id: "typ-generic",
            initial: json!({"code": "GEN", "name": "Generic"}),
            edits: vec![("admin", json!({"name": "Generic drug"}))],
        },
        SeedRow {
            table: EntityTable::ItemPackages,
            id: "pkg-strip",
            initial: json!({"code": "STR", "name": "Strip", "conversion": 10}),
            edits: vec![
                ("admin", json!({"conversion": 12})),
                ("admin", json!({"conversion": 10})),
            ],
        },
        SeedRow {
            table: EntityTable::Suppliers,
            id: "sup-kimia",
            initial: json!({"code": "KF", "name": "Kimia Farma", "phone": "021-555-0101", "address": "Jakarta"}),
            edits: vec![("admin", json!({"phone": "021-555-0199"}))],
        },
    ]
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 6, 8, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Master data with a few edits per row so every history panel has content.
pub fn demo_dataset() -> Dataset {
    let mut dataset = Dataset::default();
    let mut at = base_time();
    for row in rows() {
        if let Err(e) = dataset.insert(row.table, row.id, object(row.initial), Some("seed"), at) {
            tracing::warn!("skipping seed row {}: {}", row.id, e);
            continue;
        }
        for (user, changes) in row.edits {
            at += Duration::hours(5);
            if let Err(e) = dataset.update(row.table, row.id, object(changes), Some(user), at) {
                tracing::warn!("skipping seed edit on {}: {}", row.id, e);
            }
        }
        at += Duration::minutes(30);
    }
    dataset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_dataset_covers_every_table() {
        let dataset = demo_dataset();
        for table in EntityTable::ALL {
            assert!(
                dataset.entities.iter().any(|e| e.table == table),
                "no seed rows for {}",
                table
            );
        }
        let paracetamol = dataset
            .entities
            .iter()
            .find(|e| e.id == "itm-0001")
            .unwrap();
        assert_eq!(paracetamol.history.len(), 4);
    }
}
