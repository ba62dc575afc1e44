use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Versioned master-data tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityTable {
    Items,
    ItemCategories,
    ItemTypes,
    ItemPackages,
    Suppliers,
}

impl EntityTable {
    pub const ALL: [EntityTable; 5] = [
        Self::Items,
        Self::ItemCategories,
        Self::ItemTypes,
        Self::ItemPackages,
        Self::Suppliers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Items => "items",
            Self::ItemCategories => "item_categories",
            Self::ItemTypes => "item_types",
            Self::ItemPackages => "item_packages",
            Self::Suppliers => "suppliers",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Items => "Items",
            Self::ItemCategories => "Categories",
            Self::ItemTypes => "Types",
            Self::ItemPackages => "Packages",
            Self::Suppliers => "Suppliers",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|table| table.as_str() == name)
    }
}

impl std::fmt::Display for EntityTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityRef {
    pub table: EntityTable,
    pub id: String,
}

impl EntityRef {
    pub fn new(table: EntityTable, id: impl Into<String>) -> Self {
        Self {
            table,
            id: id.into(),
        }
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.table, self.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntitySummary {
    pub table: EntityTable,
    pub id: String,
    pub code: String,
    pub name: String,
    pub version_count: usize,
    pub updated_at: Option<DateTime<Utc>>,
}

impl EntitySummary {
    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.table, self.id.clone())
    }

    /// Case-insensitive match on code or name.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.code.to_lowercase().contains(&query) || self.name.to_lowercase().contains(&query)
    }
}
