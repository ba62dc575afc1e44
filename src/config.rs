use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::EntityTable;
use crate::history::selection::DEFAULT_MAX_SELECTIONS;

#[derive(Parser, Debug, Default)]
#[command(name = "apohist", about = "Version history browser for pharmacy master data")]
pub struct Cli {
    /// JSON data file (created from demo data if missing)
    #[arg(long, env = "APOHIST_DATA")]
    pub data: Option<PathBuf>,

    /// Table to open at startup (items, item_categories, item_types, item_packages, suppliers)
    #[arg(long, env = "APOHIST_TABLE")]
    pub table: Option<String>,

    /// Name recorded on history rows written by this session
    #[arg(long, env = "APOHIST_USER")]
    pub user: Option<String>,

    /// Number of versions selectable in compare mode
    #[arg(long, env = "APOHIST_MAX_COMPARE")]
    pub max_compare: Option<usize>,

    /// Log file path
    #[arg(long, env = "APOHIST_LOG_FILE")]
    pub log_file: Option<String>,

    /// Directory for daily rotated logs
    #[arg(long, env = "APOHIST_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub data: Option<PathBuf>,
    pub table: Option<String>,
    pub user: Option<String>,
    pub max_compare: Option<usize>,
}

impl ConfigFile {
    pub fn load() -> Option<Self> {
        let config_dir = dirs::config_dir()?;
        let config_path = config_dir.join("apohist").join("config.toml");
        let content = std::fs::read_to_string(config_path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("ignoring invalid config file: {}", e);
                None
            }
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown table: {0}")]
    UnknownTable(String),
    #[error("max compare must be at least 2, got {0}")]
    InvalidMaxCompare(usize),
}

/// Effective settings: CLI flags over config file over defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data: Option<PathBuf>,
    pub table: EntityTable,
    pub user: Option<String>,
    pub max_compare: usize,
}

impl Settings {
    pub fn resolve(cli: &Cli, file: Option<ConfigFile>) -> Result<Self, ConfigError> {
        let file = file.unwrap_or_default();

        let table = match cli.table.as_deref().or(file.table.as_deref()) {
            Some(name) => {
                EntityTable::parse(name).ok_or_else(|| ConfigError::UnknownTable(name.to_string()))?
            }
            None => EntityTable::Items,
        };

        let max_compare = cli
            .max_compare
            .or(file.max_compare)
            .unwrap_or(DEFAULT_MAX_SELECTIONS);
        if max_compare < 2 {
            return Err(ConfigError::InvalidMaxCompare(max_compare));
        }

        Ok(Self {
            data: cli.data.clone().or(file.data),
            table,
            user: cli.user.clone().or(file.user),
            max_compare,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_config_file() {
        let cli = Cli {
            table: Some("suppliers".to_string()),
            ..Default::default()
        };
        let file = ConfigFile {
            table: Some("item_types".to_string()),
            user: Some("apoteker".to_string()),
            max_compare: Some(3),
            ..Default::default()
        };
        let settings = Settings::resolve(&cli, Some(file)).unwrap();
        assert_eq!(settings.table, EntityTable::Suppliers);
        assert_eq!(settings.user.as_deref(), Some("apoteker"));
        assert_eq!(settings.max_compare, 3);
    }

    #[test]
    fn defaults_without_config() {
        let settings = Settings::resolve(&Cli::default(), None).unwrap();
        assert_eq!(settings.table, EntityTable::Items);
        assert_eq!(settings.max_compare, 2);
        assert!(settings.data.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        let cli = Cli {
            table: Some("orders".to_string()),
            ..Default::default()
        };
        assert_eq!(
            Settings::resolve(&cli, None),
            Err(ConfigError::UnknownTable("orders".to_string()))
        );

        let cli = Cli {
            max_compare: Some(1),
            ..Default::default()
        };
        assert_eq!(
            Settings::resolve(&cli, None),
            Err(ConfigError::InvalidMaxCompare(1))
        );
    }
}
