use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATABASE: &str = "refdata";

pub const COUNTRY_PAGE_URL: &str = "https://www.iban.com/country-codes";
pub const UNLOCODE_PAGE_URL: &str = "https://unece.org/trade/cefact/UNLOCODE-Download";

/// Subdivision categories that are not loaded as zones. Matched against the
/// trimmed, lowercased type column.
pub const DEFAULT_REJECTED_ZONE_TYPES: &[&str] = &[
    "parish",
    "dependency",
    "federal district",
    "federal dependency",
    "autonomous city",
    "outlying area",
    "oblast",
    "special municipality",
    "metropolitan region",
    "metropolitan department",
    "overseas collectivity",
    "overseas territorial collectivity",
];

/// Where databases live and how the connection is set up.
///
/// With no `data_dir` every database is created in memory and disappears when
/// the connection closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionInfo {
    pub data_dir: Option<PathBuf>,
    pub database: Option<String>,
    pub encoding: String,
    pub autocommit: bool,
}

impl Default for ConnectionInfo {
    fn default() -> Self {
        Self {
            data_dir: None,
            database: None,
            encoding: "UTF-8".to_string(),
            autocommit: true,
        }
    }
}

impl ConnectionInfo {
    pub fn in_memory(database: impl Into<String>) -> Self {
        Self {
            database: Some(database.into()),
            ..Self::default()
        }
    }

    pub fn on_disk(data_dir: impl Into<PathBuf>, database: impl Into<String>) -> Self {
        Self {
            data_dir: Some(data_dir.into()),
            database: Some(database.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub country_page_url: String,
    pub unlocode_page_url: String,
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            country_page_url: COUNTRY_PAGE_URL.to_string(),
            unlocode_page_url: UNLOCODE_PAGE_URL.to_string(),
            user_agent: concat!("unlocode-to-sqlite/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Everything the loader needs, injected at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub connection: ConnectionInfo,
    pub sources: SourceConfig,
    pub rejected_zone_types: Vec<String>,
    /// Drop and recreate the managed tables before loading
    pub recreate: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connection: ConnectionInfo::default(),
            sources: SourceConfig::default(),
            rejected_zone_types: DEFAULT_REJECTED_ZONE_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            recreate: false,
        }
    }
}

impl Config {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Load `path` if given, otherwise start from the defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"connection": {{"database": "geo"}}, "rejected_zone_types": ["parish"]}}"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.connection.database.as_deref(), Some("geo"));
        assert_eq!(config.connection.encoding, "UTF-8");
        assert!(config.connection.autocommit);
        assert_eq!(config.rejected_zone_types, vec!["parish".to_string()]);
        assert_eq!(config.sources.country_page_url, COUNTRY_PAGE_URL);
        assert!(!config.recreate);
    }

    #[test]
    fn test_default_rejects_oblast() {
        let config = Config::default();
        assert!(config.rejected_zone_types.iter().any(|t| t == "oblast"));
        assert!(!config.rejected_zone_types.iter().any(|t| t == "province"));
    }
}
