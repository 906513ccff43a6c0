//! Project configuration loaded from `.varsel/config.yaml`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::yaml::{parse_yaml_file, YamlError};

/// Config file location within a project
pub const CONFIG_FILE: &str = ".varsel/config.yaml";

/// Snapshot cache settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of template snapshots held at once
    pub max_templates: u64,

    /// Drop snapshots this many seconds after they were built
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_live_secs: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_templates: 1024,
            time_to_live_secs: None,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// Base level or full `EnvFilter` directive (e.g. `warn,varsel=debug`)
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
        }
    }
}

/// Project configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database, relative to the project root
    pub database: PathBuf,

    /// Directory scanned for catalog YAML files, relative to the project root
    pub catalog_dir: PathBuf,

    pub cache: CacheConfig,

    pub logging: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from(".varsel/catalog.db"),
            catalog_dir: PathBuf::from("catalog"),
            cache: CacheConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

impl Config {
    /// Load the config of a project rooted at `root`
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load(root: &Path) -> Result<Self, YamlError> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        parse_yaml_file(&path)
    }

    /// Absolute path of the database file
    pub fn database_path(&self, root: &Path) -> PathBuf {
        root.join(&self.database)
    }

    /// Absolute path of the catalog directory
    pub fn catalog_path(&self, root: &Path) -> PathBuf {
        root.join(&self.catalog_dir)
    }

    /// Render as YAML for `varsel init`
    pub fn to_yaml(&self) -> String {
        serde_yml::to_string(self).unwrap_or_default()
    }
}
