//! Loader configuration
//!
//! Read once at startup from `~/.config/quant-loader/config.toml` (or an
//! explicit `--config` path). Every section is optional; missing values fall
//! back to the defaults below, and a few settings can be overridden from the
//! environment (or a `.env` file).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::upload::registry::{DEFAULT_ESCAPE_HATCH, SchemaRegistry, SchemaStandard};

pub const ENV_DATA_DIR: &str = "QUANT_LOADER_DATA_DIR";
pub const ENV_USER: &str = "QUANT_LOADER_USER";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub warehouse: WarehouseConfig,
    pub standards: StandardsConfig,
    /// Principal recorded in `update_user`; the OS user when unset
    pub user: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WarehouseConfig {
    /// Directory holding one database file per schema
    pub data_dir: PathBuf,
    /// How long to wait for a connection before giving up
    pub connect_timeout_secs: u64,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("quant-loader")
                .join("warehouse"),
            connect_timeout_secs: 30,
        }
    }
}

impl WarehouseConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardsConfig {
    /// Enforce schema standards unless a command opts out
    pub enforce: bool,
    /// Ungoverned schema accepted with a warning
    pub escape_hatch: String,
    /// Extra or replacement governed schemas, keyed by schema name
    pub schemas: BTreeMap<String, SchemaRule>,
}

impl Default for StandardsConfig {
    fn default() -> Self {
        Self {
            enforce: true,
            escape_hatch: DEFAULT_ESCAPE_HATCH.to_string(),
            schemas: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaRule {
    pub required_columns: Vec<String>,
    #[serde(default)]
    pub primary_key: Vec<String>,
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quant-loader")
            .join("config.toml")
    }

    /// Load from `path` (or the default location), then apply environment
    /// overrides. A missing default file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Self::default_path();
                if default.exists() {
                    Self::from_file(&default)?
                } else {
                    log::debug!("No config at {}, using defaults", default.display());
                    Self::default()
                }
            }
        };

        config.apply_env();
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML")
    }

    fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            if !dir.trim().is_empty() {
                self.warehouse.data_dir = PathBuf::from(dir);
            }
        }
        if let Ok(user) = std::env::var(ENV_USER) {
            if !user.trim().is_empty() {
                self.user = Some(user);
            }
        }
    }

    /// Built-in standards overlaid with configured schemas
    pub fn registry(&self) -> Result<SchemaRegistry> {
        let mut standards: BTreeMap<String, SchemaStandard> = SchemaRegistry::builtin()
            .schemas()
            .map(|s| (s.schema_name().to_string(), s.clone()))
            .collect();

        for (name, rule) in &self.standards.schemas {
            let standard = SchemaStandard::new(
                name.clone(),
                rule.required_columns.iter().cloned(),
                rule.primary_key.iter().cloned(),
            )
            .with_context(|| format!("Invalid standard for schema '{}'", name))?;
            standards.insert(name.clone(), standard);
        }

        Ok(SchemaRegistry::new(
            standards.into_values().collect(),
            self.standards.escape_hatch.clone(),
        ))
    }
}
