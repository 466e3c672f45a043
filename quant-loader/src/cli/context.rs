//! Everything a command needs, built once per process

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::upload::{Principal, SchemaRegistry};
use crate::warehouse::SqliteWarehouse;

pub struct AppContext {
    pub config: Config,
    pub registry: SchemaRegistry,
    pub warehouse: SqliteWarehouse,
    pub principal: Principal,
}

impl AppContext {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load(config_path)?;
        let registry = config.registry()?;

        let warehouse = SqliteWarehouse::open(
            &config.warehouse.data_dir,
            config.warehouse.connect_timeout(),
        )
        .context("Failed to open warehouse")?;

        let principal = match &config.user {
            Some(user) => Principal::new(user)
                .with_context(|| format!("Configured user '{}' has no name to record", user))?,
            None => Principal::from_env().context(
                "Cannot determine the current user; set QUANT_LOADER_USER or `user` in the config",
            )?,
        };

        Ok(Self {
            config,
            registry,
            warehouse,
            principal,
        })
    }
}
