use std::fmt::Display;
use std::fs;
use std::io::ErrorKind;
use std::num::NonZeroUsize;
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::persistence::MAX_PAGE_LIMIT;

pub const DEFAULT_CONFIG_PATH: &str = "shop.toml";

/// Env var naming an alternative config file
pub const CONFIG_PATH_VAR: &str = "SHOP_CONFIG";

const RECOMMENDED_BATCH_SIZES: std::ops::RangeInclusive<usize> = 100..=1000;

// ============================================================================
// Configuration
// ============================================================================
//
// Defaults, then `shop.toml` (or the file named by SHOP_CONFIG), then one
// SHOP_<KEY> environment variable per key. A missing file is not an error.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_address: String,
    pub http_port: u16,
    pub metrics_port: u16,
    /// Parent ids per grouped collection load
    pub batch_fetch_size: NonZeroUsize,
    pub seed_demo_data: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:shop.db".to_string(),
            max_connections: 5,
            bind_address: "0.0.0.0".to_string(),
            http_port: 8080,
            metrics_port: 9090,
            batch_fetch_size: NonZeroUsize::new(100).unwrap_or(NonZeroUsize::MIN),
            seed_demo_data: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut config = Self::from_file(Path::new(&path))?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        info!(
            config_path = %path,
            database_url = %config.database_url,
            http_port = config.http_port,
            metrics_port = config.metrics_port,
            batch_fetch_size = config.batch_fetch_size.get(),
            "Configuration loaded"
        );
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents)
                .with_context(|| format!("invalid config file {}", path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e).with_context(|| format!("cannot read config file {}", path.display())),
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply `SHOP_<KEY>` overrides; `lookup` resolves a variable name.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = lookup("SHOP_DATABASE_URL") {
            self.database_url = v;
        }
        if let Some(v) = lookup("SHOP_MAX_CONNECTIONS") {
            self.max_connections = parse("SHOP_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("SHOP_BIND_ADDRESS") {
            self.bind_address = v;
        }
        if let Some(v) = lookup("SHOP_HTTP_PORT") {
            self.http_port = parse("SHOP_HTTP_PORT", &v)?;
        }
        if let Some(v) = lookup("SHOP_METRICS_PORT") {
            self.metrics_port = parse("SHOP_METRICS_PORT", &v)?;
        }
        if let Some(v) = lookup("SHOP_BATCH_FETCH_SIZE") {
            self.batch_fetch_size = parse("SHOP_BATCH_FETCH_SIZE", &v)?;
        }
        if let Some(v) = lookup("SHOP_SEED_DEMO_DATA") {
            self.seed_demo_data = parse("SHOP_SEED_DEMO_DATA", &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let batch = self.batch_fetch_size.get();
        if batch as i64 > MAX_PAGE_LIMIT {
            bail!("batch_fetch_size must be between 1 and {}, got {}", MAX_PAGE_LIMIT, batch);
        }
        if !RECOMMENDED_BATCH_SIZES.contains(&batch) {
            warn!(
                batch_fetch_size = batch,
                "⚠️ batch_fetch_size outside the recommended range 100..=1000"
            );
        }
        if self.max_connections == 0 {
            bail!("max_connections must be at least 1");
        }
        if self.http_port == self.metrics_port {
            bail!("http_port and metrics_port must differ, both are {}", self.http_port);
        }
        Ok(())
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid value {:?} for {}: {}", value, key, e))
}
