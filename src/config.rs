use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::row::Field;

/// Where `hexval` looks for a config file when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "./config/hexval.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub import: ImportConfig,
    /// Extra column aliases per logical field, appended to the built-in ones.
    #[serde(default)]
    pub columns: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub dates: DatesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImportConfig {
    #[serde(default)]
    pub required_fields: Vec<Field>,
    #[serde(default)]
    pub require_host_or_ip: bool,
    #[serde(default)]
    pub allow_vendor_advisories: bool,
    #[serde(default = "default_normalize_hostnames")]
    pub normalize_hostnames: bool,
    #[serde(default = "default_abort_threshold_pct")]
    pub abort_threshold_pct: f64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            required_fields: Vec::new(),
            require_host_or_ip: false,
            allow_vendor_advisories: false,
            normalize_hostnames: default_normalize_hostnames(),
            abort_threshold_pct: default_abort_threshold_pct(),
        }
    }
}

fn default_normalize_hostnames() -> bool {
    true
}
fn default_abort_threshold_pct() -> f64 {
    50.0
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatesConfig {
    #[serde(default)]
    pub day_first: bool,
}

impl Config {
    /// Built-in defaults, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }
}

/// Resolve the config to use: an explicit path must load, the default
/// path is used if present, otherwise [`Config::minimal`].
pub fn resolve_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => load_config(path),
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                load_config(&default_path)
            } else {
                Ok(Config::minimal())
            }
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if !(0.0..=100.0).contains(&config.import.abort_threshold_pct) {
        anyhow::bail!("import.abort_threshold_pct must be in [0.0, 100.0]");
    }

    for (field, aliases) in &config.columns {
        field
            .parse::<Field>()
            .with_context(|| format!("Unknown field in [columns]: '{}'", field))?;
        if aliases.iter().any(|a| a.trim().is_empty()) {
            anyhow::bail!("columns.{} contains an empty alias", field);
        }
    }

    Ok(config)
}
