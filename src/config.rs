use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::loader::ParseOptions;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "CSV_LENS_CONFIG";

/// Config file looked up in the working directory when the variable is unset.
pub const DEFAULT_CONFIG_FILE: &str = "csv-lens.json";

/// User-tunable settings. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window_width: f32,
    pub window_height: f32,
    /// Rows shown right after a load.
    pub preview_rows: usize,
    /// Initial N for the head/tail views.
    pub window_rows: usize,
    /// Values listed in the single-column view.
    pub column_sample: usize,
    /// Most rows any table renders; exports are never capped.
    pub max_table_rows: usize,
    /// Initial values of the load form.
    pub parse: ParseOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_width: 1200.0,
            window_height: 800.0,
            preview_rows: 5,
            window_rows: 5,
            column_sample: 10,
            max_table_rows: 1000,
            parse: ParseOptions::default(),
        }
    }
}

impl AppConfig {
    /// Load from `$CSV_LENS_CONFIG`, else `./csv-lens.json`, else defaults.
    /// A broken file is logged and ignored.
    pub fn discover() -> Self {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(p) => PathBuf::from(p),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::from_file(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring config {}: {e:#}", path.display());
                Self::default()
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).context("reading config file")?;
        serde_json::from_str(&text).context("parsing config JSON")
    }
}
