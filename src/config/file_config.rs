//! TOML file configuration.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Raw TOML configuration.
///
/// All fields are optional; missing values fall back to CLI arguments or
/// defaults during resolution.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub db_dir: Option<String>,
    pub queue: Option<QueueFileConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueueFileConfig {
    pub capacity: Option<usize>,
}

impl FileConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file {:?}", path.as_ref()))?;
        toml::from_str(&content).context("Failed to parse config file")
    }
}
