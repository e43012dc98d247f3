mod file_config;

pub use file_config::{FileConfig, QueueFileConfig};

use anyhow::{bail, Result};
use std::path::PathBuf;

/// Settings for the submission queue.
#[derive(Debug, Clone)]
pub struct QueueSettings {
    /// Maximum number of pending submissions before submit rejects.
    pub capacity: usize,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub queue_capacity: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub queue: QueueSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let queue_file = file.queue.unwrap_or_default();
        let queue_defaults = QueueSettings::default();
        let queue = QueueSettings {
            capacity: queue_file
                .capacity
                .or(cli.queue_capacity)
                .unwrap_or(queue_defaults.capacity),
        };

        Ok(Self { db_dir, queue })
    }

    pub fn objekt_db_path(&self) -> PathBuf {
        self.db_dir.join("objekt.db")
    }

    pub fn server_db_path(&self) -> PathBuf {
        self.db_dir.join("server.db")
    }
}
