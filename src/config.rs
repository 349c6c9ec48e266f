//! Runtime configuration
//!
//! Layered as defaults, then `archgraph.toml` in the project root, then the
//! environment, then command-line flags.

use archgraph_parser::default_worker_count;
use archgraph_watcher::SyncConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "archgraph.toml";
pub const DEBOUNCE_ENV: &str = "ARCHGRAPH_DEBOUNCE_MS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("{name} must be a number of milliseconds, got {value:?}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("parser_workers must be at least 1")]
    NoWorkers,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArchgraphConfig {
    pub root: PathBuf,
    pub debounce_ms: u64,
    pub extensions: Vec<String>,
    pub ignore_dirs: Vec<String>,
    pub parser_workers: usize,
}

/// The subset of settings a config file may override.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    debounce_ms: Option<u64>,
    extensions: Option<Vec<String>>,
    ignore_dirs: Option<Vec<String>>,
    parser_workers: Option<usize>,
}

/// Flags given on the command line.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub debounce_ms: Option<u64>,
    pub parser_workers: Option<usize>,
}

impl ArchgraphConfig {
    pub fn defaults(root: impl Into<PathBuf>) -> Self {
        ArchgraphConfig {
            root: root.into(),
            debounce_ms: 250,
            extensions: vec!["rs".to_string()],
            ignore_dirs: vec!["target".to_string(), ".git".to_string(), "node_modules".to_string()],
            parser_workers: default_worker_count(),
        }
    }

    /// Resolve the full configuration for `root`.
    pub fn load(root: &Path, cli: &CliOverrides) -> Result<Self, ConfigError> {
        let mut config = Self::defaults(root);
        config.apply_file(&root.join(CONFIG_FILE))?;
        config.apply_env(|name| std::env::var(name).ok())?;
        config.apply_cli(cli);

        if config.parser_workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        tracing::debug!("Resolved configuration: {:?}", config);
        Ok(config)
    }

    fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            return Ok(());
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: FileConfig = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!("Loaded {}", path.display());
        if let Some(debounce_ms) = file.debounce_ms {
            self.debounce_ms = debounce_ms;
        }
        if let Some(extensions) = file.extensions {
            self.extensions = extensions;
        }
        if let Some(ignore_dirs) = file.ignore_dirs {
            self.ignore_dirs = ignore_dirs;
        }
        if let Some(parser_workers) = file.parser_workers {
            self.parser_workers = parser_workers;
        }
        Ok(())
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(value) = lookup(DEBOUNCE_ENV) {
            self.debounce_ms = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: DEBOUNCE_ENV,
                value,
            })?;
        }
        Ok(())
    }

    fn apply_cli(&mut self, cli: &CliOverrides) {
        if let Some(debounce_ms) = cli.debounce_ms {
            self.debounce_ms = debounce_ms;
        }
        if let Some(parser_workers) = cli.parser_workers {
            self.parser_workers = parser_workers;
        }
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            debounce: Duration::from_millis(self.debounce_ms),
            extensions: self.extensions.clone(),
            ignore_dirs: self.ignore_dirs.clone(),
        }
    }
}
