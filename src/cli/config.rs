use crate::core::{DiscoveryMode, Result, WorldError};
use crate::database::DatabaseConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration settings for the world-reports console
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Default verbosity level
    #[serde(default)]
    pub verbose: bool,

    /// Database connection and pool settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Interactive session settings
    #[serde(default)]
    pub repl: ReplDefaults,

    /// How reports are registered at startup
    #[serde(default)]
    pub discovery: DiscoveryDefaults,
}

/// Interactive session defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplDefaults {
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Enable colored error labels
    #[serde(default = "default_true")]
    pub color: bool,
}

/// Report discovery defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryDefaults {
    #[serde(default)]
    pub mode: DiscoveryMode,

    /// Namespace searched by `scan` and `manifest`
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Manifest file for `manifest` mode; the bundled list when unset
    pub manifest: Option<PathBuf>,
}

impl Default for ReplDefaults {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            color: default_true(),
        }
    }
}

impl Default for DiscoveryDefaults {
    fn default() -> Self {
        Self {
            mode: DiscoveryMode::default(),
            namespace: default_namespace(),
            manifest: None,
        }
    }
}

impl Config {
    /// Load configuration from file, creating a default one if missing
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            let config = Self::default();
            config.save_to_file(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            WorldError::configuration(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            WorldError::configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let data_dir = crate::cli::ensure_data_dir()?;
        Ok(data_dir.join("config.toml"))
    }

    /// Load configuration from the default location
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path()?;
        Self::load_from_file(path)
    }

    /// Apply `MYSQL_*` environment overrides to the database section
    pub fn with_env_overrides(mut self) -> Result<Self> {
        self.database.apply_env()?;
        Ok(self)
    }

    /// Merge with command-line arguments, giving priority to CLI args
    pub fn merge_with_cli_args(mut self, cli_args: &crate::cli::app::Cli) -> Self {
        if cli_args.verbose {
            self.verbose = true;
        }
        if let Some(mode) = cli_args.discovery {
            self.discovery.mode = mode;
        }
        self
    }
}

fn default_prompt() -> String {
    "> ".to_string()
}

fn default_true() -> bool {
    true
}

fn default_namespace() -> String {
    "reports".to_string()
}
