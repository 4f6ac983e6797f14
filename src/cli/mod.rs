//! Command-line front end of the world-reports console
//!
//! ## Usage
//!
//! ```bash
//! # Start the interactive console
//! world-reports
//!
//! # Check database connectivity and exit
//! world-reports --test-db
//!
//! # Register reports from a manifest instead of the built-in table
//! world-reports --discovery manifest
//! ```

pub mod app;
pub mod config;

pub use app::{Cli, Invocation, Mode};
pub use config::Config;

use crate::core::Result;

/// Version information for the console
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default directory for the configuration file
pub fn default_data_dir() -> std::path::PathBuf {
    directories::ProjectDirs::from("", "", "world-reports")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| {
            // Fallback to home directory if project dirs not available
            dirs::home_dir()
                .unwrap_or_else(|| std::path::PathBuf::from("."))
                .join(".world-reports")
        })
}

/// Initialize the data directory if it doesn't exist
pub fn ensure_data_dir() -> Result<std::path::PathBuf> {
    let data_dir = default_data_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
    }
    Ok(data_dir)
}
