//! MySQL connection settings and the pooled session provider

pub mod check;

pub use check::{check_connectivity, ConnectivityReport};

use crate::core::{Result, WorldError};
use crate::runtime::ResourceProvider;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::pool::PoolConnection;
use sqlx::MySql;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Connection and pool settings for the `world` database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Schema holding `country`, `city` and `countrylanguage`
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_password")]
    pub password: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            name: default_name(),
            user: default_user(),
            password: default_password(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
        }
    }
}

impl DatabaseConfig {
    /// Apply `MYSQL_*` variables from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`; empty values are ignored
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(host) = get("MYSQL_HOST") {
            self.host = host;
        }
        if let Some(port) = get("MYSQL_PORT") {
            self.port = port.trim().parse().map_err(|_| {
                WorldError::configuration(format!("MYSQL_PORT is not a valid port: {}", port))
            })?;
        }
        if let Some(name) = get("MYSQL_DATABASE") {
            self.name = name;
        }
        if let Some(user) = get("MYSQL_USER") {
            self.user = user;
        }
        if let Some(password) = get("MYSQL_PASSWORD") {
            self.password = password;
        }
        Ok(())
    }

    /// `mysql://user@host:port/name`, without the password
    pub fn display_url(&self) -> String {
        format!(
            "mysql://{}@{}:{}/{}",
            self.user, self.host, self.port, self.name
        )
    }

    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
    }

    pub fn pool_options(&self) -> MySqlPoolOptions {
        MySqlPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections.min(self.max_connections))
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(self.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(self.max_lifetime_secs))
    }
}

/// Lends pooled connections to interactive sessions
pub struct MySqlProvider {
    pool: MySqlPool,
    url: String,
}

impl MySqlProvider {
    /// Build the pool without connecting; the first acquire opens a connection
    pub fn new(config: &DatabaseConfig) -> Self {
        let pool = config.pool_options().connect_lazy_with(config.connect_options());
        info!(url = %config.display_url(), "Database pool configured");
        Self {
            pool,
            url: config.display_url(),
        }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        debug!(url = %self.url, "Closing database pool");
        self.pool.close().await;
    }
}

#[async_trait]
impl ResourceProvider for MySqlProvider {
    type Handle = PoolConnection<MySql>;

    async fn acquire(&self) -> Result<Self::Handle> {
        self.pool.acquire().await.map_err(|e| {
            warn!(url = %self.url, error = %e, "Connection acquisition failed");
            WorldError::resource_acquisition(format!("{} ({})", e, self.url))
        })
    }

    async fn release(&self, handle: Self::Handle) {
        debug!(url = %self.url, "Returning connection to the pool");
        drop(handle);
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    3307
}

fn default_name() -> String {
    "world".to_string()
}

fn default_user() -> String {
    "devuser".to_string()
}

fn default_password() -> String {
    "devpass".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    2
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_max_lifetime() -> u64 {
    1800
}
