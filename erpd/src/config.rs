//! Application configuration management.
//!
//! Configuration is merged from default values, an optional TOML file and
//! environment variables, in increasing order of precedence.

use crate::Cli;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The main application configuration that composes all component configs
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AppConfig {
    /// Web server configuration (bind address, page limit, reset token TTL)
    #[serde(default)]
    pub server: erp_axum::config::AxumConfig,

    /// Database configuration (file path, pool size)
    #[serde(default)]
    pub database: erp_sqlite::config::SqliteConfig,

    /// Bearer token configuration
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Configuration for issued bearer tokens.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// How long a token issued at login stays valid
    #[serde(default = "default_token_lifetime", with = "humantime_serde")]
    pub token_lifetime: Duration,
}

fn default_token_lifetime() -> Duration {
    Duration::from_secs(24 * 60 * 60)
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_lifetime: default_token_lifetime(),
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest priority)
    /// 2. Config file given by the CLI
    /// 3. Default values (lowest priority)
    ///
    /// Environment variables are mapped using the pattern
    /// `APP_<SECTION>__<KEY>` to `<section>.<key>`:
    ///
    /// ```bash
    /// export APP_DATABASE__DATABASE_PATH="/var/lib/ledgerline/erp.db"
    /// export APP_SERVER__BIND_ADDRESS="0.0.0.0:3000"
    /// export APP_AUTH__TOKEN_LIFETIME="8h"
    /// ```
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        config = config.add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = &cli.config {
            if path.exists() {
                config = config.add_source(config::File::from(path.as_path()))
            } else {
                return Err(anyhow::anyhow!(
                    "Config file {} does not exist",
                    path.display()
                ));
            }
        }

        // APP_SERVER__BIND_ADDRESS -> server.bind_address
        config = config.add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        config.build()?.try_deserialize().map_err(Into::into)
    }
}
