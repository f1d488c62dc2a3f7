//! Configuration types for the Axum HTTP server.
//!
//! This module provides configuration options for the REST API server,
//! including network binding, pagination and password-reset settings.

use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, time::Duration};

/// Configuration for the Axum HTTP server.
///
/// # Examples
///
/// ```
/// use erp_axum::config::AxumConfig;
/// use std::time::Duration;
///
/// // Use default configuration
/// let config = AxumConfig::default();
///
/// // Custom configuration
/// let config = AxumConfig {
///     bind_address: "127.0.0.1:3000".parse().unwrap(),
///     page_limit: 50,
///     reset_token_ttl: Duration::from_secs(15 * 60),
/// };
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AxumConfig {
    /// The address to bind the server to
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// The maximum number of vouchers returned by a listing
    #[serde(default = "default_page_limit")]
    pub page_limit: usize,

    /// How long a password-reset token stays valid (e.g. `1h`, `30m`)
    #[serde(default = "default_reset_token_ttl", with = "humantime_serde")]
    pub reset_token_ttl: Duration,
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_page_limit() -> usize {
    100
}

fn default_reset_token_ttl() -> Duration {
    Duration::from_secs(60 * 60)
}

impl Default for AxumConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            page_limit: default_page_limit(),
            reset_token_ttl: default_reset_token_ttl(),
        }
    }
}
