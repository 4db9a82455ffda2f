// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration loading from environment variables.

use std::net::SocketAddr;

use crate::service::DEFAULT_RETENTION_DAYS;

/// Colour Core configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database path; `None` selects the in-memory store
    pub database_url: Option<String>,
    /// HTTP server address
    pub http_addr: SocketAddr,
    /// Days a record lives after its last write
    pub retention_days: i64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional (with defaults):
    /// - `COLOUR_DATABASE_URL`: SQLite path (default: in-memory store)
    /// - `COLOUR_HTTP_PORT`: HTTP server port (default: 8080)
    /// - `COLOUR_RETENTION_DAYS`: record retention window (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("COLOUR_DATABASE_URL")
            .ok()
            .filter(|v| !v.is_empty());

        let http_port: u16 = std::env::var("COLOUR_HTTP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("COLOUR_HTTP_PORT", "must be a valid port number"))?;

        let retention_days: i64 = std::env::var("COLOUR_RETENTION_DAYS")
            .unwrap_or_else(|_| DEFAULT_RETENTION_DAYS.to_string())
            .parse()
            .ok()
            .filter(|days| *days > 0)
            .ok_or(ConfigError::Invalid(
                "COLOUR_RETENTION_DAYS",
                "must be a positive integer",
            ))?;

        Ok(Self {
            database_url,
            http_addr: SocketAddr::from(([0, 0, 0, 0], http_port)),
            retention_days,
        })
    }

    /// Retention window as a duration.
    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::days(self.retention_days)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
