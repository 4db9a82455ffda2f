// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Driver configuration.

use std::env;
use std::time::Duration;

use crate::error::{Result, WorkflowError};

/// Default number of create/update iterations per run.
pub const DEFAULT_ITERATIONS: u32 = 20;

/// Default wall-clock ceiling for a whole run.
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Default ceiling for a single record service call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Default probability that a call asks for a simulated failure.
pub const DEFAULT_FAILURE_RATE: f64 = 0.1;

/// Configuration for a workflow driver.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverConfig {
    /// Iterations per run (default: 20)
    pub iterations: u32,
    /// Wall-clock ceiling for a whole run (default: 15 minutes)
    pub run_timeout: Duration,
    /// Ceiling for a single call (default: 10 seconds)
    pub call_timeout: Duration,
    /// Probability of requesting a simulated failure per call (default: 0.1)
    pub failure_rate: f64,
    /// Base URL of the colour-core HTTP server. `None` runs against an
    /// embedded in-memory service.
    pub api_url: Option<String>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            run_timeout: DEFAULT_RUN_TIMEOUT,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            failure_rate: DEFAULT_FAILURE_RATE,
            api_url: None,
        }
    }
}

impl DriverConfig {
    /// Load configuration from environment variables.
    ///
    /// # Optional Environment Variables
    /// - `COLOUR_WORKFLOW_ITERATIONS` - Iterations per run (default: 20, must be > 0)
    /// - `COLOUR_WORKFLOW_TIMEOUT_SECS` - Run timeout (default: 900)
    /// - `COLOUR_CALL_TIMEOUT_MS` - Per-call timeout (default: 10000)
    /// - `COLOUR_FAILURE_RATE` - Simulated failure probability (default: 0.1)
    /// - `COLOUR_API_URL` - colour-core base URL (default: embedded service)
    pub fn from_env() -> Result<Self> {
        let iterations = match env::var("COLOUR_WORKFLOW_ITERATIONS") {
            Ok(v) => v
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    WorkflowError::Config(format!(
                        "invalid COLOUR_WORKFLOW_ITERATIONS: {:?} (must be a positive integer)",
                        v
                    ))
                })?,
            Err(_) => DEFAULT_ITERATIONS,
        };

        let run_timeout = match env::var("COLOUR_WORKFLOW_TIMEOUT_SECS") {
            Ok(v) => v.parse().map(Duration::from_secs).map_err(|e| {
                WorkflowError::Config(format!("invalid COLOUR_WORKFLOW_TIMEOUT_SECS: {}", e))
            })?,
            Err(_) => DEFAULT_RUN_TIMEOUT,
        };

        let call_timeout = match env::var("COLOUR_CALL_TIMEOUT_MS") {
            Ok(v) => v.parse().map(Duration::from_millis).map_err(|e| {
                WorkflowError::Config(format!("invalid COLOUR_CALL_TIMEOUT_MS: {}", e))
            })?,
            Err(_) => DEFAULT_CALL_TIMEOUT,
        };

        let failure_rate = match env::var("COLOUR_FAILURE_RATE") {
            Ok(v) => v
                .parse::<f64>()
                .ok()
                .filter(|rate| (0.0..=1.0).contains(rate))
                .ok_or_else(|| {
                    WorkflowError::Config(format!(
                        "invalid COLOUR_FAILURE_RATE: {:?} (must be between 0.0 and 1.0)",
                        v
                    ))
                })?,
            Err(_) => DEFAULT_FAILURE_RATE,
        };

        let api_url = env::var("COLOUR_API_URL").ok().filter(|v| !v.is_empty());

        Ok(Self {
            iterations,
            run_timeout,
            call_timeout,
            failure_rate,
            api_url,
        })
    }

    /// Set the iteration count.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the run timeout.
    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = timeout;
        self
    }

    /// Set the per-call timeout.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Set the simulated failure probability, clamped to `0.0..=1.0`.
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Point the driver at a colour-core HTTP server.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DriverConfig::default();
        assert_eq!(config.iterations, 20);
        assert_eq!(config.run_timeout, Duration::from_secs(900));
        assert_eq!(config.call_timeout, Duration::from_millis(10_000));
        assert_eq!(config.failure_rate, 0.1);
        assert!(config.api_url.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let config = DriverConfig::default()
            .with_iterations(3)
            .with_run_timeout(Duration::from_secs(5))
            .with_call_timeout(Duration::from_millis(250))
            .with_api_url("http://127.0.0.1:8080");

        assert_eq!(config.iterations, 3);
        assert_eq!(config.run_timeout, Duration::from_secs(5));
        assert_eq!(config.call_timeout, Duration::from_millis(250));
        assert_eq!(config.api_url.as_deref(), Some("http://127.0.0.1:8080"));
    }

    #[test]
    fn test_failure_rate_is_clamped() {
        assert_eq!(DriverConfig::default().with_failure_rate(1.5).failure_rate, 1.0);
        assert_eq!(DriverConfig::default().with_failure_rate(-0.2).failure_rate, 0.0);
    }
}
