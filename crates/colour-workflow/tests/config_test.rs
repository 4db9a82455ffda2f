// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Tests for `DriverConfig::from_env`.

use std::env;
use std::sync::Mutex;
use std::time::Duration;

use colour_workflow::{DriverConfig, WorkflowError};

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const VARS: [&str; 5] = [
    "COLOUR_WORKFLOW_ITERATIONS",
    "COLOUR_WORKFLOW_TIMEOUT_SECS",
    "COLOUR_CALL_TIMEOUT_MS",
    "COLOUR_FAILURE_RATE",
    "COLOUR_API_URL",
];

/// Helper to set env vars for a test and restore them after
struct EnvGuard {
    vars: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    /// Start from a clean slate: every driver variable unset.
    fn clean() -> Self {
        let mut guard = Self { vars: Vec::new() };
        for key in VARS {
            guard.remember(key);
            // SAFETY: Tests are serialized via ENV_MUTEX, so no concurrent access
            unsafe { env::remove_var(key) };
        }
        guard
    }

    fn remember(&mut self, key: &str) {
        let old = env::var(key).ok();
        self.vars.push((key.to_string(), old));
    }

    fn set(&mut self, key: &str, value: &str) {
        self.remember(key);
        // SAFETY: Tests are serialized via ENV_MUTEX, so no concurrent access
        unsafe { env::set_var(key, value) };
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.vars.drain(..).rev() {
            // SAFETY: Tests are serialized via ENV_MUTEX, so no concurrent access
            unsafe {
                match value {
                    Some(v) => env::set_var(&key, v),
                    None => env::remove_var(&key),
                }
            }
        }
    }
}

#[test]
fn test_from_env_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let _guard = EnvGuard::clean();

    let config = DriverConfig::from_env().unwrap();

    assert_eq!(config, DriverConfig::default());
}

#[test]
fn test_from_env_all_set() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let mut guard = EnvGuard::clean();
    guard.set("COLOUR_WORKFLOW_ITERATIONS", "7");
    guard.set("COLOUR_WORKFLOW_TIMEOUT_SECS", "30");
    guard.set("COLOUR_CALL_TIMEOUT_MS", "250");
    guard.set("COLOUR_FAILURE_RATE", "0.5");
    guard.set("COLOUR_API_URL", "http://127.0.0.1:9000");

    let config = DriverConfig::from_env().unwrap();

    assert_eq!(config.iterations, 7);
    assert_eq!(config.run_timeout, Duration::from_secs(30));
    assert_eq!(config.call_timeout, Duration::from_millis(250));
    assert_eq!(config.failure_rate, 0.5);
    assert_eq!(config.api_url.as_deref(), Some("http://127.0.0.1:9000"));
}

#[test]
fn test_from_env_empty_api_url_means_embedded() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let mut guard = EnvGuard::clean();
    guard.set("COLOUR_API_URL", "");

    let config = DriverConfig::from_env().unwrap();

    assert!(config.api_url.is_none());
}

#[test]
fn test_from_env_rejects_zero_iterations() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let mut guard = EnvGuard::clean();
    guard.set("COLOUR_WORKFLOW_ITERATIONS", "0");

    let err = DriverConfig::from_env().unwrap_err();

    assert!(matches!(err, WorkflowError::Config(_)));
    assert!(err.to_string().contains("COLOUR_WORKFLOW_ITERATIONS"));
}

#[test]
fn test_from_env_rejects_failure_rate_out_of_range() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let mut guard = EnvGuard::clean();
    guard.set("COLOUR_FAILURE_RATE", "1.5");

    let err = DriverConfig::from_env().unwrap_err();

    assert!(err.to_string().contains("COLOUR_FAILURE_RATE"));
}

#[test]
fn test_from_env_rejects_bad_timeouts() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let mut guard = EnvGuard::clean();
    guard.set("COLOUR_CALL_TIMEOUT_MS", "soon");

    assert!(matches!(
        DriverConfig::from_env(),
        Err(WorkflowError::Config(_))
    ));

    guard.set("COLOUR_CALL_TIMEOUT_MS", "100");
    guard.set("COLOUR_WORKFLOW_TIMEOUT_SECS", "-1");

    assert!(matches!(
        DriverConfig::from_env(),
        Err(WorkflowError::Config(_))
    ));
}
