// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Workflow-specific error types.
//!
//! Step failures are not errors here: the driver branches on them. These
//! variants cover what stops a run from starting at all.

use thiserror::Error;

/// Errors that can occur in the workflow driver.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Configuration error (missing or invalid environment variable)
    #[error("configuration error: {0}")]
    Config(String),

    /// A run was requested with zero iterations
    #[error("iteration count must be at least 1, got {0}")]
    InvalidIterations(u32),

    /// The backend could not be constructed
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result type for workflow operations.
pub type Result<T> = std::result::Result<T, WorkflowError>;
