// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for colour-core.
//!
//! [`ServiceError`] is the caller-facing taxonomy. Every variant is either a
//! client error (caller-correctable) or an internal error, which decides the
//! status class, the log severity and the metric that gets counted.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::persistence::WritePrecondition;

/// Whether a failure is the caller's to fix or ours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing input, a reference to something absent, an empty result.
    Client,
    /// Everything else, including injected failures.
    Internal,
}

impl ErrorKind {
    /// Status class for this kind (400 or 500).
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Client => 400,
            Self::Internal => 500,
        }
    }
}

/// Outcome tag reported for every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The operation did what was asked.
    Success,
    /// The caller has to change the request.
    ClientError,
    /// The service failed.
    InternalError,
}

impl From<ErrorKind> for Outcome {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Client => Self::ClientError,
            ErrorKind::Internal => Self::InternalError,
        }
    }
}

/// Errors produced by record service operations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ServiceError {
    /// An operation that targets an existing record was called without an id.
    MissingItemId {
        /// "update" or "delete".
        operation: &'static str,
    },

    /// Neither colour flag was set.
    MissingColour,

    /// Both colour flags were set.
    InvalidColour,

    /// The store reported the id absent.
    ItemNotFound {
        /// The id that does not exist.
        id: String,
    },

    /// The scoped read matched nothing.
    NoItemsFound,

    /// Failure requested by the caller through `simulateFailure`.
    SimulatedFailure {
        /// The operation that was asked to fail.
        operation: &'static str,
    },

    /// The store failed for a reason other than a precondition.
    Store {
        /// The store operation that failed.
        operation: String,
        /// Error details.
        details: String,
    },
}

impl ServiceError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingItemId { .. }
            | Self::MissingColour
            | Self::InvalidColour
            | Self::ItemNotFound { .. }
            | Self::NoItemsFound => ErrorKind::Client,
            Self::SimulatedFailure { .. } | Self::Store { .. } => ErrorKind::Internal,
        }
    }

    /// Status class for this error.
    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Get the error code string for this error type.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingItemId { .. } => "MISSING_ITEM_ID",
            Self::MissingColour => "MISSING_COLOUR",
            Self::InvalidColour => "INVALID_COLOUR",
            Self::ItemNotFound { .. } => "ITEM_NOT_FOUND",
            Self::NoItemsFound => "NO_ITEMS_FOUND",
            Self::SimulatedFailure { .. } => "SIMULATED_FAILURE",
            Self::Store { .. } => "STORE_ERROR",
        }
    }

    /// Stamp this error with the request that produced it.
    pub fn to_payload(&self, request_id: &str) -> ErrorPayload {
        ErrorPayload {
            status: self.status_code(),
            message: self.to_string(),
            request_id: request_id.to_string(),
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingItemId { operation } => {
                let article = if operation.starts_with(['a', 'e', 'i', 'o', 'u']) {
                    "an"
                } else {
                    "a"
                };
                write!(f, "itemId is required for {} {}", article, operation)
            }
            Self::MissingColour => write!(f, "missing colour choice"),
            Self::InvalidColour => write!(f, "invalid colour choices"),
            Self::ItemNotFound { id } => write!(f, "{} does not exist", id),
            Self::NoItemsFound => write!(f, "no items found"),
            Self::SimulatedFailure { operation } => {
                write!(f, "simulated failure during {}", operation)
            }
            Self::Store { operation, details } => {
                write!(f, "store error during '{}': {}", operation, details)
            }
        }
    }
}

impl std::error::Error for ServiceError {}

/// An error as surfaced to callers: status class, message and the id of the
/// request that produced it.
///
/// `Display` renders the packed single-string form (compact JSON) used in log
/// lines and workflow failure reasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    /// 400 for client errors, 500 for internal errors.
    pub status: u16,
    /// Human-readable message.
    pub message: String,
    /// Identifier of the originating request (empty if none was assigned).
    #[serde(default)]
    pub request_id: String,
}

impl ErrorPayload {
    /// Build an internal-class payload for failures that happen outside the
    /// service (transport errors, timeouts).
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: 500,
            message: message.into(),
            request_id: String::new(),
        }
    }

    /// Classify by status class; anything outside 4xx counts as internal.
    pub fn kind(&self) -> ErrorKind {
        if (400..500).contains(&self.status) {
            ErrorKind::Client
        } else {
            ErrorKind::Internal
        }
    }

    /// Whether the caller could fix this by changing the request.
    pub fn is_client_error(&self) -> bool {
        self.kind() == ErrorKind::Client
    }

    /// Parse the packed single-string form back into a payload.
    pub fn from_packed(packed: &str) -> Option<Self> {
        serde_json::from_str(packed).ok()
    }
}

impl fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let packed = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&packed)
    }
}

impl std::error::Error for ErrorPayload {}

/// Errors reported by a [`RecordStore`](crate::persistence::RecordStore).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The write's existence precondition did not hold.
    #[error("precondition {precondition} failed for '{id}'")]
    ConditionFailed {
        /// The record id.
        id: String,
        /// The precondition that was declared.
        precondition: WritePrecondition,
    },

    /// The backend failed.
    #[error("store error during '{operation}': {details}")]
    Backend {
        /// The operation that failed.
        operation: String,
        /// Error details.
        details: String,
    },
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend {
            operation: "query".to_string(),
            details: err.to_string(),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ConditionFailed {
                id,
                precondition: WritePrecondition::RequireExists,
            } => ServiceError::ItemNotFound { id },
            StoreError::ConditionFailed { id, precondition } => ServiceError::Store {
                operation: "put".to_string(),
                details: format!("precondition {} failed for '{}'", precondition, id),
            },
            StoreError::Backend { operation, details } => {
                ServiceError::Store { operation, details }
            }
        }
    }
}
