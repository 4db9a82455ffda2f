// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Request and response types of the record service.
//!
//! These are the wire shapes as well: request structs deserialize from JSON
//! bodies and query strings in camelCase, with every field optional.

use serde::{Deserialize, Serialize};

use crate::context::Operation;
use crate::error::{ErrorPayload, Outcome, ServiceError};
use crate::record::{Colour, ColourChoice, Record};

/// Create a record. There is deliberately no id field: ids are assigned by
/// the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateRequest {
    /// Grouping token; defaults to the request id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// Red flag.
    pub wants_red: bool,
    /// Blue flag.
    pub wants_blue: bool,
    /// Fail with an internal error before touching the store.
    pub simulate_failure: bool,
}

impl CreateRequest {
    /// Request with the given colour flags.
    pub fn new(choice: ColourChoice) -> Self {
        Self {
            wants_red: choice.wants_red,
            wants_blue: choice.wants_blue,
            ..Self::default()
        }
    }

    /// Attach a correlation token.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Request an injected failure.
    pub fn with_simulated_failure(mut self, simulate_failure: bool) -> Self {
        self.simulate_failure = simulate_failure;
        self
    }

    /// The colour flags of this request.
    pub fn choice(&self) -> ColourChoice {
        ColourChoice::new(self.wants_red, self.wants_blue)
    }
}

/// Rewrite an existing record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateRequest {
    /// Id of the record to rewrite; required.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Grouping token; defaults to the request id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// Red flag.
    pub wants_red: bool,
    /// Blue flag.
    pub wants_blue: bool,
    /// Fail with an internal error before touching the store.
    pub simulate_failure: bool,
}

impl UpdateRequest {
    /// Request to recolour `id`.
    pub fn new(id: impl Into<String>, choice: ColourChoice) -> Self {
        Self {
            id: Some(id.into()),
            wants_red: choice.wants_red,
            wants_blue: choice.wants_blue,
            ..Self::default()
        }
    }

    /// Attach a correlation token.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Request an injected failure.
    pub fn with_simulated_failure(mut self, simulate_failure: bool) -> Self {
        self.simulate_failure = simulate_failure;
        self
    }

    /// The colour flags of this request.
    pub fn choice(&self) -> ColourChoice {
        ColourChoice::new(self.wants_red, self.wants_blue)
    }
}

/// Remove an existing record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleteRequest {
    /// Id of the record to remove; required.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Grouping token; defaults to the request id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// Fail with an internal error before touching the store.
    pub simulate_failure: bool,
}

impl DeleteRequest {
    /// Request to remove `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Attach a correlation token.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Request an injected failure.
    pub fn with_simulated_failure(mut self, simulate_failure: bool) -> Self {
        self.simulate_failure = simulate_failure;
        self
    }
}

/// List records, optionally scoped to a correlation token and/or an id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadRequest {
    /// Keep only this id, applied after the scoped fetch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Restrict the fetch to this correlation token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl ReadRequest {
    /// Read everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Read one correlation batch.
    pub fn by_correlation(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: Some(correlation_id.into()),
            ..Self::default()
        }
    }

    /// Also filter by id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Success payload of create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteResponse {
    /// Record id.
    pub id: String,
    /// Correlation token of the call.
    pub correlation_id: String,
    /// Classification written.
    pub colour: Colour,
}

/// Success payload of delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    /// Correlation token of the call.
    pub correlation_id: String,
}

/// Success payload of read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResponse {
    /// Number of records returned.
    pub count: usize,
    /// The matching records.
    pub records: Vec<Record>,
}

/// Result of a create or update.
///
/// The classified record is reported even when the write was rejected, so
/// callers can see which colour the flags produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Create or update.
    pub operation: Operation,
    /// Id of the call.
    pub request_id: String,
    /// Correlation token of the call.
    pub correlation_id: String,
    /// The record as classified. `None` only when no id was supplied to an
    /// update.
    pub record: Option<Record>,
    /// Why the operation failed, if it did.
    pub error: Option<ServiceError>,
}

impl WriteOutcome {
    /// Outcome tag.
    pub fn outcome(&self) -> Outcome {
        match &self.error {
            None => Outcome::Success,
            Some(error) => error.kind().into(),
        }
    }

    /// Human-readable message.
    pub fn message(&self) -> String {
        match (&self.error, &self.record) {
            (Some(error), _) => error.to_string(),
            (None, Some(record)) => format!("{} {}d", record.id, self.operation),
            (None, None) => format!("{}d", self.operation),
        }
    }

    /// Convert to the wire result, stamping errors with the request id.
    pub fn into_result(self) -> Result<WriteResponse, ErrorPayload> {
        if let Some(error) = self.error {
            return Err(error.to_payload(&self.request_id));
        }

        match self.record {
            Some(record) => Ok(WriteResponse {
                id: record.id,
                correlation_id: self.correlation_id,
                colour: record.colour,
            }),
            None => Err(ErrorPayload {
                status: 500,
                message: "write completed without a record".to_string(),
                request_id: self.request_id,
            }),
        }
    }
}
