// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Record service backends for the driver.
//!
//! This module provides different backends for record service calls:
//! - `embedded`: Direct calls into an in-process `RecordService`
//! - `http`: JSON over HTTP against a colour-core server (feature `http`)

pub mod embedded;

#[cfg(feature = "http")]
pub mod http;

use std::sync::Arc;

use async_trait::async_trait;
use colour_core::api::{
    CreateRequest, DeleteRequest, DeleteResponse, ReadRequest, ReadResponse, UpdateRequest,
    WriteResponse,
};
use colour_core::error::ErrorPayload;

use crate::config::DriverConfig;
use crate::error::Result;
#[cfg(not(feature = "http"))]
use crate::error::WorkflowError;

pub use self::embedded::EmbeddedBackend;
#[cfg(feature = "http")]
pub use self::http::HttpBackend;

/// Backend trait for record service calls.
///
/// This trait abstracts the transport, allowing the driver to work with
/// either an in-process service or a remote HTTP boundary. Every failure,
/// including transport failures, is reported as an [`ErrorPayload`].
#[async_trait]
pub trait RecordApi: Send + Sync {
    /// Create a record.
    async fn create(&self, request: CreateRequest)
    -> std::result::Result<WriteResponse, ErrorPayload>;

    /// Update a record.
    async fn update(&self, request: UpdateRequest)
    -> std::result::Result<WriteResponse, ErrorPayload>;

    /// Delete a record.
    async fn delete(&self, request: DeleteRequest)
    -> std::result::Result<DeleteResponse, ErrorPayload>;

    /// Read records.
    async fn read(&self, request: ReadRequest) -> std::result::Result<ReadResponse, ErrorPayload>;
}

/// Pick the backend described by `config`: HTTP when `api_url` is set,
/// otherwise an embedded service over an in-memory store.
pub fn from_config(config: &DriverConfig) -> Result<Arc<dyn RecordApi>> {
    match &config.api_url {
        #[cfg(feature = "http")]
        Some(url) => Ok(Arc::new(HttpBackend::new(url)?)),
        #[cfg(not(feature = "http"))]
        Some(url) => Err(WorkflowError::Config(format!(
            "COLOUR_API_URL is set to {} but the http feature is disabled",
            url
        ))),
        None => Ok(Arc::new(EmbeddedBackend::in_memory())),
    }
}
