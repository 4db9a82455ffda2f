// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Embedded backend for direct service access.
//!
//! This backend bypasses HTTP and calls the record service directly,
//! suitable for running the driver and the service in the same process.

use std::sync::Arc;

use async_trait::async_trait;
use colour_core::api::{
    CreateRequest, DeleteRequest, DeleteResponse, ReadRequest, ReadResponse, UpdateRequest,
    WriteResponse,
};
use colour_core::error::ErrorPayload;
use colour_core::persistence::MemoryStore;
use colour_core::service::RecordService;
use colour_core::telemetry::TracingSink;
use tracing::{debug, instrument};

use super::RecordApi;

/// Embedded backend for record service calls.
pub struct EmbeddedBackend {
    service: Arc<RecordService>,
}

impl EmbeddedBackend {
    /// Create a new embedded backend over an existing service.
    pub fn new(service: Arc<RecordService>) -> Self {
        Self { service }
    }

    /// Create a backend over a fresh in-memory store, reporting metrics
    /// through `tracing`.
    pub fn in_memory() -> Self {
        let service = RecordService::new(Arc::new(MemoryStore::new()), Arc::new(TracingSink));
        Self::new(Arc::new(service))
    }

    /// The service behind this backend.
    pub fn service(&self) -> &Arc<RecordService> {
        &self.service
    }
}

#[async_trait]
impl RecordApi for EmbeddedBackend {
    #[instrument(skip_all)]
    async fn create(&self, request: CreateRequest) -> Result<WriteResponse, ErrorPayload> {
        debug!("Embedded create");
        self.service.create(request).await.into_result()
    }

    #[instrument(skip_all)]
    async fn update(&self, request: UpdateRequest) -> Result<WriteResponse, ErrorPayload> {
        debug!(record_id = ?request.id, "Embedded update");
        self.service.update(request).await.into_result()
    }

    #[instrument(skip_all)]
    async fn delete(&self, request: DeleteRequest) -> Result<DeleteResponse, ErrorPayload> {
        debug!(record_id = ?request.id, "Embedded delete");
        self.service.delete(request).await
    }

    #[instrument(skip_all)]
    async fn read(&self, request: ReadRequest) -> Result<ReadResponse, ErrorPayload> {
        debug!(correlation_id = ?request.correlation_id, "Embedded read");
        self.service.read(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colour_core::record::{Colour, ColourChoice};

    #[tokio::test]
    async fn test_embedded_round_trip() {
        let backend = EmbeddedBackend::in_memory();

        let created = backend
            .create(
                CreateRequest::new(ColourChoice::new(false, true)).with_correlation_id("emb"),
            )
            .await
            .unwrap();
        assert_eq!(created.colour, Colour::Blue);
        assert_eq!(created.correlation_id, "emb");

        let read = backend.read(ReadRequest::by_correlation("emb")).await.unwrap();
        assert_eq!(read.count, 1);
        assert_eq!(read.records[0].id, created.id);
    }

    #[tokio::test]
    async fn test_embedded_errors_are_payloads() {
        let backend = EmbeddedBackend::in_memory();

        let err = backend
            .update(UpdateRequest::new("nope", ColourChoice::new(true, false)))
            .await
            .unwrap_err();
        assert_eq!(err.status, 400);
        assert_eq!(err.message, "nope does not exist");
        assert!(!err.request_id.is_empty());
    }
}
