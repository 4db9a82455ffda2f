// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Record service: create, update, delete and read colour records.
//!
//! Each call gets its own [`RequestContext`]. Client errors are logged at
//! `warn` and counted as `WARNING`; internal errors are logged at `error` and
//! counted as `ERROR`. Writes also count the classified colour, whether or not
//! the store was reached.

use std::sync::Arc;

use chrono::Utc;
use tracing::{Span, error, field, info, instrument, warn};

use crate::api::{
    CreateRequest, DeleteRequest, DeleteResponse, ReadRequest, ReadResponse, UpdateRequest,
    WriteOutcome,
};
use crate::context::{Operation, RequestContext};
use crate::error::{ErrorKind, ErrorPayload, ServiceError};
use crate::persistence::{RecordStore, WritePrecondition};
use crate::record::{ColourChoice, Record, new_record_id};
use crate::telemetry::{Metric, TelemetrySink};

/// Default retention window applied to `expires_at`.
pub const DEFAULT_RETENTION_DAYS: i64 = 30;

/// Validates, classifies and persists colour records.
///
/// Holds no state between calls; every operation may run concurrently with
/// any other.
pub struct RecordService {
    store: Arc<dyn RecordStore>,
    telemetry: Arc<dyn TelemetrySink>,
    retention: chrono::Duration,
}

impl RecordService {
    /// Create a service over `store`, reporting metrics to `telemetry`.
    pub fn new(store: Arc<dyn RecordStore>, telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self {
            store,
            telemetry,
            retention: chrono::Duration::days(DEFAULT_RETENTION_DAYS),
        }
    }

    /// Override the retention window.
    pub fn with_retention(mut self, retention: chrono::Duration) -> Self {
        self.retention = retention;
        self
    }

    /// The retention window in use.
    pub fn retention(&self) -> chrono::Duration {
        self.retention
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Create a record with a fresh id.
    #[instrument(
        skip(self, request),
        fields(request_id = field::Empty, correlation_id = field::Empty)
    )]
    pub async fn create(&self, request: CreateRequest) -> WriteOutcome {
        let ctx = begin(Operation::Create, request.correlation_id.as_deref());

        let choice = request.choice();
        let record = Record::new(
            new_record_id(),
            choice.classify(),
            &ctx.correlation_id,
            Utc::now(),
            self.retention,
        );

        let result = self
            .write(
                &ctx,
                &record,
                choice,
                request.simulate_failure,
                WritePrecondition::RequireAbsent,
            )
            .await;

        self.finish_write(ctx, Some(record), result)
    }

    /// Rewrite an existing record's colour and timestamps.
    #[instrument(
        skip(self, request),
        fields(request_id = field::Empty, correlation_id = field::Empty)
    )]
    pub async fn update(&self, request: UpdateRequest) -> WriteOutcome {
        let ctx = begin(Operation::Update, request.correlation_id.as_deref());

        let Some(id) = non_empty(request.id.as_deref()) else {
            return self.finish_write(
                ctx,
                None,
                Err(ServiceError::MissingItemId {
                    operation: "update",
                }),
            );
        };

        let choice = request.choice();
        let record = Record::new(
            id,
            choice.classify(),
            &ctx.correlation_id,
            Utc::now(),
            self.retention,
        );

        let result = self
            .write(
                &ctx,
                &record,
                choice,
                request.simulate_failure,
                WritePrecondition::RequireExists,
            )
            .await;

        self.finish_write(ctx, Some(record), result)
    }

    /// Remove an existing record.
    #[instrument(
        skip(self, request),
        fields(request_id = field::Empty, correlation_id = field::Empty)
    )]
    pub async fn delete(&self, request: DeleteRequest) -> Result<DeleteResponse, ErrorPayload> {
        let ctx = begin(Operation::Delete, request.correlation_id.as_deref());

        let result = match non_empty(request.id.as_deref()) {
            None => Err(ServiceError::MissingItemId {
                operation: "delete",
            }),
            Some(_) if request.simulate_failure => Err(ServiceError::SimulatedFailure {
                operation: "delete",
            }),
            Some(id) => self.store.delete(id).await.map_err(ServiceError::from),
        };

        match result {
            Ok(()) => {
                info!(record_id = ?request.id, "Record deleted");
                Ok(DeleteResponse {
                    correlation_id: ctx.correlation_id,
                })
            }
            Err(e) => Err(self.fail(&ctx, e)),
        }
    }

    /// List records scoped by correlation token, then filtered by id.
    ///
    /// An empty result is a client error, not an empty success.
    #[instrument(
        skip(self, request),
        fields(request_id = field::Empty, correlation_id = field::Empty)
    )]
    pub async fn read(&self, request: ReadRequest) -> Result<ReadResponse, ErrorPayload> {
        let ctx = begin(Operation::Read, request.correlation_id.as_deref());

        let fetched = match non_empty(request.correlation_id.as_deref()) {
            Some(correlation_id) => self.store.query_by_correlation(correlation_id).await,
            None => self.store.scan().await,
        };

        let mut records = match fetched {
            Ok(records) => records,
            Err(e) => return Err(self.fail(&ctx, e.into())),
        };

        if let Some(id) = non_empty(request.id.as_deref()) {
            records.retain(|r| r.id == id);
        }

        if records.is_empty() {
            return Err(self.fail(&ctx, ServiceError::NoItemsFound));
        }

        info!(count = records.len(), "Records read");
        Ok(ReadResponse {
            count: records.len(),
            records,
        })
    }

    /// Whether the backing store is reachable.
    pub async fn health(&self) -> bool {
        match self.store.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                error!(error = %e, "Store health check failed");
                false
            }
        }
    }

    async fn write(
        &self,
        ctx: &RequestContext,
        record: &Record,
        choice: ColourChoice,
        simulate_failure: bool,
        precondition: WritePrecondition,
    ) -> Result<(), ServiceError> {
        self.telemetry.count(ctx, Metric::Colour(record.colour));

        if simulate_failure {
            return Err(ServiceError::SimulatedFailure {
                operation: ctx.operation.as_str(),
            });
        }

        // The existence check wins over colour validation, and a rejected
        // colour is still written.
        self.store.put(record, precondition).await?;
        choice.validate()?;
        Ok(())
    }

    fn finish_write(
        &self,
        ctx: RequestContext,
        record: Option<Record>,
        result: Result<(), ServiceError>,
    ) -> WriteOutcome {
        let error = match result {
            Ok(()) => {
                if let Some(record) = &record {
                    info!(
                        record_id = %record.id,
                        colour = %record.colour,
                        "Record {}d",
                        ctx.operation
                    );
                }
                None
            }
            Err(e) => {
                self.fail(&ctx, e.clone());
                Some(e)
            }
        };

        WriteOutcome {
            operation: ctx.operation,
            request_id: ctx.request_id,
            correlation_id: ctx.correlation_id,
            record,
            error,
        }
    }

    /// Log and count a failure, returning it stamped with the request id.
    fn fail(&self, ctx: &RequestContext, e: ServiceError) -> ErrorPayload {
        match e.kind() {
            ErrorKind::Client => warn!(
                error_code = e.error_code(),
                error = %e,
                "{} rejected",
                ctx.operation
            ),
            ErrorKind::Internal => error!(
                error_code = e.error_code(),
                error = %e,
                "{} failed",
                ctx.operation
            ),
        }

        self.telemetry.count(ctx, Metric::for_error(e.kind()));
        e.to_payload(&ctx.request_id)
    }
}

/// Start a call and attach its ids to the current span.
fn begin(operation: Operation, correlation_id: Option<&str>) -> RequestContext {
    let ctx = RequestContext::new(operation, correlation_id);
    let span = Span::current();
    span.record("request_id", ctx.request_id.as_str());
    span.record("correlation_id", ctx.correlation_id.as_str());
    ctx
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
