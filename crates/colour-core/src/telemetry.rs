// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Metric sink used by the record service.
//!
//! The service counts one classification metric per write and one
//! `WARNING`/`ERROR` metric per failed operation. Where those counts end up is
//! decided by the [`TelemetrySink`] handed to the service.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::info;

use crate::context::RequestContext;
use crate::error::ErrorKind;
use crate::record::Colour;

/// A counted metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// A write classified the record with this colour.
    Colour(Colour),
    /// An operation ended in a client error.
    Warning,
    /// An operation ended in an internal error.
    Error,
}

impl Metric {
    /// Metric name as emitted.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Colour(colour) => colour.as_str(),
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    /// The failure metric for an error kind.
    pub fn for_error(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Client => Self::Warning,
            ErrorKind::Internal => Self::Error,
        }
    }
}

/// Destination for counted metrics.
pub trait TelemetrySink: Send + Sync {
    /// Count one occurrence of `metric` for the call described by `ctx`.
    fn count(&self, ctx: &RequestContext, metric: Metric);
}

/// Emits every count as a structured `tracing` event on the `colour_metrics`
/// target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn count(&self, ctx: &RequestContext, metric: Metric) {
        info!(
            target: "colour_metrics",
            metric = metric.name(),
            value = 1u64,
            operation = %ctx.operation,
            request_id = %ctx.request_id,
            correlation_id = %ctx.correlation_id,
            "metric"
        );
    }
}

/// One count captured by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedMetric {
    /// Metric name.
    pub name: &'static str,
    /// Correlation token of the call.
    pub correlation_id: String,
    /// Request id of the call.
    pub request_id: String,
}

/// In-memory sink that keeps every count. Used by tests and demos.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<RecordedMetric>>,
}

impl RecordingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All counts in emission order.
    pub fn events(&self) -> Vec<RecordedMetric> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Total count per metric name.
    pub fn totals(&self) -> HashMap<&'static str, u64> {
        let mut totals = HashMap::new();
        for event in self.events() {
            *totals.entry(event.name).or_insert(0) += 1;
        }
        totals
    }

    /// Total for one metric.
    pub fn total(&self, metric: Metric) -> u64 {
        self.totals().get(metric.name()).copied().unwrap_or(0)
    }
}

impl TelemetrySink for RecordingSink {
    fn count(&self, ctx: &RequestContext, metric: Metric) {
        if let Ok(mut events) = self.events.lock() {
            events.push(RecordedMetric {
                name: metric.name(),
                correlation_id: ctx.correlation_id.clone(),
                request_id: ctx.request_id.clone(),
            });
        }
    }
}
