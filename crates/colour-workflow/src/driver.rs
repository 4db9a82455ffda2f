// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Synthetic workflow driver.
//!
//! A bounded state machine that pushes one batch of create/update/delete
//! traffic through a [`RecordApi`] and finishes with a read of the batch:
//!
//! ```text
//! Start ─► Create ─ok─► Update ─ok──────────► ReduceCount ─► CountCheck ─0─► Read ─► Succeeded
//!            │            │                      ▲              │                 └─► Failed
//!            │            └─fail─► Delete ───────┤              └─>0─► Create
//!            └─fail──────────────────────────────┘
//! ```
//!
//! Create and update failures never abort the run; only the final read can.
//! Steps run strictly one after another.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use colour_core::api::{CreateRequest, DeleteRequest, ReadRequest, UpdateRequest};
use colour_core::error::ErrorPayload;
use serde::Serialize;
use tracing::{Span, debug, error, field, info, instrument, warn};
use uuid::Uuid;

use crate::backend::RecordApi;
use crate::chaos::ChaosSource;
use crate::config::DriverConfig;
use crate::error::{Result, WorkflowError};

/// States of the workflow state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    /// Nothing has run yet.
    Start,
    /// Create a record with randomized flags.
    Create,
    /// Recolour the record just created.
    Update,
    /// Remove the record whose update failed.
    Delete,
    /// One iteration is done.
    ReduceCount,
    /// Loop or finish.
    CountCheck,
    /// Read back the whole batch.
    Read,
    /// Terminal: the final read succeeded.
    Succeeded {
        /// Records the final read returned.
        records_read: usize,
    },
    /// Terminal: the final read failed.
    Failed {
        /// Packed error payload of the failed read.
        reason: String,
    },
}

impl WorkflowState {
    /// Whether the run is over.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }

    /// Short state name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::ReduceCount => "reduce_count",
            Self::CountCheck => "count_check",
            Self::Read => "read",
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mutable state of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    /// Identifier of this run.
    pub run_id: String,
    /// Correlation token attached to every call, equal to the run id.
    pub correlation_id: String,
    /// Iterations still to go; only ever decreases.
    pub remaining_iterations: u32,
    /// Id of the most recently created record, if any.
    pub last_created_id: Option<String>,
}

impl RunState {
    /// Fresh state for a run of `iterations` iterations.
    pub fn new(run_id: impl Into<String>, iterations: u32) -> Self {
        let run_id = run_id.into();
        Self {
            correlation_id: run_id.clone(),
            run_id,
            remaining_iterations: iterations,
            last_created_id: None,
        }
    }
}

/// Counters collected over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    /// Iterations completed.
    pub iterations: u32,
    /// Create calls issued.
    pub creates: u32,
    /// Create calls that failed.
    pub create_failures: u32,
    /// Update calls issued.
    pub updates: u32,
    /// Update calls that failed.
    pub update_failures: u32,
    /// Delete calls issued.
    pub deletes: u32,
    /// Delete calls that failed.
    pub delete_failures: u32,
    /// Read calls issued.
    pub reads: u32,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunStatus {
    /// The final read succeeded.
    Succeeded,
    /// The final read failed.
    Failed {
        /// Packed error payload of the failed read.
        reason: String,
    },
    /// The run hit its wall-clock ceiling.
    TimedOut,
}

/// Result of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    /// Identifier of the run.
    pub run_id: String,
    /// Correlation token used for every call.
    pub correlation_id: String,
    /// How the run ended.
    pub status: RunStatus,
    /// Counters.
    pub stats: RunStats,
    /// Records returned by the final read (0 unless it succeeded).
    pub records_read: usize,
}

impl RunOutcome {
    /// Whether the run succeeded.
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Succeeded
    }
}

/// Drives synthetic traffic through a [`RecordApi`].
pub struct WorkflowDriver {
    api: Arc<dyn RecordApi>,
    chaos: Arc<dyn ChaosSource>,
    config: DriverConfig,
}

struct Progress {
    state: WorkflowState,
    run: RunState,
    stats: RunStats,
}

impl WorkflowDriver {
    /// Create a driver.
    pub fn new(
        api: Arc<dyn RecordApi>,
        chaos: Arc<dyn ChaosSource>,
        config: DriverConfig,
    ) -> Self {
        Self { api, chaos, config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Run one batch of `iterations` iterations.
    ///
    /// Only a zero iteration count is an error; every other way a run can end
    /// is reported through [`RunOutcome::status`].
    #[instrument(
        skip(self),
        fields(run_id = field::Empty, correlation_id = field::Empty)
    )]
    pub async fn run(&self, iterations: u32) -> Result<RunOutcome> {
        if iterations == 0 {
            return Err(WorkflowError::InvalidIterations(iterations));
        }

        let run = RunState::new(Uuid::new_v4().to_string(), iterations);
        let span = Span::current();
        span.record("run_id", run.run_id.as_str());
        span.record("correlation_id", run.correlation_id.as_str());

        info!(
            iterations = iterations,
            run_timeout_secs = self.config.run_timeout.as_secs(),
            "Workflow run started"
        );

        let mut progress = Progress {
            state: WorkflowState::Start,
            run,
            stats: RunStats::default(),
        };

        let finished =
            tokio::time::timeout(self.config.run_timeout, self.drive(&mut progress)).await;

        let (status, records_read) = match (finished, &progress.state) {
            (Ok(()), WorkflowState::Succeeded { records_read }) => {
                (RunStatus::Succeeded, *records_read)
            }
            (Ok(()), WorkflowState::Failed { reason }) => (
                RunStatus::Failed {
                    reason: reason.clone(),
                },
                0,
            ),
            (Ok(()), state) => (
                RunStatus::Failed {
                    reason: format!("run stopped in non-terminal state {}", state),
                },
                0,
            ),
            (Err(_), _) => (RunStatus::TimedOut, 0),
        };

        let outcome = RunOutcome {
            run_id: progress.run.run_id,
            correlation_id: progress.run.correlation_id,
            status,
            stats: progress.stats,
            records_read,
        };

        match &outcome.status {
            RunStatus::Succeeded => info!(
                records_read = outcome.records_read,
                iterations = outcome.stats.iterations,
                "Workflow run succeeded"
            ),
            RunStatus::Failed { reason } => error!(
                reason = %reason,
                iterations = outcome.stats.iterations,
                "Workflow run failed"
            ),
            RunStatus::TimedOut => error!(
                last_state = %progress.state,
                iterations = outcome.stats.iterations,
                "Workflow run timed out"
            ),
        }

        Ok(outcome)
    }

    async fn drive(&self, progress: &mut Progress) {
        while !progress.state.is_terminal() {
            let next = self
                .step(&progress.state, &mut progress.run, &mut progress.stats)
                .await;
            debug!(
                from = %progress.state,
                to = %next,
                remaining_iterations = progress.run.remaining_iterations,
                "Workflow transition"
            );
            progress.state = next;
        }
    }

    /// Execute one state and return the next one.
    ///
    /// Terminal states return themselves.
    pub async fn step(
        &self,
        state: &WorkflowState,
        run: &mut RunState,
        stats: &mut RunStats,
    ) -> WorkflowState {
        match state {
            WorkflowState::Start => {
                run.last_created_id = None;
                WorkflowState::Create
            }

            WorkflowState::Create => {
                stats.creates += 1;
                let request = CreateRequest::new(self.chaos.colour_choice())
                    .with_correlation_id(&run.correlation_id)
                    .with_simulated_failure(self.chaos.simulate_failure());

                match self.call("create", self.api.create(request)).await {
                    Ok(created) => {
                        run.last_created_id = Some(created.id);
                        WorkflowState::Update
                    }
                    Err(e) => {
                        stats.create_failures += 1;
                        warn!(error = %e, "Create failed, skipping update");
                        WorkflowState::ReduceCount
                    }
                }
            }

            WorkflowState::Update => {
                let Some(id) = run.last_created_id.clone() else {
                    warn!("Update reached without a created record");
                    return WorkflowState::ReduceCount;
                };

                stats.updates += 1;
                let request = UpdateRequest::new(id, self.chaos.colour_choice())
                    .with_correlation_id(&run.correlation_id)
                    .with_simulated_failure(self.chaos.simulate_failure());

                match self.call("update", self.api.update(request)).await {
                    Ok(_) => WorkflowState::ReduceCount,
                    Err(e) => {
                        stats.update_failures += 1;
                        warn!(error = %e, "Update failed, deleting record");
                        WorkflowState::Delete
                    }
                }
            }

            WorkflowState::Delete => {
                let Some(id) = run.last_created_id.clone() else {
                    warn!("Delete reached without a created record");
                    return WorkflowState::ReduceCount;
                };

                stats.deletes += 1;
                let request = DeleteRequest::new(id)
                    .with_correlation_id(&run.correlation_id)
                    .with_simulated_failure(self.chaos.simulate_failure());

                if let Err(e) = self.call("delete", self.api.delete(request)).await {
                    stats.delete_failures += 1;
                    warn!(error = %e, "Delete failed, continuing");
                }
                WorkflowState::ReduceCount
            }

            WorkflowState::ReduceCount => {
                run.remaining_iterations = run.remaining_iterations.saturating_sub(1);
                stats.iterations += 1;
                WorkflowState::CountCheck
            }

            WorkflowState::CountCheck => {
                if run.remaining_iterations > 0 {
                    WorkflowState::Create
                } else {
                    WorkflowState::Read
                }
            }

            WorkflowState::Read => {
                stats.reads += 1;
                let request = ReadRequest::by_correlation(&run.correlation_id);

                match self.call("read", self.api.read(request)).await {
                    Ok(response) => WorkflowState::Succeeded {
                        records_read: response.count,
                    },
                    Err(e) => WorkflowState::Failed {
                        reason: e.to_string(),
                    },
                }
            }

            terminal @ (WorkflowState::Succeeded { .. } | WorkflowState::Failed { .. }) => {
                terminal.clone()
            }
        }
    }

    /// Await a call under the per-call timeout. A timeout is an internal
    /// failure.
    async fn call<T, F>(&self, operation: &str, call: F) -> std::result::Result<T, ErrorPayload>
    where
        F: Future<Output = std::result::Result<T, ErrorPayload>>,
    {
        match tokio::time::timeout(self.config.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ErrorPayload::internal(format!(
                "{} timed out after {}ms",
                operation,
                self.config.call_timeout.as_millis()
            ))),
        }
    }
}
