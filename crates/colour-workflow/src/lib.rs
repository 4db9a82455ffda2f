// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Colour Workflow - synthetic traffic driver for the colour record service.
//!
//! This crate runs a bounded state machine that creates, updates, deletes
//! and finally reads colour records under a single correlation token, with
//! randomized colour flags and randomized failure injection. It exists to
//! produce a representative trace of successes and failures.
//!
//! # Features
//!
//! - **Bounded runs**: a fixed number of iterations, then one read of the batch
//! - **Recoverable failures**: a failed update triggers a delete and the run goes on
//! - **Injectable chaos**: randomness comes from a [`ChaosSource`], so tests can
//!   force every branch
//! - **Timeouts**: a per-call ceiling and a whole-run ceiling
//! - **Two backends**: in-process ([`EmbeddedBackend`]) or HTTP ([`HttpBackend`],
//!   feature `http`)
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use colour_workflow::{DriverConfig, EmbeddedBackend, RandomChaos, WorkflowDriver};
//!
//! #[tokio::main]
//! async fn main() -> colour_workflow::Result<()> {
//!     let driver = WorkflowDriver::new(
//!         Arc::new(EmbeddedBackend::in_memory()),
//!         Arc::new(RandomChaos::default()),
//!         DriverConfig::default(),
//!     );
//!
//!     let outcome = driver.run(20).await?;
//!     println!("{:?}", outcome.status);
//!     Ok(())
//! }
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `COLOUR_WORKFLOW_ITERATIONS` | 20 | iterations per run |
//! | `COLOUR_WORKFLOW_TIMEOUT_SECS` | 900 | run ceiling |
//! | `COLOUR_CALL_TIMEOUT_MS` | 10000 | per-call ceiling |
//! | `COLOUR_FAILURE_RATE` | 0.1 | simulated failure probability |
//! | `COLOUR_API_URL` | unset | colour-core base URL; unset runs embedded |

#![deny(missing_docs)]

pub mod backend;
pub mod chaos;
pub mod config;
pub mod driver;
mod error;

pub use backend::{EmbeddedBackend, RecordApi};
#[cfg(feature = "http")]
pub use backend::HttpBackend;
pub use chaos::{ChaosSource, FixedChaos, RandomChaos};
pub use config::DriverConfig;
pub use driver::{RunOutcome, RunState, RunStats, RunStatus, WorkflowDriver, WorkflowState};
pub use error::{Result, WorkflowError};
