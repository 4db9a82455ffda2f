// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Colour Core - Colour Record Service
//!
//! This crate validates, classifies and persists colour records. Every write
//! derives a colour from two flags, declares an existence precondition to the
//! store, and reports a structured outcome tagged with a correlation token.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         External Callers                                 │
//! │                (colour-workflow driver, HTTP clients)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//!                                    │
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        HTTP boundary (axum)                              │
//! │                   /items, /items/{id}, /health                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//!                                    │
//!                                    ▼
//! ┌───────────────────────┐                    ┌─────────────────────────────┐
//! │    RecordService      │───────────────────►│      TelemetrySink          │
//! │  classify / validate  │  colour, WARNING,  │  (tracing events, recorder) │
//! │  conditional writes   │  ERROR counts      │                             │
//! └───────────────────────┘                    └─────────────────────────────┘
//!           │
//!           ▼
//! ┌───────────────────────┐        ┌───────────────────────┐
//! │     RecordStore       │◄───────│    ExpirySweeper      │
//! │  (memory / SQLite)    │ purge  │                       │
//! └───────────────────────┘        └───────────────────────┘
//! ```
//!
//! # Operations
//!
//! | Operation | Required | Precondition | Success payload |
//! |-----------|----------|--------------|-----------------|
//! | `create` | - | `RequireAbsent` | `{id, correlationId, colour}` |
//! | `update` | `id` | `RequireExists` | `{id, correlationId, colour}` |
//! | `delete` | `id` | record exists | `{correlationId}` |
//! | `read` | - | - | `{count, records}` |
//!
//! ## Colour classification
//!
//! | `wantsRed` | `wantsBlue` | Colour | Outcome |
//! |------------|-------------|--------|---------|
//! | false | false | `BLACK` | client error, "missing colour choice" |
//! | false | true | `BLUE` | success |
//! | true | false | `RED` | success |
//! | true | true | `PURPLE` | client error, "invalid colour choices" |
//!
//! A rejected colour is still written under the usual existence
//! precondition, so an update to an unknown id reports "<id> does not exist"
//! whatever the flags.
//!
//! ## Error classes
//!
//! | Kind | Status | Log level | Metric |
//! |------|--------|-----------|--------|
//! | Client | 400 | `warn` | `WARNING` |
//! | Internal | 500 | `error` | `ERROR` |
//!
//! An update or delete against an absent id is a client error. Injected
//! failures (`simulateFailure`) and unexpected store failures are internal.
//!
//! # Storage
//!
//! The store is the only shared state. Consistency between concurrent calls
//! comes from the [`WritePrecondition`](persistence::WritePrecondition)
//! declared on each write; the service itself takes no locks.
//!
//! | Backend | Use |
//! |---------|-----|
//! | [`MemoryStore`](persistence::MemoryStore) | default, tests, demos |
//! | [`SqliteStore`](persistence::SqliteStore) | `COLOUR_DATABASE_URL` set |
//!
//! # Configuration
//!
//! See [`config::Config`] and [`expiry::ExpirySweeperConfig`].

#![deny(missing_docs)]

/// Request and response types, also used as wire shapes.
pub mod api;

/// Service configuration loaded from environment variables.
pub mod config;

/// Per-call request context (operation, request id, correlation token).
pub mod context;

/// Error taxonomy and the caller-facing error payload.
pub mod error;

/// Background removal of expired records.
pub mod expiry;

/// Record store interface with in-memory and SQLite backends.
pub mod persistence;

/// Record model and colour classification.
pub mod record;

/// The record service operations.
pub mod service;

/// Metric counting through an injected sink.
pub mod telemetry;

/// HTTP boundary (axum router and server).
#[cfg(feature = "server")]
pub mod server;

pub use api::{
    CreateRequest, DeleteRequest, DeleteResponse, ReadRequest, ReadResponse, UpdateRequest,
    WriteOutcome, WriteResponse,
};
pub use error::{ErrorKind, ErrorPayload, Outcome, ServiceError};
pub use record::{Colour, ColourChoice, Record};
pub use service::RecordService;
