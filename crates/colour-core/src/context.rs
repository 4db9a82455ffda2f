// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Per-call request context.

use std::fmt;

/// The four record service operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Create a record.
    Create,
    /// Rewrite an existing record.
    Update,
    /// Remove an existing record.
    Delete,
    /// List records.
    Read,
}

impl Operation {
    /// Lower-case operation name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Read => "read",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one operation call, threaded through logging and telemetry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Operation being served.
    pub operation: Operation,
    /// Unique id of this call.
    pub request_id: String,
    /// Grouping token; the request id when the caller supplied none.
    pub correlation_id: String,
}

impl RequestContext {
    /// Start a new call, assigning a fresh request id.
    pub fn new(operation: Operation, correlation_id: Option<&str>) -> Self {
        let request_id = uuid::Uuid::new_v4().to_string();
        let correlation_id = match correlation_id {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => request_id.clone(),
        };

        Self {
            operation,
            request_id,
            correlation_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_defaults_to_request_id() {
        let ctx = RequestContext::new(Operation::Create, None);
        assert_eq!(ctx.correlation_id, ctx.request_id);

        let ctx = RequestContext::new(Operation::Create, Some(""));
        assert_eq!(ctx.correlation_id, ctx.request_id);
    }

    #[test]
    fn test_supplied_correlation_is_kept() {
        let ctx = RequestContext::new(Operation::Read, Some("batch-7"));
        assert_eq!(ctx.correlation_id, "batch-7");
        assert_ne!(ctx.request_id, "batch-7");
        assert_eq!(ctx.operation.as_str(), "read");
    }

    #[test]
    fn test_request_ids_are_unique() {
        let a = RequestContext::new(Operation::Delete, None);
        let b = RequestContext::new(Operation::Delete, None);
        assert_ne!(a.request_id, b.request_id);
    }
}
