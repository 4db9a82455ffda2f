// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Colour record model and classification rules.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// Classification assigned to every record at write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Colour {
    /// Only the red flag was set.
    Red,
    /// Only the blue flag was set.
    Blue,
    /// No colour flag was set.
    Black,
    /// Both colour flags were set.
    Purple,
}

impl Colour {
    /// Returns the stored/metric representation of the colour.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "RED",
            Self::Blue => "BLUE",
            Self::Black => "BLACK",
            Self::Purple => "PURPLE",
        }
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored colour string is not one of the four values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown colour '{0}'")]
pub struct ParseColourError(pub String);

impl FromStr for Colour {
    type Err = ParseColourError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RED" => Ok(Self::Red),
            "BLUE" => Ok(Self::Blue),
            "BLACK" => Ok(Self::Black),
            "PURPLE" => Ok(Self::Purple),
            other => Err(ParseColourError(other.to_string())),
        }
    }
}

impl TryFrom<String> for Colour {
    type Error = ParseColourError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The two independent colour flags supplied by a caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColourChoice {
    /// Caller wants the record to be red.
    #[serde(default)]
    pub wants_red: bool,
    /// Caller wants the record to be blue.
    #[serde(default)]
    pub wants_blue: bool,
}

impl ColourChoice {
    /// Create a choice from the two flags.
    pub fn new(wants_red: bool, wants_blue: bool) -> Self {
        Self {
            wants_red,
            wants_blue,
        }
    }

    /// Derive the colour for these flags. Always yields one of the four values.
    pub fn classify(&self) -> Colour {
        match (self.wants_red, self.wants_blue) {
            (false, false) => Colour::Black,
            (true, true) => Colour::Purple,
            (true, false) => Colour::Red,
            (false, true) => Colour::Blue,
        }
    }

    /// Classify and reject the combinations a caller has to fix.
    pub fn validate(&self) -> Result<Colour, ServiceError> {
        match self.classify() {
            Colour::Black => Err(ServiceError::MissingColour),
            Colour::Purple => Err(ServiceError::InvalidColour),
            colour => Ok(colour),
        }
    }
}

/// A persisted colour entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Service-assigned unique identifier, immutable once assigned.
    pub id: String,
    /// Classification computed at the last write.
    #[sqlx(try_from = "String")]
    pub colour: Colour,
    /// Tracking token grouping records of one batch.
    pub correlation_id: String,
    /// Time of the last write.
    pub updated_at: DateTime<Utc>,
    /// Absolute time after which the store may remove the record.
    pub expires_at: DateTime<Utc>,
}

impl Record {
    /// Build a record written at `now` that expires after `retention`.
    pub fn new(
        id: impl Into<String>,
        colour: Colour,
        correlation_id: impl Into<String>,
        now: DateTime<Utc>,
        retention: chrono::Duration,
    ) -> Self {
        Self {
            id: id.into(),
            colour,
            correlation_id: correlation_id.into(),
            updated_at: now,
            expires_at: now + retention,
        }
    }

    /// Whether the record is past its expiry at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Generate a fresh record id.
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
