// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the allocation engine.
//!
//! Every variant is produced by a check that runs before any mutation, so
//! the engine is always usable after an error is returned.

use std::fmt;

/// Errors returned by the [`Banker`](crate::Banker) entry points.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BankerError {
    /// A resource or process definition was rejected.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The named process has not been registered.
    #[error("unknown process '{0}'")]
    UnknownProcess(String),

    /// The amount vector has the wrong arity or a negative entry.
    #[error("malformed vector: {detail}")]
    MalformedVector { detail: String },

    /// The request asks for more units than are currently free.
    #[error("request for {requested} unit(s) of '{resource}' exceeds the {available} available")]
    ExceedsAvailable {
        resource: String,
        requested: u64,
        available: u64,
    },

    /// Granting the request would push the process past its declared claim.
    #[error(
        "process '{process}' would hold {would_hold} unit(s) of '{resource}', above its claim of {claim}"
    )]
    ExceedsClaim {
        process: String,
        resource: String,
        would_hold: u64,
        claim: u64,
    },

    /// The release returns more units than the process holds.
    #[error("process '{process}' cannot release {requested} unit(s) of '{resource}', it holds {held}")]
    ExceedsAllocation {
        process: String,
        resource: String,
        requested: u64,
        held: u64,
    },

    /// Granting the request would leave no safe completion order.
    #[error("request by '{0}' denied: granting it would leave the system in an unsafe state")]
    WouldDeadlock(String),
}

impl BankerError {
    /// Returns the field-less discriminant of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::UnknownProcess(_) => ErrorKind::UnknownProcess,
            Self::MalformedVector { .. } => ErrorKind::MalformedVector,
            Self::ExceedsAvailable { .. } => ErrorKind::ExceedsAvailable,
            Self::ExceedsClaim { .. } => ErrorKind::ExceedsClaim,
            Self::ExceedsAllocation { .. } => ErrorKind::ExceedsAllocation,
            Self::WouldDeadlock(_) => ErrorKind::WouldDeadlock,
        }
    }

    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedVector {
            detail: detail.into(),
        }
    }
}

/// Discriminant of [`BankerError`], used for tallying and for scenario
/// expectations.
///
/// Serialises in kebab-case (`"would-deadlock"`, `"exceeds-claim"`, ...).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    InvalidInput,
    UnknownProcess,
    MalformedVector,
    ExceedsAvailable,
    ExceedsClaim,
    ExceedsAllocation,
    WouldDeadlock,
}

impl ErrorKind {
    /// All kinds, in taxonomy order.
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::InvalidInput,
        ErrorKind::UnknownProcess,
        ErrorKind::MalformedVector,
        ErrorKind::ExceedsAvailable,
        ErrorKind::ExceedsClaim,
        ErrorKind::ExceedsAllocation,
        ErrorKind::WouldDeadlock,
    ];

    /// Returns the kebab-case name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid-input",
            Self::UnknownProcess => "unknown-process",
            Self::MalformedVector => "malformed-vector",
            Self::ExceedsAvailable => "exceeds-available",
            Self::ExceedsClaim => "exceeds-claim",
            Self::ExceedsAllocation => "exceeds-allocation",
            Self::WouldDeadlock => "would-deadlock",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
