// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # banker
//!
//! A deadlock-avoiding resource arbiter: named pools of interchangeable
//! units, shared by processes that declare their maximum claim upfront.
//! Every request is granted only if the system stays in a *safe* state,
//! one from which some completion order lets every process obtain its full
//! claim and finish.
//!
//! # Key Components
//!
//! - [`StateStore`]: resource and process registries plus the committed
//!   [`Snapshot`] (available vector, allocation and claim matrices).
//! - [`oracle`]: the Banker's safety check, a pure function from a
//!   snapshot to a [`SafetyVerdict`].
//! - [`Banker`]: the arbiter. Runs request preconditions, evaluates a
//!   scratch copy of the snapshot, and commits only safe trials.
//! - [`ArbiterStats`]: diagnostic counters (grants, denials by kind,
//!   safety checks, peak units held).
//!
//! # Transaction Model
//!
//! ```text
//! Banker::request(p, amounts)
//!       │
//!       ▼
//!   preconditions ──► Err(UnknownProcess | MalformedVector |
//!       │                 ExceedsAvailable | ExceedsClaim)
//!       ▼
//!   trial = snapshot.clone() + amounts
//!       │
//!       ▼
//!   oracle::check(&trial) ──unsafe──► Err(WouldDeadlock), trial dropped
//!       │ safe
//!       ▼
//!   StateStore::commit(trial)  ──► Ok(safe sequence)
//! ```
//!
//! Every failure is detected before the committed snapshot is touched, so
//! the engine stays consistent and usable after any error.
//!
//! # Example
//! ```
//! use banker::Banker;
//!
//! let mut banker = Banker::new();
//! banker.define_resource("R1", 10).unwrap();
//! banker.define_resource("R2", 5).unwrap();
//! banker.register_process("P1", &[7, 5]).unwrap();
//! banker.register_process("P2", &[3, 2]).unwrap();
//!
//! banker.request("P1", &[0, 2]).unwrap();
//! let sequence = banker.request("P2", &[2, 0]).unwrap();
//! assert_eq!(sequence.len(), 2);
//! assert!(banker.verdict().safe);
//! ```

mod arbiter;
mod error;
pub mod oracle;
mod stats;
mod store;
pub mod vector;
mod view;

pub use arbiter::{Banker, SafeSequence};
pub use error::{BankerError, ErrorKind};
pub use oracle::SafetyVerdict;
pub use stats::ArbiterStats;
pub use store::{ResourceType, Snapshot, StateStore};
pub use vector::Units;
pub use view::{ProcessView, ResourceView, Verdict};
