// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! A cloneable handle that serialises access to one [`Banker`].
//!
//! The engine is single-writer. Concurrent clients (stress tasks, a CLI
//! session) each hold a clone of [`SharedBanker`] and run every operation
//! under one lock, so a request's trial and commit are never interleaved
//! with another client's.

use banker::Banker;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Thread-safe handle to a shared engine.
///
/// # Example
/// ```
/// use simulator::SharedBanker;
///
/// let shared = SharedBanker::new();
/// let other = shared.clone();
/// shared.with(|b| b.define_resource("R", 4)).unwrap();
/// assert_eq!(other.with(|b| b.num_resources()), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedBanker {
    inner: Arc<Mutex<Banker>>,
}

impl SharedBanker {
    /// Wraps a fresh, empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing engine.
    pub fn from_banker(banker: Banker) -> Self {
        Self {
            inner: Arc::new(Mutex::new(banker)),
        }
    }

    /// Locks the engine.
    ///
    /// A panic in another holder cannot leave the engine half-updated
    /// (every mutation commits a complete snapshot), so a poisoned lock is
    /// recovered rather than propagated.
    pub fn lock(&self) -> MutexGuard<'_, Banker> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` with exclusive access to the engine.
    pub fn with<R>(&self, f: impl FnOnce(&mut Banker) -> R) -> R {
        let mut guard = self.lock();
        f(&mut *guard)
    }

    /// Returns a copy of the engine's current state.
    pub fn snapshot(&self) -> Banker {
        self.lock().clone()
    }
}
