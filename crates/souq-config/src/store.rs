// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide configuration snapshot cell.

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::model::StorefrontConfig;

/// Single-writer, multi-reader holder of the current [`StorefrontConfig`].
///
/// Readers get an `Arc` to a complete snapshot and keep it for as long as
/// they need; a concurrent [`replace`](Self::replace) never tears it.
/// Cloning the store clones the handle, not the snapshot.
#[derive(Clone)]
pub struct ConfigStore {
    inner: Arc<ArcSwapOption<StorefrontConfig>>,
}

impl ConfigStore {
    /// Creates an empty store (no configuration loaded yet).
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ArcSwapOption::empty()),
        }
    }

    /// Returns the current snapshot, if any load has succeeded.
    pub fn current(&self) -> Option<Arc<StorefrontConfig>> {
        self.inner.load_full()
    }

    /// Publishes `next` and returns the snapshot it superseded.
    pub fn replace(&self, next: Arc<StorefrontConfig>) -> Option<Arc<StorefrontConfig>> {
        self.inner.swap(Some(next))
    }

    pub fn is_configured(&self) -> bool {
        self.inner.load().is_some()
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("current", &self.current())
            .finish()
    }
}
