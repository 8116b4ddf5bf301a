// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session factory backed by [`MockTransport`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use souq_config::{ConfigStore, StorefrontConfig};
use souq_core::SouqError;
use souq_storage::PendingUploads;
use souq_telegram::{BotSession, HandlerSet, SessionFactory, register_default_handlers};

use crate::mock_transport::MockTransport;

/// Builds sessions with the default handlers over fresh mock transports
/// and remembers every transport it handed out.
pub struct CountingFactory {
    store: ConfigStore,
    uploads: PendingUploads,
    timeout_secs: u32,
    failing: AtomicBool,
    built: Mutex<Vec<Arc<MockTransport>>>,
}

impl CountingFactory {
    pub fn new(store: ConfigStore, uploads: PendingUploads) -> Self {
        Self {
            store,
            uploads,
            timeout_secs: 1,
            failing: AtomicBool::new(false),
            built: Mutex::new(Vec::new()),
        }
    }

    /// While set, every build fails with a transport error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of sessions built so far.
    pub fn builds(&self) -> usize {
        self.lock().len()
    }

    /// Transport of the `index`-th built session.
    pub fn transport(&self, index: usize) -> Option<Arc<MockTransport>> {
        self.lock().get(index).cloned()
    }

    /// Transport of the most recently built session.
    pub fn last(&self) -> Option<Arc<MockTransport>> {
        self.lock().last().cloned()
    }

    /// Tokens of every built session, in build order.
    pub fn tokens(&self) -> Vec<String> {
        self.lock().iter().map(|t| t.token().to_string()).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Arc<MockTransport>>> {
        self.built.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionFactory for CountingFactory {
    fn build(&self, config: &StorefrontConfig) -> Result<BotSession, SouqError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SouqError::transport("session build refused"));
        }
        let transport = Arc::new(MockTransport::new(config.bot_token()));
        let mut handlers = HandlerSet::new();
        register_default_handlers(&mut handlers);
        self.lock().push(transport.clone());
        Ok(BotSession::new(
            config.bot_token(),
            transport,
            handlers,
            self.store.clone(),
            self.uploads.clone(),
            self.timeout_secs,
        ))
    }
}
