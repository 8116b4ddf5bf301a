// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bot sessions: one credential, one transport, one handler set.

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};

use arc_swap::ArcSwapOption;
use souq_config::{ConfigStore, StorefrontConfig};
use souq_core::{BotTransport, IncomingMessage, LoopExit, SouqError};
use souq_storage::PendingUploads;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::TelegramTransport;
use crate::handler::{Dispatched, HandlerContext, HandlerSet, register_default_handlers};

static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(1);

/// A bot bound to one credential.
///
/// Sessions are immutable once built. A token change produces a new
/// session with a new identity number and a fresh handler set.
pub struct BotSession {
    identity: u64,
    token: String,
    timeout_secs: u32,
    /// Next update id to request. Survives failed runs so a retry does not
    /// re-dispatch updates that were already handled.
    offset: AtomicI32,
    handlers: HandlerSet,
    ctx: HandlerContext,
}

impl BotSession {
    pub fn new(
        token: impl Into<String>,
        transport: Arc<dyn BotTransport>,
        handlers: HandlerSet,
        config: ConfigStore,
        uploads: PendingUploads,
        timeout_secs: u32,
    ) -> Self {
        Self {
            identity: NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed),
            token: token.into(),
            timeout_secs,
            offset: AtomicI32::new(0),
            handlers,
            ctx: HandlerContext {
                config,
                uploads,
                transport,
            },
        }
    }

    /// Process-unique number of this session.
    pub fn identity(&self) -> u64 {
        self.identity
    }

    /// Whether this session was built for the token in `config`.
    pub fn serves(&self, config: &StorefrontConfig) -> bool {
        self.token == config.bot_token()
    }

    /// Masked token, for status pages and logs.
    pub fn masked_token(&self) -> String {
        souq_config::mask_token(&self.token)
    }

    /// The offset the next poll will acknowledge up to.
    pub fn offset(&self) -> i32 {
        self.offset.load(Ordering::SeqCst)
    }

    pub fn handlers(&self) -> &HandlerSet {
        &self.handlers
    }

    pub fn transport(&self) -> &Arc<dyn BotTransport> {
        &self.ctx.transport
    }

    /// Dispatches one message. Handler errors are logged, not returned.
    pub async fn handle(&self, msg: IncomingMessage) -> Option<Dispatched> {
        let chat = msg.chat;
        match self.handlers.dispatch(self.ctx.clone(), msg).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!(identity = self.identity, %chat, error = %e, "message handler failed");
                None
            }
        }
    }

    /// Runs the receive loop until cancelled, superseded, or failed.
    ///
    /// Clears any webhook first so updates arrive by polling only. The slot
    /// is checked between polls; once another session is current this one
    /// returns [`LoopExit::Superseded`].
    pub async fn run(
        &self,
        slot: &SessionSlot,
        cancel: &CancellationToken,
    ) -> Result<LoopExit, SouqError> {
        tokio::select! {
            _ = cancel.cancelled() => return Ok(LoopExit::Stopped),
            res = self.ctx.transport.clear_webhook() => res?,
        }
        info!(
            identity = self.identity,
            transport = self.ctx.transport.name(),
            "bot is polling"
        );

        loop {
            if cancel.is_cancelled() {
                return Ok(LoopExit::Stopped);
            }
            if !slot.is_current(self) {
                debug!(identity = self.identity, "session superseded");
                return Ok(LoopExit::Superseded);
            }

            let batch = tokio::select! {
                _ = cancel.cancelled() => return Ok(LoopExit::Stopped),
                res = self.ctx.transport.fetch_updates(self.offset(), self.timeout_secs) => res?,
            };

            // Acknowledged before dispatch: a batch is handled at most once.
            if let Some(next) = batch.next_offset {
                self.offset.fetch_max(next, Ordering::SeqCst);
            }
            for msg in batch.messages {
                self.handle(msg).await;
            }
        }
    }
}

impl std::fmt::Debug for BotSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotSession")
            .field("identity", &self.identity)
            .field("transport", &self.ctx.transport.name())
            .field("handlers", &self.handlers)
            .finish()
    }
}

/// The currently active session, shared by the refresher and the poller.
#[derive(Clone, Default)]
pub struct SessionSlot {
    inner: Arc<ArcSwapOption<BotSession>>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Arc<BotSession>> {
        self.inner.load_full()
    }

    /// Makes `session` current and returns the one it replaced.
    pub fn publish(&self, session: Arc<BotSession>) -> Option<Arc<BotSession>> {
        self.inner.swap(Some(session))
    }

    pub fn is_current(&self, session: &BotSession) -> bool {
        self.inner
            .load()
            .as_ref()
            .is_some_and(|current| current.identity == session.identity)
    }

    pub fn is_active(&self) -> bool {
        self.inner.load().is_some()
    }
}

impl std::fmt::Debug for SessionSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let identity = self.inner.load().as_ref().map(|s| s.identity);
        f.debug_struct("SessionSlot")
            .field("identity", &identity)
            .finish()
    }
}

/// Builds a session for a configuration snapshot.
pub trait SessionFactory: Send + Sync {
    fn build(&self, config: &StorefrontConfig) -> Result<BotSession, SouqError>;
}

/// Production factory: a teloxide-backed transport with the default handlers.
#[derive(Debug, Clone)]
pub struct TelegramSessionFactory {
    store: ConfigStore,
    uploads: PendingUploads,
    timeout_secs: u32,
}

impl TelegramSessionFactory {
    pub fn new(store: ConfigStore, uploads: PendingUploads, timeout_secs: u32) -> Self {
        Self {
            store,
            uploads,
            timeout_secs,
        }
    }
}

impl SessionFactory for TelegramSessionFactory {
    fn build(&self, config: &StorefrontConfig) -> Result<BotSession, SouqError> {
        let transport = TelegramTransport::new(config.bot_token())?;
        let mut handlers = HandlerSet::new();
        register_default_handlers(&mut handlers);
        Ok(BotSession::new(
            config.bot_token(),
            Arc::new(transport),
            handlers,
            self.store.clone(),
            self.uploads.clone(),
            self.timeout_secs,
        ))
    }
}
