// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message handlers and their registration table.
//!
//! Every [`BotSession`](crate::session::BotSession) owns its own
//! [`HandlerSet`]. Swapping the bot identity builds a fresh set, so handlers
//! registered on a discarded session are never reachable from the new one.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use souq_config::ConfigStore;
use souq_core::{BotTransport, IncomingMessage, SouqError};
use souq_storage::PendingUploads;
use tracing::debug;

/// Reply to `/start`.
pub const GREETING: &str = "مرحباً بك في نظام المتجر المحدث تلقائياً!";

/// Shared state handed to every handler call.
///
/// The configuration is read through the store at call time, so a handler
/// always sees the latest snapshot.
#[derive(Clone)]
pub struct HandlerContext {
    pub config: ConfigStore,
    pub uploads: PendingUploads,
    pub transport: Arc<dyn BotTransport>,
}

pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<(), SouqError>> + Send>>;

type Handler = Arc<dyn Fn(HandlerContext, IncomingMessage) -> HandlerFuture + Send + Sync>;

/// Which handler, if any, took a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    Command(String),
    Fallback,
    Unhandled,
}

/// Command handlers plus an optional catch-all.
///
/// A message whose command has a registered handler goes there; every
/// other message (plain text, photos, unknown commands) goes to the
/// catch-all.
#[derive(Default)]
pub struct HandlerSet {
    commands: HashMap<String, Handler>,
    fallback: Option<Handler>,
}

impl HandlerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `/name`. A later registration for the same
    /// name replaces the earlier one.
    pub fn on_command<F, Fut>(&mut self, name: &str, handler: F) -> &mut Self
    where
        F: Fn(HandlerContext, IncomingMessage) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), SouqError>> + Send + 'static,
    {
        let name = name.trim_start_matches('/').to_string();
        self.commands.insert(name, boxed(handler));
        self
    }

    /// Registers the catch-all handler.
    pub fn on_any<F, Fut>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(HandlerContext, IncomingMessage) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), SouqError>> + Send + 'static,
    {
        self.fallback = Some(boxed(handler));
        self
    }

    pub fn has_command(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Sorted names of the registered commands.
    pub fn command_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Routes `msg` to the matching handler and awaits it.
    pub async fn dispatch(
        &self,
        ctx: HandlerContext,
        msg: IncomingMessage,
    ) -> Result<Dispatched, SouqError> {
        let route = msg
            .command()
            .and_then(|name| self.commands.get_key_value(name))
            .map(|(name, handler)| (name.clone(), Arc::clone(handler)));

        if let Some((name, handler)) = route {
            handler(ctx, msg).await?;
            return Ok(Dispatched::Command(name));
        }

        match &self.fallback {
            Some(handler) => {
                handler(ctx, msg).await?;
                Ok(Dispatched::Fallback)
            }
            None => Ok(Dispatched::Unhandled),
        }
    }
}

fn boxed<F, Fut>(handler: F) -> Handler
where
    F: Fn(HandlerContext, IncomingMessage) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), SouqError>> + Send + 'static,
{
    Arc::new(move |ctx: HandlerContext, msg: IncomingMessage| -> HandlerFuture {
        Box::pin(handler(ctx, msg))
    })
}

impl std::fmt::Debug for HandlerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerSet")
            .field("commands", &self.command_names())
            .field("fallback", &self.has_fallback())
            .finish()
    }
}

/// Registers the storefront's standard handlers on `set`.
pub fn register_default_handlers(set: &mut HandlerSet) {
    set.on_command("start", send_welcome).on_any(ignore_message);
}

async fn send_welcome(ctx: HandlerContext, msg: IncomingMessage) -> Result<(), SouqError> {
    ctx.transport.reply(&msg, GREETING).await
}

// Catch-all. Regular messages are accepted and dropped for now.
async fn ignore_message(_ctx: HandlerContext, msg: IncomingMessage) -> Result<(), SouqError> {
    debug!(chat = %msg.chat, message_id = msg.message_id, "message accepted without reply");
    Ok(())
}
