// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bot transport trait for pull-mode messaging backends (Telegram).

use async_trait::async_trait;

use crate::error::SouqError;
use crate::types::{IncomingMessage, UpdateBatch};

/// A messaging backend bound to one credential.
///
/// Implementations only move bytes; command routing lives in the handler
/// set owned by the session.
#[async_trait]
pub trait BotTransport: Send + Sync + 'static {
    /// Returns the human-readable name of this transport.
    fn name(&self) -> &str;

    /// Removes any registered webhook so updates are delivered by polling only.
    async fn clear_webhook(&self) -> Result<(), SouqError>;

    /// Long-polls for updates with `update_id >= offset`.
    ///
    /// Blocks up to `timeout_secs` when no update is pending.
    async fn fetch_updates(
        &self,
        offset: i32,
        timeout_secs: u32,
    ) -> Result<UpdateBatch, SouqError>;

    /// Sends `text` as a reply to `msg` in the same chat.
    async fn reply(&self, msg: &IncomingMessage, text: &str) -> Result<(), SouqError>;
}
