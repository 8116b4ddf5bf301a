// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram side of the Souq storefront.
//!
//! [`TelegramTransport`] implements [`BotTransport`] over the Bot API via
//! teloxide. On top of it sit the bot session and its handlers, the
//! [`Refresher`] that reloads configuration and swaps the bot identity when
//! the token changes, and the [`BotPoller`] that keeps the current session
//! receiving messages and retries forever after failures.

pub mod handler;
pub mod poller;
pub mod refresher;
pub mod session;

use async_trait::async_trait;
use souq_core::{BotTransport, ChatKey, IncomingMessage, SouqError, UpdateBatch};
use teloxide::prelude::*;
use teloxide::types::{MessageId, ReplyParameters, UpdateKind};
use tracing::debug;

pub use handler::{GREETING, HandlerContext, HandlerSet, register_default_handlers};
pub use poller::BotPoller;
pub use refresher::Refresher;
pub use session::{BotSession, SessionFactory, SessionSlot, TelegramSessionFactory};

/// Bot API transport bound to one token.
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    /// Creates a transport for `token`. No request is made until polling starts.
    pub fn new(token: &str) -> Result<Self, SouqError> {
        if token.is_empty() {
            return Err(SouqError::Config("bot token cannot be empty".into()));
        }
        Ok(Self {
            bot: Bot::new(token),
        })
    }
}

#[async_trait]
impl BotTransport for TelegramTransport {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn clear_webhook(&self) -> Result<(), SouqError> {
        self.bot
            .delete_webhook()
            .await
            .map_err(|e| transport_error("failed to remove webhook", e))?;
        Ok(())
    }

    async fn fetch_updates(
        &self,
        offset: i32,
        timeout_secs: u32,
    ) -> Result<UpdateBatch, SouqError> {
        let updates = self
            .bot
            .get_updates()
            .offset(offset)
            .timeout(timeout_secs)
            .await
            .map_err(|e| transport_error("failed to fetch updates", e))?;

        let next_offset = updates.iter().map(|u| u.id.as_offset()).max();
        let messages = updates
            .into_iter()
            .filter_map(|update| match update.kind {
                UpdateKind::Message(msg) => Some(to_incoming(update.id.as_offset() - 1, &msg)),
                _ => {
                    debug!(update_id = update.id.0, "skipping non-message update");
                    None
                }
            })
            .collect();

        Ok(UpdateBatch {
            next_offset,
            messages,
        })
    }

    async fn reply(&self, msg: &IncomingMessage, text: &str) -> Result<(), SouqError> {
        self.bot
            .send_message(ChatId(msg.chat.0), text)
            .reply_parameters(ReplyParameters::new(MessageId(msg.message_id)))
            .await
            .map_err(|e| transport_error("failed to send reply", e))?;
        Ok(())
    }
}

fn transport_error(context: &str, err: teloxide::RequestError) -> SouqError {
    SouqError::Transport {
        message: format!("{context}: {err}"),
        source: Some(Box::new(err)),
    }
}

/// Converts a teloxide message into the transport-neutral form.
fn to_incoming(update_id: i32, msg: &Message) -> IncomingMessage {
    IncomingMessage {
        update_id,
        chat: ChatKey(msg.chat.id.0),
        message_id: msg.id.0,
        sender: msg
            .from
            .as_ref()
            .map(|u| u.username.clone().unwrap_or_else(|| u.id.0.to_string())),
        text: msg.text().map(str::to_string),
        has_photo: msg.photo().is_some(),
    }
}
