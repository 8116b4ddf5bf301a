// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types passed between the bot transport, handlers, and storage.

use serde::{Deserialize, Serialize};

/// Identifies one bot conversation (the Telegram chat id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatKey(pub i64);

impl std::fmt::Display for ChatKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message pulled from the messaging backend.
///
/// `update_id` is the backend's monotonically increasing update counter; the
/// receive loop acknowledges an update by polling with `update_id + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub update_id: i32,
    pub chat: ChatKey,
    pub message_id: i32,
    pub sender: Option<String>,
    pub text: Option<String>,
    pub has_photo: bool,
}

impl IncomingMessage {
    /// Builds a plain text message. Mostly useful for tests and mocks.
    pub fn text(update_id: i32, chat: i64, text: impl Into<String>) -> Self {
        Self {
            update_id,
            chat: ChatKey(chat),
            message_id: update_id,
            sender: None,
            text: Some(text.into()),
            has_photo: false,
        }
    }

    /// Returns the bot command name if the text starts with `/`.
    ///
    /// `/start`, `/start@shop_bot` and `/start payload` all yield `start`.
    pub fn command(&self) -> Option<&str> {
        let text = self.text.as_deref()?.trim_start();
        let rest = text.strip_prefix('/')?;
        let word = rest.split_whitespace().next()?;
        let name = word.split('@').next().unwrap_or(word);
        if name.is_empty() { None } else { Some(name) }
    }
}

/// One long-poll result.
///
/// `next_offset` covers every update the backend returned, including kinds
/// that carry no message, so the loop never re-fetches skipped updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateBatch {
    pub next_offset: Option<i32>,
    pub messages: Vec<IncomingMessage>,
}

impl UpdateBatch {
    /// A batch holding only `messages`, acknowledged past the highest id.
    pub fn from_messages(messages: Vec<IncomingMessage>) -> Self {
        let next_offset = messages.iter().map(|m| m.update_id + 1).max();
        Self {
            next_offset,
            messages,
        }
    }
}

/// How a receive loop ended without a transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The shutdown token was cancelled.
    Stopped,
    /// A newer session replaced this one.
    Superseded,
}
