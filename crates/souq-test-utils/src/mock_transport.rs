// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock bot transport for deterministic testing.
//!
//! `MockTransport` implements `BotTransport` with a script of poll results
//! and captures every reply for assertion in tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use souq_core::{BotTransport, IncomingMessage, SouqError, UpdateBatch};

enum Step {
    Batch(Vec<IncomingMessage>),
    Fail(String),
}

/// A scripted messaging backend.
///
/// Each `fetch_updates` call consumes one scripted step. With the script
/// empty, a poll behaves like an idle long poll: it waits for the timeout
/// (or for a new step to be pushed) and returns an empty batch.
pub struct MockTransport {
    token: String,
    script: Mutex<VecDeque<Step>>,
    replies: Mutex<Vec<(IncomingMessage, String)>>,
    offsets: Mutex<Vec<i32>>,
    webhook_clears: AtomicUsize,
    notify: Notify,
}

impl MockTransport {
    /// Create a mock transport for `token` with an empty script.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            script: Mutex::new(VecDeque::new()),
            replies: Mutex::new(Vec::new()),
            offsets: Mutex::new(Vec::new()),
            webhook_clears: AtomicUsize::new(0),
            notify: Notify::new(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Queue a batch of messages for the next poll.
    pub async fn push_batch(&self, messages: Vec<IncomingMessage>) {
        self.script.lock().await.push_back(Step::Batch(messages));
        self.notify.notify_one();
    }

    /// Queue a transport failure for the next poll.
    pub async fn push_failure(&self, message: impl Into<String>) {
        self.script.lock().await.push_back(Step::Fail(message.into()));
        self.notify.notify_one();
    }

    /// All replies sent so far, with the message they answered.
    pub async fn replies(&self) -> Vec<(IncomingMessage, String)> {
        self.replies.lock().await.clone()
    }

    /// Offsets passed to each `fetch_updates` call, in order.
    pub async fn offsets(&self) -> Vec<i32> {
        self.offsets.lock().await.clone()
    }

    pub async fn fetch_count(&self) -> usize {
        self.offsets.lock().await.len()
    }

    pub fn webhook_clears(&self) -> usize {
        self.webhook_clears.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BotTransport for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    async fn clear_webhook(&self) -> Result<(), SouqError> {
        self.webhook_clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn fetch_updates(
        &self,
        offset: i32,
        timeout_secs: u32,
    ) -> Result<UpdateBatch, SouqError> {
        self.offsets.lock().await.push(offset);

        let step = self.script.lock().await.pop_front();
        match step {
            Some(Step::Batch(messages)) => Ok(UpdateBatch::from_messages(messages)),
            Some(Step::Fail(message)) => Err(SouqError::transport(message)),
            None => {
                let wait = Duration::from_secs(u64::from(timeout_secs.max(1)));
                tokio::select! {
                    _ = self.notify.notified() => {}
                    _ = tokio::time::sleep(wait) => {}
                }
                Ok(UpdateBatch::default())
            }
        }
    }

    async fn reply(&self, msg: &IncomingMessage, text: &str) -> Result<(), SouqError> {
        self.replies
            .lock()
            .await
            .push((msg.clone(), text.to_string()));
        Ok(())
    }
}
