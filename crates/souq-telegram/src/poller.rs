// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keeps the current bot session receiving messages.
//!
//! Failures are retried forever after a fixed backoff. Each attempt uses
//! whichever session is current at that moment, so a token swapped during
//! the backoff is picked up by the next attempt.

use std::time::Duration;

use souq_core::LoopExit;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::session::SessionSlot;

/// How long to wait before re-checking an empty slot.
pub const IDLE_WAIT: Duration = Duration::from_secs(1);

pub struct BotPoller {
    slot: SessionSlot,
    retry_backoff: Duration,
}

impl BotPoller {
    pub fn new(slot: SessionSlot, retry_backoff: Duration) -> Self {
        Self {
            slot,
            retry_backoff,
        }
    }

    /// Runs until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        loop {
            if cancel.is_cancelled() {
                break;
            }

            let Some(session) = self.slot.current() else {
                debug!("no bot session yet");
                if !sleep_or_cancel(IDLE_WAIT, &cancel).await {
                    break;
                }
                continue;
            };

            info!(identity = session.identity(), "bot is running");
            match session.run(&self.slot, &cancel).await {
                Ok(LoopExit::Stopped) => break,
                Ok(LoopExit::Superseded) => {
                    info!(identity = session.identity(), "bot identity swapped, restarting receive loop");
                }
                Err(e) => {
                    warn!(
                        identity = session.identity(),
                        error = %e,
                        backoff_secs = self.retry_backoff.as_secs(),
                        "bot error, retrying"
                    );
                    if !sleep_or_cancel(self.retry_backoff, &cancel).await {
                        break;
                    }
                }
            }
        }
        info!("bot poller stopped");
    }
}

/// Sleeps for `duration`. Returns `false` if cancelled first.
async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}
