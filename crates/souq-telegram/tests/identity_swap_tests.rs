// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config refresh, bot identity swap, and receive loop retry.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use souq_config::{ConfigError, ReloadOutcome};
use souq_core::{BotTransport, IncomingMessage, SouqError, UpdateBatch};
use souq_telegram::{BotPoller, BotSession, GREETING, HandlerSet, register_default_handlers};
use souq_test_utils::TestHarness;
use tokio_util::sync::CancellationToken;

const INTERVAL: Duration = Duration::from_secs(60);

#[test]
fn each_token_change_builds_exactly_one_session() {
    let h = TestHarness::new("token-a").unwrap();
    let factory = h.factory();
    let refresher = h.refresher(factory.clone(), INTERVAL);

    assert_eq!(refresher.tick().unwrap(), ReloadOutcome::IdentityChanged);
    assert_eq!(factory.builds(), 1);
    assert!(h.photos_dir().is_dir());

    assert_eq!(refresher.tick().unwrap(), ReloadOutcome::Unchanged);
    assert_eq!(refresher.tick().unwrap(), ReloadOutcome::Unchanged);
    assert_eq!(factory.builds(), 1);

    h.write_override("bot_token = \"token-b\"\n").unwrap();
    assert_eq!(refresher.tick().unwrap(), ReloadOutcome::IdentityChanged);
    assert_eq!(refresher.tick().unwrap(), ReloadOutcome::Unchanged);

    assert_eq!(factory.tokens(), vec!["token-a", "token-b"]);
    let snapshot = h.store.current().unwrap();
    assert!(h.slot.current().unwrap().serves(&snapshot));
}

#[test]
fn failed_reload_keeps_store_and_session() {
    let h = TestHarness::new("token-a").unwrap();
    let factory = h.factory();
    let refresher = h.refresher(factory.clone(), INTERVAL);
    refresher.tick().unwrap();
    let session = h.slot.current().unwrap();

    h.write_override("bot_token = \"\"\n").unwrap();
    let err = refresher.tick().unwrap_err();

    assert!(matches!(err, ConfigError::MissingCredential));
    assert_eq!(h.store.current().unwrap().bot_token(), "token-a");
    assert_eq!(h.slot.current().unwrap().identity(), session.identity());
    assert_eq!(factory.builds(), 1);
}

#[test]
fn broken_override_file_falls_back_without_swapping() {
    let h = TestHarness::new("token-a").unwrap();
    let factory = h.factory();
    let refresher = h.refresher(factory.clone(), INTERVAL);
    refresher.tick().unwrap();

    h.write_override("bot_token = [\n").unwrap();
    assert_eq!(refresher.tick().unwrap(), ReloadOutcome::Unchanged);
    assert_eq!(factory.builds(), 1);
}

#[tokio::test]
async fn old_session_keeps_its_own_handlers() {
    let h = TestHarness::new("token-a").unwrap();
    let factory = h.factory();
    let refresher = h.refresher(factory.clone(), INTERVAL);
    refresher.tick().unwrap();
    let old = h.slot.current().unwrap();

    h.write_override("bot_token = \"token-b\"\n").unwrap();
    refresher.tick().unwrap();
    let new = h.slot.current().unwrap();
    assert_ne!(old.identity(), new.identity());

    new.handle(IncomingMessage::text(1, 9, "/start")).await;

    let old_transport = factory.transport(0).unwrap();
    let new_transport = factory.transport(1).unwrap();
    assert!(old_transport.replies().await.is_empty());
    assert_eq!(new_transport.replies().await[0].1, GREETING);
}

#[tokio::test(start_paused = true)]
async fn refresher_run_swaps_identity_on_schedule() {
    let h = TestHarness::new("token-a").unwrap();
    let factory = h.factory();
    let refresher = h.refresher(factory.clone(), INTERVAL);
    refresher.tick().unwrap();
    h.write_override("bot_token = \"token-b\"\n").unwrap();

    let cancel = CancellationToken::new();
    let task = tokio::spawn({
        let cancel = cancel.clone();
        async move { refresher.run(cancel).await }
    });

    // The first scheduled reload happens one interval in.
    tokio::time::sleep(Duration::from_secs(59)).await;
    assert_eq!(factory.builds(), 1);
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(factory.builds(), 2);

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn transport_error_backs_off_then_uses_swapped_session() {
    let h = TestHarness::new("token-a").unwrap();
    let factory = h.factory();
    let refresher = h.refresher(factory.clone(), INTERVAL);
    refresher.tick().unwrap();
    let first = factory.last().unwrap();
    first.push_failure("network down").await;

    let poller = BotPoller::new(h.slot.clone(), Duration::from_secs(5));
    let cancel = CancellationToken::new();
    let task = tokio::spawn({
        let cancel = cancel.clone();
        async move { poller.run(cancel).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(first.fetch_count().await, 1);
    assert_eq!(first.webhook_clears(), 1);

    // Token changes while the poller is backing off.
    h.write_override("bot_token = \"token-b\"\n").unwrap();
    refresher.tick().unwrap();
    let second = factory.last().unwrap();

    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(second.fetch_count().await, 0);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(second.webhook_clears(), 1);
    assert!(second.fetch_count().await >= 1);
    assert_eq!(first.fetch_count().await, 1);

    second
        .push_batch(vec![IncomingMessage::text(10, 77, "/start")])
        .await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let replies = second.replies().await;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].0.chat.0, 77);
    assert_eq!(replies[0].1, GREETING);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(second.offsets().await.contains(&11));

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn running_session_is_superseded_after_swap() {
    let h = TestHarness::new("token-a").unwrap();
    let factory = h.factory();
    let refresher = h.refresher(factory.clone(), INTERVAL);
    refresher.tick().unwrap();

    let poller = BotPoller::new(h.slot.clone(), Duration::from_secs(5));
    let cancel = CancellationToken::new();
    let task = tokio::spawn({
        let cancel = cancel.clone();
        async move { poller.run(cancel).await }
    });

    tokio::time::sleep(Duration::from_millis(500)).await;
    h.write_override("bot_token = \"token-b\"\n").unwrap();
    refresher.tick().unwrap();

    // The old long poll finishes within its 1s timeout, then the loop
    // notices the swap and starts the new session without any backoff.
    tokio::time::sleep(Duration::from_secs(2)).await;
    let second = factory.last().unwrap();
    assert_eq!(second.webhook_clears(), 1);

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn token_arriving_after_startup_starts_the_bot() {
    let mut h = TestHarness::new("").unwrap();
    let factory = h.factory();

    let refresher = h.refresher(factory.clone(), INTERVAL);
    assert!(matches!(
        refresher.tick().unwrap_err(),
        ConfigError::MissingCredential
    ));
    assert!(!h.store.is_configured());
    assert!(!h.slot.is_active());

    let poller = BotPoller::new(h.slot.clone(), Duration::from_secs(5));
    let cancel = CancellationToken::new();
    let task = tokio::spawn({
        let cancel = cancel.clone();
        async move { poller.run(cancel).await }
    });
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(factory.builds(), 0);

    // The hosting platform sets the token; the next reload picks it up.
    h.set_env("BOT_TOKEN", "token-late");
    let refresher = h.refresher(factory.clone(), INTERVAL);
    assert_eq!(refresher.tick().unwrap(), ReloadOutcome::IdentityChanged);
    assert_eq!(factory.tokens(), vec!["token-late"]);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(factory.last().unwrap().webhook_clears(), 1);

    cancel.cancel();
    task.await.unwrap();
}

#[test]
fn failed_session_build_is_retried_on_next_tick() {
    let h = TestHarness::new("token-a").unwrap();
    let factory = h.factory();
    let refresher = h.refresher(factory.clone(), INTERVAL);
    refresher.tick().unwrap();
    let serving = h.slot.current().unwrap();

    factory.set_failing(true);
    h.write_override("bot_token = \"token-b\"\n").unwrap();
    assert_eq!(refresher.tick().unwrap(), ReloadOutcome::IdentityChanged);

    // Store moved on; the bot did not.
    let snapshot = h.store.current().unwrap();
    assert_eq!(snapshot.bot_token(), "token-b");
    assert_eq!(h.slot.current().unwrap().identity(), serving.identity());
    assert!(!serving.serves(&snapshot));

    factory.set_failing(false);
    assert_eq!(refresher.tick().unwrap(), ReloadOutcome::Unchanged);
    assert!(h.slot.current().unwrap().serves(&snapshot));
    assert_eq!(factory.tokens(), vec!["token-a", "token-b"]);
}

/// Models the Bot API: updates below the polled offset are confirmed and
/// never delivered again. The second fetch fails.
#[derive(Default)]
struct ConfirmingServer {
    pending: Mutex<Vec<IncomingMessage>>,
    fetches: AtomicUsize,
    answered: Mutex<Vec<i32>>,
}

#[async_trait]
impl BotTransport for ConfirmingServer {
    fn name(&self) -> &str {
        "confirming"
    }

    async fn clear_webhook(&self) -> Result<(), SouqError> {
        Ok(())
    }

    async fn fetch_updates(&self, offset: i32, timeout_secs: u32) -> Result<UpdateBatch, SouqError> {
        let attempt = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        let deliver = {
            let mut pending = self.pending.lock().unwrap();
            pending.retain(|m| m.update_id >= offset);
            pending.clone()
        };
        if attempt == 2 {
            return Err(SouqError::transport("connection reset"));
        }
        if deliver.is_empty() {
            tokio::time::sleep(Duration::from_secs(u64::from(timeout_secs))).await;
            return Ok(UpdateBatch::default());
        }
        Ok(UpdateBatch::from_messages(deliver))
    }

    async fn reply(&self, msg: &IncomingMessage, _: &str) -> Result<(), SouqError> {
        self.answered.lock().unwrap().push(msg.update_id);
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn retry_after_transport_error_does_not_redeliver_handled_updates() {
    let h = TestHarness::new("token-a").unwrap();
    h.loader().load(&h.store).unwrap();

    let server = Arc::new(ConfirmingServer::default());
    server
        .pending
        .lock()
        .unwrap()
        .push(IncomingMessage::text(10, 77, "/start"));

    let mut handlers = HandlerSet::new();
    register_default_handlers(&mut handlers);
    let session = Arc::new(BotSession::new(
        "token-a",
        server.clone(),
        handlers,
        h.store.clone(),
        h.uploads.clone(),
        1,
    ));
    h.slot.publish(session.clone());

    let poller = BotPoller::new(h.slot.clone(), Duration::from_secs(5));
    let cancel = CancellationToken::new();
    let task = tokio::spawn({
        let cancel = cancel.clone();
        async move { poller.run(cancel).await }
    });

    // Fetch 1 delivers update 10, fetch 2 fails, the retry resumes at 11.
    tokio::time::sleep(Duration::from_secs(9)).await;
    cancel.cancel();
    task.await.unwrap();

    assert!(server.fetches.load(Ordering::SeqCst) >= 3);
    assert_eq!(*server.answered.lock().unwrap(), vec![10]);
    assert_eq!(session.offset(), 11);
}
