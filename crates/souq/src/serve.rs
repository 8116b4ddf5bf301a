// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `souq serve` command implementation.
//!
//! Loads the configuration once, then runs the config refresher, the bot
//! poller and the web server side by side until a shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use souq_config::{ConfigLoader, ConfigStore, SouqConfig, render_errors};
use souq_core::SouqError;
use souq_gateway::{BotStatus, GatewayState, start_server};
use souq_storage::PendingUploads;
use souq_telegram::{BotPoller, Refresher, SessionSlot, TelegramSessionFactory};
use tracing::{error, info, warn};

use crate::shutdown;

/// Runs the `souq serve` command.
///
/// A failed startup load is reported and the process keeps serving with no
/// configuration: the web front answers "not configured", the bot poller
/// idles, and the refresher retries on its schedule.
pub async fn run_serve(loader: ConfigLoader) -> Result<(), SouqError> {
    // Ambient settings come from the first resolve and are not reloaded.
    let raw = match loader.resolve() {
        Ok(raw) => raw,
        Err(e) => {
            render_errors(std::slice::from_ref(&e));
            SouqConfig::default()
        }
    };

    init_tracing(&raw.log_level);

    info!(
        override_file = %loader.override_path().display(),
        "starting souq serve"
    );

    let store = ConfigStore::new();
    let uploads = PendingUploads::new();
    let slot = SessionSlot::new();

    let factory = Arc::new(TelegramSessionFactory::new(
        store.clone(),
        uploads.clone(),
        raw.polling.timeout_secs,
    ));
    let refresher = Refresher::new(
        loader,
        store.clone(),
        slot.clone(),
        factory,
        raw.polling.refresh_interval(),
    );

    startup_load(&refresher);

    let cancel = shutdown::install_signal_handler();

    let refresher_handle = tokio::spawn({
        let cancel = cancel.clone();
        async move { refresher.run(cancel).await }
    });

    let poller = BotPoller::new(
        slot.clone(),
        Duration::from_secs(raw.polling.retry_backoff_secs),
    );
    let poller_handle = tokio::spawn({
        let cancel = cancel.clone();
        async move { poller.run(cancel).await }
    });

    let state = GatewayState::new(store.clone(), uploads).with_bot_status(bot_status_for(slot, store));

    let result = start_server(&raw.server, state, cancel.clone()).await;
    if let Err(ref e) = result {
        error!(error = %e, "web server failed, shutting down");
    }

    // Stop the background loops whether the server exited cleanly or not.
    cancel.cancel();
    for (name, handle) in [("refresher", refresher_handle), ("bot poller", poller_handle)] {
        if let Err(e) = handle.await {
            error!(task = name, error = %e, "background task panicked");
        }
    }

    info!("souq stopped");
    result
}

/// First configuration load. Failure leaves the store empty.
fn startup_load(refresher: &Refresher) -> bool {
    match refresher.tick() {
        Ok(_) => true,
        Err(e) => {
            render_errors(std::slice::from_ref(&e));
            warn!(
                error = %e,
                "starting without configuration, will retry on the next refresh"
            );
            false
        }
    }
}

/// Reports the session the poller is running and whether it matches the
/// current configuration.
fn bot_status_for(
    slot: SessionSlot,
    store: ConfigStore,
) -> impl Fn() -> Option<BotStatus> + Send + Sync + 'static {
    move || {
        let session = slot.current()?;
        let in_sync = store
            .current()
            .is_some_and(|config| session.serves(&config));
        Some(BotStatus {
            masked_token: session.masked_token(),
            in_sync,
        })
    }
}

/// Initializes the tracing subscriber with the configured log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("souq={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
