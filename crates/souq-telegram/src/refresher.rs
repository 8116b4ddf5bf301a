// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic configuration reload and bot identity swap.

use std::sync::Arc;
use std::time::Duration;

use souq_config::{ConfigError, ConfigLoader, ConfigStore, ReloadOutcome};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::session::{SessionFactory, SessionSlot};

/// Reloads configuration on a fixed interval.
///
/// The first reload happens one interval after [`Refresher::run`] starts;
/// the startup load is expected to have been done with [`Refresher::tick`].
pub struct Refresher {
    loader: ConfigLoader,
    store: ConfigStore,
    slot: SessionSlot,
    factory: Arc<dyn SessionFactory>,
    interval: Duration,
}

impl Refresher {
    pub fn new(
        loader: ConfigLoader,
        store: ConfigStore,
        slot: SessionSlot,
        factory: Arc<dyn SessionFactory>,
        interval: Duration,
    ) -> Self {
        Self {
            loader,
            store,
            slot,
            factory,
            interval,
        }
    }

    /// One reload attempt.
    ///
    /// A successful load whose token is not served by the current session
    /// builds and publishes a new session. On error the store and the slot
    /// are left as they were.
    pub fn tick(&self) -> Result<ReloadOutcome, ConfigError> {
        let outcome = self.loader.load(&self.store)?;

        let Some(snapshot) = self.store.current() else {
            return Ok(outcome);
        };

        let needs_session = self
            .slot
            .current()
            .is_none_or(|session| !session.serves(&snapshot));

        if needs_session {
            match self.factory.build(&snapshot) {
                Ok(session) => {
                    let identity = session.identity();
                    self.slot.publish(Arc::new(session));
                    info!(
                        token = %snapshot.masked_token(),
                        identity,
                        "bot token updated, handlers registered"
                    );
                }
                Err(e) => {
                    let serving = self.slot.current().map(|session| session.masked_token());
                    error!(
                        error = %e,
                        configured = %snapshot.masked_token(),
                        serving = serving.as_deref().unwrap_or("none"),
                        "failed to build bot session, bot still runs on the serving token"
                    );
                }
            }
        } else {
            debug!("configuration reloaded, bot token unchanged");
        }

        Ok(outcome)
    }

    /// Reloads every interval until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(interval_secs = self.interval.as_secs(), "config refresher started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }

            match self.tick() {
                Ok(_) => info!("configuration checked"),
                Err(e) => warn!(error = %e, "config reload failed, keeping previous configuration"),
            }
        }
        info!("config refresher stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use souq_config::{EnvSource, StorefrontConfig};
    use souq_core::SouqError;
    use tracing_test::traced_test;

    use crate::session::BotSession;

    struct Refusing;

    impl SessionFactory for Refusing {
        fn build(&self, _: &StorefrontConfig) -> Result<BotSession, SouqError> {
            Err(SouqError::transport("refused"))
        }
    }

    #[test]
    #[traced_test]
    fn failed_build_is_logged_with_configured_token() {
        let tmp = tempfile::tempdir().unwrap();
        let loader = ConfigLoader::new(tmp.path().join("souq.toml")).with_env(EnvSource::fixed([
            ("BOT_TOKEN", "9876543210:fresh".to_string()),
            ("PHOTOS_DIR", tmp.path().join("photos").display().to_string()),
        ]));
        let store = ConfigStore::new();
        let slot = SessionSlot::new();
        let refresher = Refresher::new(
            loader,
            store.clone(),
            slot.clone(),
            Arc::new(Refusing),
            Duration::from_secs(60),
        );

        assert_eq!(refresher.tick().unwrap(), ReloadOutcome::IdentityChanged);

        assert_eq!(store.current().unwrap().bot_token(), "9876543210:fresh");
        assert!(!slot.is_active());
        assert!(logs_contain("bot still runs on the serving token"));
        assert!(logs_contain("9876543210..."));
    }
}
