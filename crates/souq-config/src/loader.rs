// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Merge order (later overrides earlier):
//! 1. Compiled defaults
//! 2. Environment (`BOT_TOKEN`, `PHOTOS_DIR`, `JSON_FILE`, `BASE_URL`, `PORT`)
//! 3. The override file (`./souq.toml` unless told otherwise)
//!
//! A broken override file is reported and skipped, never fatal.

#![allow(clippy::result_large_err)] // ConfigError carries miette source snippets

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use tracing::{debug, warn};

use crate::diagnostic::{ConfigError, OverrideFile, override_errors};
use crate::model::{SouqConfig, StorefrontConfig};
use crate::store::ConfigStore;

/// Default override file, relative to the working directory.
pub const DEFAULT_OVERRIDE_FILE: &str = "souq.toml";

/// Environment variable name -> config key for the string fields.
const ENV_KEYS: &[(&str, &str)] = &[
    ("BOT_TOKEN", "bot_token"),
    ("PHOTOS_DIR", "photos_dir"),
    ("JSON_FILE", "catalog_file"),
    ("BASE_URL", "base_url"),
];

const PORT_VAR: &str = "PORT";

/// What a successful load means for the bot identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// First load, or the token differs from the stored one.
    IdentityChanged,
    /// Same token as the stored snapshot.
    Unchanged,
}

/// Where environment values come from.
///
/// `Process` reads the real environment on every load so that edits made by
/// the hosting platform are picked up by the next refresh tick.
#[derive(Debug, Clone, Default)]
pub enum EnvSource {
    #[default]
    Process,
    Fixed(BTreeMap<String, String>),
}

impl EnvSource {
    /// A fixed environment, for tests and embedding.
    pub fn fixed<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        EnvSource::Fixed(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    fn var(&self, name: &str) -> Option<String> {
        match self {
            EnvSource::Process => std::env::var(name).ok(),
            EnvSource::Fixed(vars) => vars.get(name).cloned(),
        }
    }
}

/// Resolves configuration and publishes validated snapshots into a [`ConfigStore`].
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    override_path: PathBuf,
    env: EnvSource,
}

impl ConfigLoader {
    /// Loader reading `path` and the process environment.
    pub fn new(override_path: impl Into<PathBuf>) -> Self {
        Self {
            override_path: override_path.into(),
            env: EnvSource::Process,
        }
    }

    /// Replaces the environment source.
    pub fn with_env(mut self, env: EnvSource) -> Self {
        self.env = env;
        self
    }

    pub fn override_path(&self) -> &Path {
        &self.override_path
    }

    /// Merges defaults, environment, and the override file.
    ///
    /// If the override file exists but cannot be merged, every problem is
    /// logged as a warning and the result is built from defaults and the
    /// environment alone.
    pub fn resolve(&self) -> Result<SouqConfig, ConfigError> {
        let base = self.base_figment();

        match self.merge_override(&base) {
            Some(Ok(config)) => {
                debug!(path = %self.override_path.display(), "loaded override file");
                return Ok(config);
            }
            Some(Err(problems)) => {
                for problem in problems {
                    warn!(
                        path = %self.override_path.display(),
                        error = %problem,
                        "ignoring override file, falling back to environment"
                    );
                }
            }
            None => {
                debug!(
                    path = %self.override_path.display(),
                    "override file not found, using environment"
                );
            }
        }

        base.extract::<SouqConfig>()
            .map_err(|e| ConfigError::Other(e.to_string()))
    }

    /// Why the override file would be ignored by the next load.
    ///
    /// Empty when the file is absent or merges cleanly.
    pub fn override_problems(&self) -> Vec<ConfigError> {
        match self.merge_override(&self.base_figment()) {
            Some(Err(problems)) => problems,
            _ => Vec::new(),
        }
    }

    /// Resolves, validates, and stores a new snapshot.
    ///
    /// On error the store is left untouched.
    pub fn load(&self, store: &ConfigStore) -> Result<ReloadOutcome, ConfigError> {
        let raw = self.resolve()?;
        self.load_resolved(&raw, store)
    }

    /// Validates an already resolved configuration and stores it.
    pub fn load_resolved(
        &self,
        raw: &SouqConfig,
        store: &ConfigStore,
    ) -> Result<ReloadOutcome, ConfigError> {
        let candidate = StorefrontConfig::validated(raw)?;

        let outcome = match store.current() {
            Some(current) if current.bot_token() == candidate.bot_token() => {
                ReloadOutcome::Unchanged
            }
            _ => ReloadOutcome::IdentityChanged,
        };

        store.replace(Arc::new(candidate));
        Ok(outcome)
    }

    fn base_figment(&self) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(SouqConfig::default()));

        for (var, key) in ENV_KEYS {
            if let Some(value) = self.env.var(var) {
                figment = figment.merge((*key, value));
            }
        }

        if let Some(raw_port) = self.env.var(PORT_VAR) {
            match raw_port.trim().parse::<u16>() {
                Ok(port) => figment = figment.merge(("server.port", port)),
                Err(_) => warn!(value = %raw_port, "ignoring non-numeric PORT"),
            }
        }

        figment
    }

    fn merge_override(&self, base: &Figment) -> Option<Result<SouqConfig, Vec<ConfigError>>> {
        if !self.override_path.is_file() {
            return None;
        }
        let merged = base
            .clone()
            .merge(Toml::file_exact(&self.override_path))
            .extract::<SouqConfig>()
            .map_err(|err| override_errors(err, OverrideFile::read(&self.override_path).as_ref()));
        Some(merged)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(DEFAULT_OVERRIDE_FILE)
    }
}
