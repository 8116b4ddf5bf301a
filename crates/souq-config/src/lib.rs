// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Souq storefront.
//!
//! Settings come from compiled defaults, the process environment, and an
//! optional `souq.toml` override file. Each successful load publishes an
//! immutable [`StorefrontConfig`] snapshot into a [`ConfigStore`], which
//! readers on any thread can consult without locking.
//!
//! # Usage
//!
//! ```no_run
//! use souq_config::{ConfigLoader, ConfigStore, ReloadOutcome};
//!
//! let store = ConfigStore::new();
//! let loader = ConfigLoader::default();
//! match loader.load(&store) {
//!     Ok(ReloadOutcome::IdentityChanged) => println!("new bot identity"),
//!     Ok(ReloadOutcome::Unchanged) => {}
//!     Err(e) => eprintln!("config error: {e}"),
//! }
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod store;
pub mod validation;

pub use diagnostic::{ConfigError, OverrideFile, render_errors};
pub use loader::{ConfigLoader, DEFAULT_OVERRIDE_FILE, EnvSource, ReloadOutcome};
pub use model::{SouqConfig, StorefrontConfig, mask_token};
pub use store::ConfigStore;

impl From<ConfigError> for souq_core::SouqError {
    fn from(err: ConfigError) -> Self {
        souq_core::SouqError::Config(err.to_string())
    }
}
