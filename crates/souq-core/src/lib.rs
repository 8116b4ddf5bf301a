// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Souq storefront bridge.
//!
//! Provides the error type, the bot transport seam, and the message types
//! shared by the config, storage, telegram, and gateway crates.

pub mod error;
pub mod traits;
pub mod types;

pub use error::SouqError;
pub use traits::BotTransport;
pub use types::{ChatKey, IncomingMessage, LoopExit, UpdateBatch};
