// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Web front for the Souq storefront.
//!
//! Serves the landing and admin pages, the product catalog, and product
//! photos. All routes read the configuration snapshot current at request
//! time, so a reload is visible to the next request.

pub mod handlers;
pub mod server;
pub mod templates;

pub use server::{BotStatus, GatewayState, router, start_server};
