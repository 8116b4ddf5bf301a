// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence for the Souq storefront.
//!
//! The product catalog is a single pretty-printed JSON array at the path
//! named by the current configuration snapshot. Photos are plain files in
//! the configured directory and need no code beyond the web front's file
//! server. [`PendingUploads`] tracks chats that are mid-way through adding
//! a product.

pub mod catalog;
pub mod uploads;

pub use catalog::{CatalogError, CatalogStore, ProductRecord};
pub use uploads::{PendingUpload, PendingUploads};
