// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the Souq runtime and external collaborators.

pub mod transport;

pub use transport::BotTransport;
