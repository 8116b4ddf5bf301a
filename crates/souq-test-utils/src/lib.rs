// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Souq integration tests.
//!
//! Provides a scripted bot transport and a test harness for fast,
//! deterministic tests without network access.
//!
//! # Components
//!
//! - [`MockTransport`] - Bot transport with scripted update batches and failures
//! - [`CountingFactory`] - Session factory that builds mock sessions and counts them
//! - [`TestHarness`] - Temp directory, config store, and loader wired together

pub mod factory;
pub mod harness;
pub mod mock_transport;

pub use factory::CountingFactory;
pub use harness::TestHarness;
pub use mock_transport::MockTransport;
