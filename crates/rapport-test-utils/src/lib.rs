// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for rapport integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockCompletion`] - Mock completion service with scripted replies and failures
//! - [`MockChannel`] - Mock chat transport with message injection and capture
//! - [`FailingStorage`] - Storage adapter whose writes always fail
//! - [`TestHarness`] - Turn engine over a temp SQLite database and the mocks

pub mod failing_storage;
pub mod harness;
pub mod mock_channel;
pub mod mock_completion;

pub use failing_storage::FailingStorage;
pub use harness::{TestHarness, TestHarnessBuilder, inbound};
pub use mock_channel::MockChannel;
pub use mock_completion::{MockCompletion, Scripted};
