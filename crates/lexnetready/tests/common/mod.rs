//! Shared test utilities for lexnetready integration tests.
//!
//! This module provides:
//! - `TestHarness` for running batches against a temporary case folder
//! - `FakeTools`, in-process stand-ins for the external tools that record
//!   every invocation and fail on request

pub mod fakes;
pub mod harness;

pub use fakes::{Call, FakeTools};
pub use harness::TestHarness;
