//! Test module for determinism, integration and concurrency tests.
//!
//! These tests drive whole rounds through [`crate::coordinator::Match`] and
//! [`crate::coordinator::RoundCoordinator`] rather than single resolvers:
//! - **Determinism tests**: Same seed and inputs produce identical state
//! - **Integration tests**: Multi-round scenarios across every resolver
//! - **Concurrency tests**: Participant threads meeting at the round barrier
//! - **Helper functions**: Utilities for test setup
//!
//! # Test Structure
//!
//! - `determinism.rs`: Tests that verify deterministic execution
//! - `integration.rs`: End-to-end round scenarios
//! - `concurrency.rs`: Threaded submission and barrier release
//! - `helpers.rs`: Test setup utilities and factory functions

mod determinism;
mod helpers;

// Re-export for convenience
pub use helpers::*;
