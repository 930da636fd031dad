//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies (here: the governance persistence substrate) are
//! abstracted behind traits. This crate provides test-friendly implementations
//! that never touch the filesystem or network and can be steered from tests,
//! e.g. to make the next commit fail.

pub mod store;

pub use store::NullGovernanceStore;
