//! LMDB storage backend for EduVerify.
//!
//! Implements [`eduverify_store::GovernanceStore`] using the `heed` LMDB
//! bindings. Each governance table maps to one LMDB database within a single
//! environment, and every [`eduverify_store::WriteBatch`] is applied in one
//! write transaction.

pub mod environment;
pub mod error;
pub mod governance;

pub use environment::{LmdbEnvironment, DEFAULT_MAP_SIZE};
pub use error::LmdbError;
pub use governance::LmdbGovernanceStore;
