//! Abstract storage traits for EduVerify.
//!
//! Every storage backend (in-memory for testing, a durable ledger substrate in
//! production) implements these traits. The governance engine depends only on
//! the traits.

pub mod batch;
pub mod error;
pub mod governance;

pub use batch::{GovernanceWrite, WriteBatch};
pub use error::StoreError;
pub use governance::GovernanceStore;
