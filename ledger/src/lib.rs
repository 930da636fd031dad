//! Credential ledger and document store.
//!
//! The ledger records academic credentials keyed by the content identifier of
//! their document and by student. Writes are authorized against the
//! governance engine's institution set through [`IssuerRegistry`]; the ledger
//! is otherwise independent of governance.
//!
//! The document store is content-addressed: identical bytes always yield the
//! same [`eduverify_types::ContentId`].

pub mod content;
pub mod credential;
pub mod error;
pub mod ledger;

pub use content::{ContentStore, MemoryContentStore, DEFAULT_GATEWAY_URL, DEFAULT_MAX_DOCUMENT_BYTES};
pub use credential::{CredentialDraft, CredentialRecord, Verification};
pub use error::LedgerError;
pub use ledger::{CredentialLedger, IssuerRegistry};
