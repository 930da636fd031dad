//! HTTP API for the credential registry.
//!
//! Exposes governance (proposals, votes, execution, membership queries),
//! document upload, credential issuance and verification over JSON.

pub mod error;
pub mod handlers;
pub mod pagination;
pub mod server;
pub mod state;

pub use error::RpcError;
pub use server::{router, RpcServer};
pub use state::AppState;
