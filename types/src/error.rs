//! Parse errors for the shared value types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("invalid identity: {0:?} (expected 0x followed by 40 hex digits)")]
    InvalidIdentity(String),

    #[error("invalid content identifier: {0:?}")]
    InvalidContentId(String),
}
