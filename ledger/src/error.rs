use eduverify_types::{ContentId, Identity, TypesError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{0} is not an authorized institution")]
    Unauthorized(Identity),

    #[error("credential {0} already exists")]
    DuplicateCredential(String),

    #[error("document {0} is already referenced by a credential")]
    DuplicateContent(ContentId),

    #[error("credential not found: {0}")]
    NotFound(String),

    #[error("document not found: {0}")]
    DocumentNotFound(ContentId),

    #[error("invalid credential: {0}")]
    InvalidArgument(String),

    #[error("document is empty")]
    EmptyDocument,

    #[error("document of {size} bytes exceeds the {limit} byte limit")]
    DocumentTooLarge { size: usize, limit: usize },

    #[error(transparent)]
    InvalidIdentifier(#[from] TypesError),
}
