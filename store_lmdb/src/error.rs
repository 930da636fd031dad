use eduverify_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmdbError {
    #[error("LMDB error: {0}")]
    Heed(String),

    #[error("cannot create data directory {path}: {reason}")]
    DataDir { path: String, reason: String },

    #[error("malformed row in {table}: {reason}")]
    Corrupted { table: &'static str, reason: String },
}

impl From<heed::Error> for LmdbError {
    fn from(e: heed::Error) -> Self {
        LmdbError::Heed(e.to_string())
    }
}

impl From<LmdbError> for StoreError {
    fn from(e: LmdbError) -> Self {
        match e {
            LmdbError::Corrupted { .. } => StoreError::Corruption(e.to_string()),
            _ => StoreError::Backend(e.to_string()),
        }
    }
}
