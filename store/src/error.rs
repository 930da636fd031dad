use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("stored state is corrupted: {0}")]
    Corruption(String),
}
