//! Content-addressed document store.

use crate::error::LedgerError;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use eduverify_types::ContentId;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

type Blake2b256 = Blake2b<U32>;

/// Public gateway documents resolve under unless configured otherwise.
pub const DEFAULT_GATEWAY_URL: &str = "https://gateway.pinata.cloud/ipfs";

/// Upload limit (100 MiB).
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 100 * 1024 * 1024;

/// Prefix marking identifiers produced by [`MemoryContentStore`].
const CID_PREFIX: &str = "b2";

/// Stores immutable documents and hands back their content identifiers.
pub trait ContentStore: Send + Sync {
    /// Store `bytes`, returning their identifier. Uploading the same bytes
    /// twice yields the same identifier.
    fn upload(&self, bytes: &[u8]) -> Result<ContentId, LedgerError>;

    /// Public URL the document can be fetched from.
    fn resolve(&self, cid: &ContentId) -> Result<String, LedgerError>;

    fn fetch(&self, cid: &ContentId) -> Result<Vec<u8>, LedgerError>;
}

/// In-memory store keyed by `b2` + hex(Blake2b-256(document)).
pub struct MemoryContentStore {
    gateway_url: String,
    max_document_bytes: usize,
    blobs: RwLock<HashMap<ContentId, Vec<u8>>>,
}

impl MemoryContentStore {
    pub fn new(gateway_url: impl Into<String>, max_document_bytes: usize) -> Self {
        let gateway_url = gateway_url.into().trim_end_matches('/').to_string();
        Self {
            gateway_url,
            max_document_bytes,
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Identifier `bytes` would be stored under.
    pub fn content_id_for(bytes: &[u8]) -> Result<ContentId, LedgerError> {
        let mut hasher = Blake2b256::new();
        hasher.update(bytes);
        let digest = hasher.finalize();
        ContentId::new(format!("{CID_PREFIX}{}", hex::encode(digest))).map_err(LedgerError::from)
    }

    pub fn len(&self) -> usize {
        self.blobs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryContentStore {
    fn default() -> Self {
        Self::new(DEFAULT_GATEWAY_URL, DEFAULT_MAX_DOCUMENT_BYTES)
    }
}

impl ContentStore for MemoryContentStore {
    fn upload(&self, bytes: &[u8]) -> Result<ContentId, LedgerError> {
        if bytes.is_empty() {
            return Err(LedgerError::EmptyDocument);
        }
        if bytes.len() > self.max_document_bytes {
            return Err(LedgerError::DocumentTooLarge {
                size: bytes.len(),
                limit: self.max_document_bytes,
            });
        }
        let cid = Self::content_id_for(bytes)?;
        self.blobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(cid.clone())
            .or_insert_with(|| bytes.to_vec());
        debug!(cid = %cid, size = bytes.len(), "document stored");
        Ok(cid)
    }

    fn resolve(&self, cid: &ContentId) -> Result<String, LedgerError> {
        let blobs = self.blobs.read().unwrap_or_else(PoisonError::into_inner);
        if !blobs.contains_key(cid) {
            return Err(LedgerError::DocumentNotFound(cid.clone()));
        }
        Ok(format!("{}/{}", self.gateway_url, cid))
    }

    fn fetch(&self, cid: &ContentId) -> Result<Vec<u8>, LedgerError> {
        self.blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(cid)
            .cloned()
            .ok_or_else(|| LedgerError::DocumentNotFound(cid.clone()))
    }
}
