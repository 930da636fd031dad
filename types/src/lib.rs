//! Fundamental types for EduVerify.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account identities, content identifiers for stored documents, and timestamps.

pub mod address;
pub mod cid;
pub mod error;
pub mod time;

pub use address::Identity;
pub use cid::ContentId;
pub use error::TypesError;
pub use time::Timestamp;
