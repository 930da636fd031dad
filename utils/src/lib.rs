//! Shared utilities for EduVerify.

pub mod logging;

pub use logging::{init_logging, LogFormat};
