//! Daemon configuration with TOML file support.

use eduverify_ledger::{DEFAULT_GATEWAY_URL, DEFAULT_MAX_DOCUMENT_BYTES};
use eduverify_types::Identity;
use eduverify_utils::LogFormat;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("invalid config: {0}")]
    Parse(String),

    #[error("failed to serialize config: {0}")]
    Serialize(String),
}

/// Configuration for an EduVerify daemon.
///
/// Loaded from a TOML file via [`DaemonConfig::from_toml_file`]; command-line
/// flags are layered on top by the binary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Directory holding the LMDB governance store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Address the HTTP API binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Governors installed when the engine starts from an empty state.
    /// Must be non-empty.
    #[serde(default)]
    pub genesis_governors: Vec<Identity>,

    #[serde(default)]
    pub genesis_institutions: Vec<Identity>,

    /// Gateway documents are resolved under.
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: usize,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./eduverify_data")
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 7077))
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_gateway_url() -> String {
    DEFAULT_GATEWAY_URL.to_string()
}

fn default_max_document_bytes() -> usize {
    DEFAULT_MAX_DOCUMENT_BYTES
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DaemonConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            listen_addr: default_listen_addr(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            genesis_governors: Vec::new(),
            genesis_institutions: Vec::new(),
            gateway_url: default_gateway_url(),
            max_document_bytes: default_max_document_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = DaemonConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config, DaemonConfig::default());
        assert_eq!(config.listen_addr.port(), 7077);
        assert_eq!(config.data_dir, PathBuf::from("./eduverify_data"));
        assert_eq!(config.log_format, LogFormat::Human);
        assert_eq!(config.max_document_bytes, 100 * 1024 * 1024);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            listen_addr = "127.0.0.1:9000"
            data_dir = "/var/lib/eduverify"
            log_format = "json"
            genesis_governors = ["0x0101010101010101010101010101010101010101"]
        "#;
        let config = DaemonConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.listen_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/eduverify"));
        assert_eq!(config.genesis_governors, vec![Identity::new([1u8; 20])]);
        assert_eq!(config.log_level, "info"); // default
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let mut config = DaemonConfig::default();
        config.genesis_institutions = vec![Identity::new([7u8; 20])];
        let toml_str = config.to_toml_string().unwrap();
        let parsed = DaemonConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn bad_identity_is_a_parse_error() {
        let err = DaemonConfig::from_toml_str(r#"genesis_governors = ["0x12"]"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "gateway_url = \"https://ipfs.example/ipfs\"").unwrap();
        let config = DaemonConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.gateway_url, "https://ipfs.example/ipfs");
    }

    #[test]
    fn missing_file_returns_read_error() {
        let result = DaemonConfig::from_toml_file("/nonexistent/eduverify.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
