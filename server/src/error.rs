//! Typed errors for the small set of internal operations that can fail in
//! a way worth distinguishing. Protocol and rule violations never go
//! through this type; those are silently dropped frames or state
//! re-broadcasts, never a bubbled `Result::Err`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: String, #[source] source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse { path: String, #[source] source: serde_json::Error },
}
