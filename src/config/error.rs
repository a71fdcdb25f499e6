//! Configuration and spec errors.
//!
//! Everything here is fatal for the project being compiled.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    Validation(String),

    #[error("invalid tab path `{path}`: {reason}")]
    PathSyntax { path: String, reason: &'static str },

    #[error("duplicate block id `{id}` on page `{page}`")]
    DuplicateId { page: String, id: String },

    #[error("invalid {kind} block: {reason}")]
    InvalidBlock { kind: String, reason: String },

    #[error("data source `{name}`: {reason}")]
    Data { name: String, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid_block(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBlock {
            kind: kind.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn data(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Data {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_config_error_display() {
        let io_err = ConfigError::Io(
            PathBuf::from("vizdeck.toml"),
            Error::new(ErrorKind::NotFound, "file not found"),
        );
        let display = format!("{io_err}");
        assert!(display.contains("IO error"));
        assert!(display.contains("vizdeck.toml"));

        let path_err = ConfigError::PathSyntax {
            path: "Sales//Q1".into(),
            reason: "empty segment",
        };
        assert_eq!(
            path_err.to_string(),
            "invalid tab path `Sales//Q1`: empty segment"
        );
    }

    #[test]
    fn test_helper_constructors() {
        let err = ConfigError::invalid_block("chart", "missing `y`");
        assert_eq!(err.to_string(), "invalid chart block: missing `y`");

        let err = ConfigError::data("sales", "row 2 has 3 cells, expected 2");
        assert!(err.to_string().starts_with("data source `sales`"));
    }
}
