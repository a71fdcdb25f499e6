//! Error taxonomy for compiling and building a dashboard project.
//!
//! | Error                   | Severity                                     |
//! |-------------------------|----------------------------------------------|
//! | `ConfigError`           | fatal, aborts the project                    |
//! | `UnsupportedBlockError` | skips one item with a warning unless strict  |
//! | `UnboundFilterError`    | fatal, raised only for static mismatches     |
//! | `ExternalToolError`     | reported with output, written files are kept |

use crate::spec::Operator;
use std::path::PathBuf;
use thiserror::Error;

pub use crate::config::ConfigError;

/// A block whose type tag has no registered renderer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported block type `{kind}` (id `{id}`) on page `{page}`")]
pub struct UnsupportedBlockError {
    pub page: String,
    pub id: String,
    pub kind: String,
}

/// Filter or visibility rules that can never work, detected at build time.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UnboundFilterError {
    #[error("unknown operator `{keyword}`")]
    UnknownOperator { keyword: String },

    #[error("cannot parse predicate `{expr}`, expected `<variable> <operator> <value>`")]
    Malformed { expr: String },

    #[error("`{variable} {operator}`: {reason}")]
    InvalidValue {
        variable: String,
        operator: Operator,
        reason: String,
    },

    #[error("block `{target}` on page `{page}` uses `{variable}` but no input on the page sets it")]
    NoSource {
        page: String,
        target: String,
        variable: String,
    },

    #[error("block `{target}` filters on `{variable}` but its data has no such column")]
    UnknownColumn { target: String, variable: String },

    #[error("block `{target}` cannot be bound to `{variable}`: {reason}")]
    InvalidTarget {
        target: String,
        variable: String,
        reason: String,
    },
}

/// Failure of an external program such as the renderer.
#[derive(Debug, Error)]
#[error("`{command}` failed ({status})\n{output}")]
pub struct ExternalToolError {
    pub command: String,
    /// Exit status description, e.g. `exit status: 1`.
    pub status: String,
    /// Captured, filtered stderr and stdout.
    pub output: String,
}

/// Any error raised while compiling or writing one project.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    UnsupportedBlock(#[from] UnsupportedBlockError),

    #[error(transparent)]
    UnboundFilter(#[from] UnboundFilterError),

    #[error(transparent)]
    ExternalTool(#[from] ExternalToolError),

    #[error("IO error when writing `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to generate `{0}`")]
    Generate(PathBuf, #[source] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_block_display() {
        let err = UnsupportedBlockError {
            page: "Overview".into(),
            id: "heatmap-3".into(),
            kind: "heatmap".into(),
        };
        assert_eq!(
            err.to_string(),
            "unsupported block type `heatmap` (id `heatmap-3`) on page `Overview`"
        );
    }

    #[test]
    fn test_compile_error_is_transparent() {
        let err: CompileError = UnboundFilterError::UnknownOperator {
            keyword: "like".into(),
        }
        .into();
        assert_eq!(err.to_string(), "unknown operator `like`");
        assert!(matches!(err, CompileError::UnboundFilter(_)));
    }

    #[test]
    fn test_external_tool_error_keeps_output() {
        let err = ExternalToolError {
            command: "quarto".into(),
            status: "exit status: 1".into(),
            output: "ERROR: bad yaml".into(),
        };
        let display = err.to_string();
        assert!(display.starts_with("`quarto` failed (exit status: 1)"));
        assert!(display.contains("bad yaml"));
    }
}
