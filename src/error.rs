//! Error types.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to load a trace. These abort a replay before it starts.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to open trace `{}`", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read trace `{name}` at line {line}")]
    Read {
        name: String,
        line: usize,
        #[source]
        source: io::Error,
    },
}

/// A trace line that matches neither the branch nor the return shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty record")]
    Empty,
    #[error("line is not valid UTF-8")]
    InvalidUtf8,
    #[error("unknown record kind `{0}`")]
    UnknownKind(char),
    #[error("missing source address")]
    MissingSource,
    #[error("invalid address `{0}`")]
    BadAddress(String),
    #[error("missing `taken`/`not taken` outcome")]
    MissingOutcome,
}

/// Invalid simulator configuration.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("BTB capacity must be a positive integer")]
    ZeroCapacity,
    #[error("counter table size must be a positive integer")]
    ZeroTableSize,
}
