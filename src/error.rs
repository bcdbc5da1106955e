//! Error types for hintcheck.
//!
//! Two families: per-file analysis errors, which are recorded as an
//! "could not analyze" outcome and never abort sibling files, and
//! configuration errors, which fail the run before any file is read.

use thiserror::Error;

/// A file that could not be turned into function records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The source is not valid Python.
    #[error("{path}:{line}: syntax error: {message}")]
    Parse {
        path: String,
        line: usize,
        message: String,
    },

    /// The file could not be read (permissions, encoding, vanished).
    #[error("{path}: could not read file: {message}")]
    Read { path: String, message: String },

    /// The parser itself could not be set up.
    #[error("{path}: parser unavailable: {message}")]
    Grammar { path: String, message: String },
}

impl AnalysisError {
    /// Creates a parse failure for the given location.
    pub fn parse(path: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Creates a read failure from an I/O error.
    pub fn read(path: impl Into<String>, err: &std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Path of the file the error belongs to.
    pub fn path(&self) -> &str {
        match self {
            Self::Parse { path, .. } | Self::Read { path, .. } | Self::Grammar { path, .. } => {
                path
            }
        }
    }

    /// Line the error points at, when known.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Parse { line, .. } => Some(*line),
            Self::Read { .. } | Self::Grammar { .. } => None,
        }
    }

    /// Short machine-readable kind for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "parse",
            Self::Read { .. } => "read",
            Self::Grammar { .. } => "grammar",
        }
    }

    /// Description without the path prefix.
    pub fn detail(&self) -> String {
        match self {
            Self::Parse { line, message, .. } => {
                format!("syntax error at line {}: {}", line, message)
            }
            Self::Read { message, .. } => format!("could not read file: {}", message),
            Self::Grammar { message, .. } => format!("parser unavailable: {}", message),
        }
    }
}

/// Invalid run configuration. Fails the whole run.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid threshold {0}: must be a number between 0 and 100")]
    InvalidThreshold(f64),

    #[error("unknown target {name:?}: no such directory under {root}")]
    UnknownTarget { name: String, root: String },

    #[error("unknown rule {0:?} in zero_tolerance")]
    UnknownRule(String),

    #[error("invalid excluded_paths pattern {pattern:?}: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}
