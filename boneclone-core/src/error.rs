//! Error types for boneclone-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or interpreting configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("config not found at {path}")]
    NotFound { path: PathBuf },

    /// Underlying I/O failure while reading the file.
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error: includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A `${NAME}` reference names an unset environment variable.
    #[error("environment variable {name} referenced in config is not set")]
    MissingEnv { name: String },

    /// A `${` without its closing brace.
    #[error("unterminated environment reference in {field}")]
    UnterminatedEnv { field: &'static str },

    /// The provider tag is not one of the supported hosts.
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}
