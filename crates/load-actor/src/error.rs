//! Error types for the load actor.

use thiserror::Error;

use crate::body::TemplateError;

/// Errors raised while loading or resolving a workload definition.
///
/// All of these surface at setup time. A workload that loads and validates
/// cleanly cannot fail phase resolution later.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("phase {index}: unrecognized operation kind: {kind}")]
    UnknownOperation { index: usize, kind: String },

    #[error("phase {0}: missing route")]
    MissingRoute(usize),

    #[error("phase {0}: missing operation")]
    MissingOperation(usize),

    #[error("phase {0}: POST requires a body template")]
    MissingBody(usize),

    #[error("phase {index}: {source}")]
    BadBody {
        index: usize,
        #[source]
        source: TemplateError,
    },

    #[error("workload must declare at least one phase")]
    NoPhases,

    #[error("actors must be > 0")]
    NoActors,

    #[error("failed to read workload file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse workload file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors raised by a single request/response exchange.
///
/// Always recorded as a failed observation and then returned unchanged to
/// the caller; the execution loop never retries or continues past one.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to encode request body: {0}")]
    Body(#[from] serde_json::Error),
}
