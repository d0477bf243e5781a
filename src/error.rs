use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures that abort a whole cleanup pass.
///
/// A namespace or tag that is simply not eligible is never an error; these
/// variants only cover cases where continuing would risk deleting something
/// that is still in use.
#[derive(Debug, Error)]
pub enum Error {
    #[error("could not list {kind} in namespace {namespace}")]
    Collaborator {
        namespace: String,
        kind: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("namespace {namespace} has a malformed idle annotation {value:?}")]
    DataIntegrity {
        namespace: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("checker {checker} failed for namespace {namespace}")]
    Checker {
        checker: String,
        namespace: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid pattern {pattern:?}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid duration {value:?}")]
    InvalidDuration {
        value: String,
        #[source]
        source: humantime::DurationError,
    },

    #[error("duration {0:?} is out of range")]
    DurationOutOfRange(String),

    #[error("git {command} failed: {message}")]
    Vcs { command: String, message: String },
}
