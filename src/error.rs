use std::{fmt, io, path::PathBuf};
use thiserror::Error;

/// Levels of the selection cascade, top to bottom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Zipcode,
    Road,
    Address,
    Prediction,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Zipcode => "zipcode",
            Level::Road => "road",
            Level::Address => "address",
            Level::Prediction => "prediction",
        })
    }
}

/// Rejected selection-state mutation. The state is left untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CascadeError {
    #[error("{value:?} is not a valid {level}")]
    InvalidSelection { level: Level, value: String },
    /// Mutation out of cascade order. A correctly wired orchestrator never hits this.
    #[error("cannot set {level} before a {requires} is selected")]
    PreconditionViolated { level: Level, requires: Level },
    #[error("discarded {level} result fetched for a superseded selection")]
    StaleResult { level: Level },
}

/// Failure reported by an external lookup or model. Degrades to "no data".
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("{collaborator} has no data for {key:?}")]
    NotFound {
        collaborator: &'static str,
        key: String,
    },
    #[error("{collaborator} unavailable: {reason}")]
    Unavailable {
        collaborator: &'static str,
        reason: String,
    },
}

/// Startup failures that abort the program.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("malformed {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot open registry: {0}")]
    Registry(#[from] CollaboratorError),
    #[error("cannot install logger: {0}")]
    Logging(String),
}
