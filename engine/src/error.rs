//! Engine error types.

use std::path::PathBuf;

/// A result type returning engine errors.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The error type for loading and running jobs.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A job file could not be read.
    #[error("failed to read job file {path:?}")]
    Io {
        /// The job file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The job file extension is neither `.toml` nor `.json`.
    #[error("unrecognized job file format: {0:?}")]
    UnknownFormat(PathBuf),
    /// A TOML job could not be decoded.
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    /// A JSON job could not be decoded.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Routing failed.
    #[error(transparent)]
    Routing(#[from] route::Error),
    /// Synthesis failed.
    #[error(transparent)]
    Synthesis(#[from] logic::Error),
    /// Buffer insertion failed.
    #[error(transparent)]
    Buffering(#[from] buffering::Failure),
}
