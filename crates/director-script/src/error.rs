//! Error types for director-script

use thiserror::Error;

/// Script loading error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("RON write error: {0}")]
    RonWrite(#[from] ron::Error),

    #[error("Duplicate node key: {0}")]
    DuplicateNodeKey(String),

    #[error("Unknown node key: {0}")]
    UnknownNodeKey(String),

    #[error("Unknown link {link} on node {node}")]
    UnknownLink { node: String, link: String },

    #[error(transparent)]
    Core(#[from] director_core::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
