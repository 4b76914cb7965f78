use std::io;
use thiserror::Error;

/// Unified error type for catalog building, diff mapping, and store access.
///
/// Absence of a function is never an error — lookups return empty results.
/// The variants here are for anomalies the caller must decide about.
#[derive(Error, Debug)]
pub enum Error {
    /// A requested file or text does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A source text could not be analyzed into usable extents.
    #[error("parse failure: {0}")]
    ParseFailure(String),

    /// A hunk header does not match the unified-diff grammar.
    #[error("invalid diff: {0}")]
    InvalidDiff(String),

    /// Persisted store content is not valid record data. Surfaced as fatal
    /// for the operation; the store is never repaired or overwritten.
    #[error("store corrupt at {path}: {reason}")]
    StoreCorrupt { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a NotFound error
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create a ParseFailure error
    pub fn parse_failure(message: impl Into<String>) -> Self {
        Self::ParseFailure(message.into())
    }

    /// Create an InvalidDiff error
    pub fn invalid_diff(message: impl Into<String>) -> Self {
        Self::InvalidDiff(message.into())
    }

    /// Create a StoreCorrupt error
    pub fn store_corrupt(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StoreCorrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
