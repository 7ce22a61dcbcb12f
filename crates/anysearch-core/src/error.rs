//! Core error types.

use thiserror::Error;

/// Machine-readable error kind, stable across message wording changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A realm path could not be resolved.
    InvalidRealm,
    /// Search parameters (ordering, paging) are not acceptable.
    InvalidSearchParameters,
    /// A predicate is malformed or does not fit its schema.
    InvalidSearchExpression,
    /// The relational store failed.
    Store,
    /// A metadata collaborator failed.
    Directory,
}

/// Search errors.
///
/// The first three variants are client validation errors: they are always
/// surfaced to the caller. `Store` and `Directory` are execution faults.
#[derive(Debug, Error)]
pub enum Error {
    /// A realm path could not be resolved.
    #[error("invalid realm: {0}")]
    InvalidRealm(String),

    /// Search parameters are not acceptable.
    #[error("invalid search parameters: {0}")]
    InvalidSearchParameters(String),

    /// A predicate is malformed or does not fit its schema.
    #[error("invalid search expression: {0}")]
    InvalidSearchExpression(String),

    /// The relational store failed.
    #[error("store error: {0}")]
    Store(String),

    /// A metadata collaborator failed.
    #[error("directory error: {0}")]
    Directory(String),
}

impl Error {
    /// The machine-readable kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidRealm(_) => ErrorKind::InvalidRealm,
            Error::InvalidSearchParameters(_) => ErrorKind::InvalidSearchParameters,
            Error::InvalidSearchExpression(_) => ErrorKind::InvalidSearchExpression,
            Error::Store(_) => ErrorKind::Store,
            Error::Directory(_) => ErrorKind::Directory,
        }
    }

    /// Whether this error originates from the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidRealm
                | ErrorKind::InvalidSearchParameters
                | ErrorKind::InvalidSearchExpression
        )
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Store(e.to_string())
    }
}

/// Result type for search operations.
pub type Result<T> = std::result::Result<T, Error>;
