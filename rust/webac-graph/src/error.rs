use thiserror::Error;

/// The common error type used by this crate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WebacGraphError {
    /// No resource exists at the requested identifier
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A string could not be interpreted as a resource identifier
    #[error("Invalid resource identifier: {0}")]
    InvalidIdentifier(String),

    /// The underlying store failed to produce a resource or its triples
    #[error("Storage operation failed: {0}")]
    Storage(String),
}
