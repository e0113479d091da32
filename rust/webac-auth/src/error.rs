use thiserror::Error;
use webac_graph::WebacGraphError;

/// The common error type used by this crate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WebacAuthError {
    /// The resource graph failed while resolving ACLs or reading triples
    #[error("Resource graph operation failed: {0}")]
    Graph(String),

    /// An Authorization names an agent group that does not exist
    #[error("Agent group not found: {0}")]
    GroupNotFound(String),

    /// An administrator presented more than one delegated principal
    #[error("Too many delegated principals: expected at most 1, got {0}")]
    TooManyDelegates(usize),

    /// Configuration could not be read or interpreted
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A request target could not be mapped onto a resource identifier
    #[error("Invalid request target: {0}")]
    InvalidTarget(String),
}

impl From<WebacGraphError> for WebacAuthError {
    fn from(value: WebacGraphError) -> Self {
        WebacAuthError::Graph(format!("{value}"))
    }
}

impl From<serde_json::Error> for WebacAuthError {
    fn from(value: serde_json::Error) -> Self {
        WebacAuthError::Config(format!("{value}"))
    }
}

impl From<std::io::Error> for WebacAuthError {
    fn from(value: std::io::Error) -> Self {
        WebacAuthError::Config(format!("Could not read configuration: {value}"))
    }
}
