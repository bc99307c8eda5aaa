use thiserror::Error;

pub type Result<T> = std::result::Result<T, VizError>;

#[derive(Error, Debug)]
pub enum VizError {
    #[error("Repository open error: {0}")]
    RepositoryOpen(String),
    #[error("Head resolution error: {0}")]
    HeadResolution(String),
    #[error("Log traversal error: {0}")]
    LogTraversal(String),
    #[error("Change computation error: {0}")]
    ChangeComputation(String),
    #[error("Patch error: {0}")]
    Patch(String),
    #[error("Reference enumeration error: {0}")]
    ReferenceEnumeration(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl VizError {
    /// Whether the failure only affects a single diff entry and the load may continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, VizError::Patch(_))
    }
}
