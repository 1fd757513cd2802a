use thiserror::Error;

/// Everything that can abort a deployment command.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Unknown network, missing endpoint or credential, or a network that
    /// doesn't match its declared chain id.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A required positional argument is missing or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("artifact for {name} not found: {reason}")]
    ArtifactNotFound { name: String, reason: String },

    /// Submission or confirmation of the creation transaction failed.
    #[error("deployment failed: {0}")]
    Deployment(String),

    #[error("failed to write deployment report: {0}")]
    Report(#[from] std::io::Error),
}

impl DeployError {
    pub fn artifact_not_found(name: &str, reason: impl ToString) -> Self {
        Self::ArtifactNotFound {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}
