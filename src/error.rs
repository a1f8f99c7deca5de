use thiserror::Error;

pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authentik API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Cannot find group {0} in Authentik")]
    GroupNotFound(String),

    #[error("Cannot find username: {0}")]
    AttributeResolution(String),

    #[error("Unable to find username in profile")]
    MissingUsername,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SyncError {
    pub fn missing_var(name: &str) -> Self {
        Self::Config(format!("{name} not defined"))
    }

    /// Errors scoped to a single group member. These are logged and skipped
    /// at the member boundary; everything else fails the whole resolution.
    pub fn is_member_scoped(&self) -> bool {
        matches!(self, Self::AttributeResolution(_) | Self::MissingUsername)
    }
}
