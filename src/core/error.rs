use std::io;

/// Message shown to the operator for any provider-side failure.
pub const PROVIDER_UNREACHABLE_MESSAGE: &str =
    "Unable to reach OSINT intelligence servers. Check your connection.";

#[derive(thiserror::Error, Debug)]
pub enum OsintError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("provider unreachable: {0}")]
    ProviderUnreachable(String),
    #[error("malformed provider response: {0}")]
    MalformedProviderResponse(String),
    #[error("timeout")]
    Timeout,
    #[error("config error: {0}")]
    Config(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("export error: {0}")]
    Export(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl OsintError {
    /// True for every failure that originates at the report provider.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            OsintError::ProviderUnreachable(_)
                | OsintError::MalformedProviderResponse(_)
                | OsintError::Timeout
        )
    }

    /// Stable categorical message for the operator; provider details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            OsintError::Validation(reason) => reason.clone(),
            e if e.is_provider_failure() => PROVIDER_UNREACHABLE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for OsintError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OsintError::Timeout
        } else if err.is_decode() {
            OsintError::MalformedProviderResponse(err.to_string())
        } else {
            OsintError::ProviderUnreachable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for OsintError {
    fn from(err: serde_json::Error) -> Self {
        OsintError::MalformedProviderResponse(err.to_string())
    }
}
