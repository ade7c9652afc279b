use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The offers endpoint answered with a non-2xx status. `body` is the raw
    /// response text, kept for diagnostics.
    #[error("offers endpoint returned HTTP {status} for region {region}")]
    Remote {
        region: String,
        status: u16,
        body: String,
    },

    #[error("invalid offers endpoint \"{endpoint}\": {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

impl FetchError {
    /// HTTP status for [`FetchError::Remote`], `None` for every other variant.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}
