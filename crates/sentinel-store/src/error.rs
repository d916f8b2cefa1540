use thiserror::Error;

/// Errors returned by the document-store client.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("store returned status {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A request body could not be encoded.
    #[error("JSON encoding error for {context}: {source}")]
    Encode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid store URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl StoreError {
    /// HTTP status associated with the failure, when the store answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Api { status, .. } => Some(*status),
            Self::Deserialize { .. } | Self::Encode { .. } | Self::InvalidUrl { .. } => None,
        }
    }
}
