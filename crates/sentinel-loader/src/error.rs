use std::path::PathBuf;

use thiserror::Error;

use crate::source::SourceKind;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("cannot infer source kind for '{0}'")]
    UnknownSourceKind(String),

    #[error("{0} sources are not supported")]
    UnsupportedSource(SourceKind),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error in {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    HttpStatus { url: String, status: u16 },

    /// Parsed data did not have a row-shaped structure.
    #[error("unexpected data shape in {context}: {reason}")]
    Shape { context: String, reason: String },
}
