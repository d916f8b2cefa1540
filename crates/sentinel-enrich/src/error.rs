use std::path::PathBuf;

use thiserror::Error;

use sentinel_store::StoreError;

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("failed to read sentiment lexicon {path}: {source}")]
    LexiconRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed sentiment lexicon {path} at line {line}: {reason}")]
    LexiconFormat {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}
