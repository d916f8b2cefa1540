use std::path::Path;
use std::time::Duration;

use serde_json::Value;

use crate::error::LoaderError;
use crate::readers::{read_csv, read_json, read_ndjson, rows_from_value};
use crate::source::SourceKind;
use crate::Row;

/// Reads rows from files or HTTP endpoints.
#[derive(Debug, Clone)]
pub struct Loader {
    http: reqwest::Client,
}

impl Loader {
    /// # Errors
    ///
    /// Returns [`LoaderError::Http`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, LoaderError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("sentinel/0.1 (corpus-ingest)")
            .build()?;
        Ok(Self { http })
    }

    /// Load every row from `source`, inferring its kind unless one is given.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::UnknownSourceKind`] or
    /// [`LoaderError::UnsupportedSource`] before touching the source, and
    /// read/parse errors afterwards.
    pub async fn load(
        &self,
        source: &str,
        kind: Option<SourceKind>,
    ) -> Result<Vec<Row>, LoaderError> {
        let kind = match kind {
            Some(kind) => kind,
            None => SourceKind::infer(source)?,
        };
        if !kind.is_supported() {
            return Err(LoaderError::UnsupportedSource(kind));
        }

        let rows = match kind {
            SourceKind::Csv => {
                let file = std::fs::File::open(source).map_err(|e| io_error(source, e))?;
                read_csv(std::io::BufReader::new(file))?
            }
            SourceKind::Json => read_json(&read_text(source)?, source)?,
            SourceKind::NdJson => read_ndjson(&read_text(source)?, source)?,
            SourceKind::Api => self.fetch(source).await?,
            SourceKind::Excel | SourceKind::Parquet | SourceKind::Sql => {
                return Err(LoaderError::UnsupportedSource(kind))
            }
        };
        tracing::info!(source, %kind, rows = rows.len(), "loaded source");
        Ok(rows)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<Row>, LoaderError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoaderError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let text = response.text().await?;
        let value: Value = serde_json::from_str(&text).map_err(|source| LoaderError::Json {
            context: url.to_string(),
            source,
        })?;
        rows_from_value(value, url)
    }
}

fn read_text(path: &str) -> Result<String, LoaderError> {
    std::fs::read_to_string(path).map_err(|e| io_error(path, e))
}

fn io_error(path: &str, source: std::io::Error) -> LoaderError {
    LoaderError::Io {
        path: Path::new(path).to_path_buf(),
        source,
    }
}
