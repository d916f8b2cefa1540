use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::LoaderError;

/// Where rows come from.
///
/// `Excel`, `Parquet` and `Sql` are recognized so they fail with a clear
/// [`LoaderError::UnsupportedSource`] instead of a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Csv,
    Json,
    NdJson,
    Api,
    Excel,
    Parquet,
    Sql,
}

impl SourceKind {
    /// Infer the kind from a URL scheme or file extension.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::UnknownSourceKind`] when neither identifies a kind.
    pub fn infer(source: &str) -> Result<Self, LoaderError> {
        let lower = source.trim().to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(Self::Api);
        }
        for scheme in ["mysql://", "postgres://", "postgresql://", "sqlite://"] {
            if lower.starts_with(scheme) {
                return Ok(Self::Sql);
            }
        }

        let extension = Path::new(&lower)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        match extension {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "ndjson" | "jsonl" => Ok(Self::NdJson),
            "xls" | "xlsx" => Ok(Self::Excel),
            "parquet" => Ok(Self::Parquet),
            "db" | "sqlite" => Ok(Self::Sql),
            _ => Err(LoaderError::UnknownSourceKind(source.to_string())),
        }
    }

    #[must_use]
    pub fn is_supported(self) -> bool {
        matches!(self, Self::Csv | Self::Json | Self::NdJson | Self::Api)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::NdJson => "ndjson",
            Self::Api => "api",
            Self::Excel => "excel",
            Self::Parquet => "parquet",
            Self::Sql => "sql",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = LoaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "ndjson" | "jsonl" => Ok(Self::NdJson),
            "api" => Ok(Self::Api),
            "excel" | "xls" | "xlsx" => Ok(Self::Excel),
            "parquet" => Ok(Self::Parquet),
            "sql" | "mysql" | "postgres" | "postgresql" | "sqlite" => Ok(Self::Sql),
            _ => Err(LoaderError::UnknownSourceKind(s.to_string())),
        }
    }
}
