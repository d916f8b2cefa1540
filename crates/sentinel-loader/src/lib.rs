//! Tabular ingest: turn CSV, JSON, NDJSON files and JSON HTTP endpoints into
//! rows, and rows into the records the enrichment engine works on.

pub mod error;
pub mod readers;
pub mod record;
pub mod source;

mod loader;

use serde_json::{Map, Value};

pub use error::LoaderError;
pub use loader::Loader;
pub use record::RecordMapping;
pub use source::SourceKind;

/// One loaded row: column name to cell value.
pub type Row = Map<String, Value>;
