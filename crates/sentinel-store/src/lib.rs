//! Document-store access for Sentinel.
//!
//! [`DocumentStore`] is the seam the enrichment engine and the read API are
//! written against; [`EsClient`] implements it over the Elasticsearch REST
//! API. Queries are built with the typed DSL in [`query`] and rendered to
//! JSON only at the HTTP boundary.

pub mod api_queries;
pub mod error;
pub mod query;
pub mod types;

mod bulk;
mod client;
mod retry;
mod scan;
mod store;

pub use client::{ClientOptions, EsClient};
pub use error::StoreError;
pub use query::{BoolQuery, Highlight, Query, SearchRequest, SourceFilter};
pub use scan::Scan;
pub use store::DocumentStore;
pub use types::{BulkFailure, BulkOutcome, Hit, ScrollPage, UpdateOp};
