//! Field names shared by the ingest, enrichment and read paths.
//!
//! Every component addresses record fields through these constants so the
//! selection queries, bulk updates and index mapping cannot drift apart.

/// Free-form record text. May be absent or empty.
pub const TEXT: &str = "text";

/// Upstream 0/1 label. Never written by enrichment.
pub const ANTISEMITIC_FLAG: &str = "antisemitic_flag";

/// Canonical weapon terms found in [`TEXT`]. Absent until the first match.
pub const WEAPONS_FOUND: &str = "weapons_found";

/// Compound polarity in `[-1.0, 1.0]`.
pub const SENTIMENT_SCORE: &str = "sentiment_score";

/// `positive`, `negative` or `neutral`. Written together with [`SENTIMENT_SCORE`].
pub const SENTIMENT_LABEL: &str = "sentiment_label";
