//! Canonical weapon-term vocabulary.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Ordered list of canonical terms plus a set for O(1) canonical lookup.
///
/// Terms are lowercase, trimmed and non-empty. Repeated lines in the source
/// file stay in [`Vocabulary::terms`]; lookups use set semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    terms: Vec<String>,
    index: HashSet<String>,
}

/// Why a vocabulary load fell back to the empty vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VocabularyWarning {
    #[error("weapons vocabulary not found at {0}")]
    NotFound(PathBuf),

    #[error("weapons vocabulary at {path} could not be read: {reason}")]
    Unreadable { path: PathBuf, reason: String },
}

/// Outcome of [`Vocabulary::load`]. Always carries a usable vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyLoad {
    pub vocabulary: Vocabulary,
    pub warning: Option<VocabularyWarning>,
}

/// Lowercase and trim a candidate term.
pub(crate) fn normalize(term: &str) -> String {
    term.trim().to_lowercase()
}

impl Vocabulary {
    /// Build a vocabulary from raw terms, normalizing each and dropping blanks.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms: Vec<String> = terms
            .into_iter()
            .map(|t| normalize(t.as_ref()))
            .filter(|t| !t.is_empty())
            .collect();
        let index = terms.iter().cloned().collect();
        Self { terms, index }
    }

    /// Read one term per line from `path`.
    ///
    /// Never fails: a missing or unreadable file yields an empty vocabulary
    /// and a warning, which is also logged.
    #[must_use]
    pub fn load(path: &Path) -> VocabularyLoad {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let vocabulary = Self::from_terms(contents.lines());
                tracing::info!(
                    path = %path.display(),
                    terms = vocabulary.len(),
                    "loaded weapons vocabulary"
                );
                VocabularyLoad {
                    vocabulary,
                    warning: None,
                }
            }
            Err(e) => {
                let warning = if e.kind() == ErrorKind::NotFound {
                    VocabularyWarning::NotFound(path.to_path_buf())
                } else {
                    VocabularyWarning::Unreadable {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    }
                };
                tracing::warn!(%warning, "continuing with an empty weapons vocabulary");
                VocabularyLoad {
                    vocabulary: Self::default(),
                    warning: Some(warning),
                }
            }
        }
    }

    #[must_use]
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The canonical entry equal to `candidate` after normalization, if any.
    #[must_use]
    pub fn canonical(&self, candidate: &str) -> Option<&str> {
        self.index.get(&normalize(candidate)).map(String::as_str)
    }
}
