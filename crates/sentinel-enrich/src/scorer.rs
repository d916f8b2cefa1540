//! Lexicon-based sentiment scoring with VADER-style valence rules.

use std::collections::HashMap;
use std::path::Path;

use sentinel_core::SentimentLabel;

use crate::error::EnrichError;
use crate::lexicon::{BOOSTERS, BUILTIN_VALENCES, NEGATORS};

const CAPS_INCR: f64 = 0.733;
const NEGATION_SCALAR: f64 = -0.74;
const BUT_BEFORE: f64 = 0.5;
const BUT_AFTER: f64 = 1.5;
const EXCLAMATION_INCR: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;
const QUESTION_INCR: f64 = 0.18;
const MAX_QUESTION_EMPHASIS: f64 = 0.96;
const NORMALIZATION_ALPHA: f64 = 15.0;

/// Maps text to a compound polarity score in `[-1.0, 1.0]`.
#[derive(Debug, Clone)]
pub struct SentimentScorer {
    lexicon: HashMap<String, f64>,
}

impl Default for SentimentScorer {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SentimentScorer {
    /// Scorer backed by the compiled-in valence table.
    #[must_use]
    pub fn builtin() -> Self {
        let mut lexicon = HashMap::new();
        for (n, line) in BUILTIN_VALENCES.lines().enumerate() {
            match parse_line(line) {
                Ok(Some((token, valence))) => {
                    lexicon.insert(token, valence);
                }
                Ok(None) => {}
                Err(reason) => {
                    tracing::warn!(line = n + 1, %reason, "skipping built-in lexicon line");
                }
            }
        }
        Self { lexicon }
    }

    /// Load a VADER-format lexicon: `token<TAB>mean[<TAB>...]` per line.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::LexiconRead`] if the file cannot be read and
    /// [`EnrichError::LexiconFormat`] for a line without a numeric mean.
    pub fn from_vader_file(path: &Path) -> Result<Self, EnrichError> {
        let contents = std::fs::read_to_string(path).map_err(|source| EnrichError::LexiconRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_vader_str(&contents).map_err(|(line, reason)| EnrichError::LexiconFormat {
            path: path.to_path_buf(),
            line,
            reason,
        })
    }

    fn from_vader_str(contents: &str) -> Result<Self, (usize, String)> {
        let mut lexicon = HashMap::new();
        for (n, line) in contents.lines().enumerate() {
            if let Some((token, valence)) = parse_line(line).map_err(|reason| (n + 1, reason))? {
                lexicon.insert(token, valence);
            }
        }
        Ok(Self { lexicon })
    }

    /// Built-in scorer, or the lexicon file at `path` when one is configured.
    ///
    /// # Errors
    ///
    /// Propagates [`SentimentScorer::from_vader_file`] errors.
    pub fn from_optional_path(path: Option<&Path>) -> Result<Self, EnrichError> {
        match path {
            Some(path) => {
                let scorer = Self::from_vader_file(path)?;
                tracing::info!(
                    path = %path.display(),
                    tokens = scorer.lexicon.len(),
                    "loaded sentiment lexicon"
                );
                Ok(scorer)
            }
            None => Ok(Self::builtin()),
        }
    }

    /// Compound score rounded to four decimals. Absent or blank text scores `0.0`.
    #[must_use]
    pub fn score(&self, text: Option<&str>) -> f64 {
        let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
            return 0.0;
        };

        let tokens = tokenize(text);
        let lower: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
        let caps_differ = {
            let caps = tokens.iter().filter(|t| is_all_caps(t)).count();
            caps > 0 && caps < tokens.len()
        };

        let mut valences: Vec<f64> = (0..tokens.len())
            .map(|i| self.valence_at(i, &tokens, &lower, caps_differ))
            .collect();

        if let Some(pivot) = lower.iter().position(|w| w == "but") {
            for (i, v) in valences.iter_mut().enumerate() {
                if i < pivot {
                    *v *= BUT_BEFORE;
                } else if i > pivot {
                    *v *= BUT_AFTER;
                }
            }
        }

        let sum: f64 = valences.iter().sum();
        let emphasis = punctuation_emphasis(text);
        let sum = if sum > 0.0 {
            sum + emphasis
        } else if sum < 0.0 {
            sum - emphasis
        } else {
            sum
        };
        round4(normalize(sum))
    }

    #[must_use]
    pub fn label(compound: f64) -> SentimentLabel {
        SentimentLabel::from_compound(compound)
    }

    /// Score and label in one call.
    #[must_use]
    pub fn assess(&self, text: Option<&str>) -> (f64, SentimentLabel) {
        let compound = self.score(text);
        (compound, Self::label(compound))
    }

    fn valence_at(&self, i: usize, tokens: &[&str], lower: &[String], caps_differ: bool) -> f64 {
        let word = lower[i].as_str();
        if booster(word).is_some() {
            return 0.0;
        }
        let next = lower.get(i + 1).map(String::as_str);
        if word == "kind" && next == Some("of") {
            return 0.0;
        }
        let Some(&base) = self.lexicon.get(word) else {
            return 0.0;
        };
        // "no" before a sentiment word acts as a negator only.
        if word == "no" && next.is_some_and(|n| self.lexicon.contains_key(n)) {
            return 0.0;
        }

        let mut valence = base;
        if caps_differ && is_all_caps(tokens[i]) {
            if valence > 0.0 {
                valence += CAPS_INCR;
            } else {
                valence -= CAPS_INCR;
            }
        }

        for distance in 1..=3 {
            let Some(j) = i.checked_sub(distance) else {
                break;
            };
            let prev = lower[j].as_str();
            if !self.lexicon.contains_key(prev) || prev == "no" {
                let damping = match distance {
                    1 => 1.0,
                    2 => 0.95,
                    _ => 0.9,
                };
                valence += boost(prev, tokens[j], valence, caps_differ) * damping;
            }
            if is_negator(prev) {
                valence *= NEGATION_SCALAR;
            }
        }
        valence
    }
}

/// One lexicon line: `token<TAB>mean[<TAB>...]`. Blank lines yield `None`.
fn parse_line(line: &str) -> Result<Option<(String, f64)>, String> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    let mut columns = line.split('\t');
    let token = columns.next().unwrap_or_default().trim();
    let mean = columns
        .next()
        .ok_or_else(|| "missing valence column".to_string())?;
    let mean: f64 = mean
        .trim()
        .parse()
        .map_err(|e| format!("invalid valence {mean:?}: {e}"))?;
    Ok(Some((token.to_lowercase(), mean)))
}

/// Whitespace tokens with edge punctuation removed. Single-character tokens
/// are dropped; tokens made only of punctuation (emoticons) are kept whole.
fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .filter_map(|raw| {
            let stripped = raw.trim_matches(|c: char| c.is_ascii_punctuation());
            let token = if stripped.is_empty() { raw } else { stripped };
            (token.chars().count() > 1).then_some(token)
        })
        .collect()
}

fn is_all_caps(token: &str) -> bool {
    token.chars().any(char::is_alphabetic) && !token.chars().any(char::is_lowercase)
}

fn booster(word: &str) -> Option<f64> {
    BOOSTERS
        .iter()
        .find_map(|&(b, scalar)| (b == word).then_some(scalar))
}

fn is_negator(word: &str) -> bool {
    word == "no" || word.contains("n't") || NEGATORS.contains(&word)
}

/// Intensity added by a booster word preceding a sentiment word.
fn boost(lower: &str, raw: &str, valence: f64, caps_differ: bool) -> f64 {
    let Some(mut scalar) = booster(lower) else {
        return 0.0;
    };
    if valence < 0.0 {
        scalar = -scalar;
    }
    if caps_differ && is_all_caps(raw) {
        if valence > 0.0 {
            scalar += CAPS_INCR;
        } else {
            scalar -= CAPS_INCR;
        }
    }
    scalar
}

#[allow(clippy::cast_precision_loss)]
fn punctuation_emphasis(text: &str) -> f64 {
    let exclamations = text.matches('!').count().min(MAX_EXCLAMATIONS);
    let questions = text.matches('?').count();
    let question_emphasis = match questions {
        0 | 1 => 0.0,
        2 | 3 => questions as f64 * QUESTION_INCR,
        _ => MAX_QUESTION_EMPHASIS,
    };
    exclamations as f64 * EXCLAMATION_INCR + question_emphasis
}

fn normalize(sum: f64) -> f64 {
    (sum / (sum * sum + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
