//! Built-in valence table and modifier word lists.
//!
//! Valences are on the `[-4.0, 4.0]` scale used by VADER-format lexicon files,
//! so a file loaded at runtime replaces this table without rescaling.

/// VADER-format `token<TAB>valence` lines, lowercase tokens, sorted.
pub(crate) const BUILTIN_VALENCES: &str = include_str!("../data/valences.tsv");

/// Intensity modifiers: positive entries amplify, negative entries dampen.
pub(crate) const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", BOOST_INCR),
    ("completely", BOOST_INCR),
    ("deeply", BOOST_INCR),
    ("especially", BOOST_INCR),
    ("extremely", BOOST_INCR),
    ("greatly", BOOST_INCR),
    ("highly", BOOST_INCR),
    ("incredibly", BOOST_INCR),
    ("most", BOOST_INCR),
    ("really", BOOST_INCR),
    ("so", BOOST_INCR),
    ("too", BOOST_INCR),
    ("totally", BOOST_INCR),
    ("truly", BOOST_INCR),
    ("utterly", BOOST_INCR),
    ("very", BOOST_INCR),
    ("almost", BOOST_DECR),
    ("barely", BOOST_DECR),
    ("hardly", BOOST_DECR),
    ("kinda", BOOST_DECR),
    ("less", BOOST_DECR),
    ("marginally", BOOST_DECR),
    ("partly", BOOST_DECR),
    ("scarcely", BOOST_DECR),
    ("slightly", BOOST_DECR),
    ("somewhat", BOOST_DECR),
];

pub(crate) const BOOST_INCR: f64 = 0.293;
pub(crate) const BOOST_DECR: f64 = -0.293;

/// Tokens that flip the polarity of a following sentiment word.
pub(crate) const NEGATORS: &[&str] = &[
    "aint", "arent", "cannot", "cant", "couldnt", "darent", "didnt", "doesnt", "dont", "hadnt",
    "hasnt", "havent", "isnt", "mightnt", "mustnt", "neither", "never", "none", "nope", "nor",
    "not", "nothing", "nowhere", "oughtnt", "shant", "shouldnt", "wasnt", "werent", "without",
    "wont", "wouldnt", "rarely", "seldom", "despite",
];
