//! Keyword-overlap similarity for fun-fact summaries.
//!
//! A summary is reduced to a set of tags: lowercase tokens, stripped of
//! punctuation, minus stop words and very short words, with known variants
//! folded onto a canonical tag (`moth`, `papillon` and `mite` all become
//! `bug_insect`). Two summaries are compared by `|A ∩ B| / min(|A|, |B|)`,
//! so a short summary that is mostly contained in a longer one still scores
//! high.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;

use common::DEFAULT_SIMILARITY_THRESHOLD;

const PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '"', '\'', '(', ')', '-'];

const MIN_KEYWORD_CHARS: usize = 3;

const STOP_WORDS: &[&str] = &[
    // French
    "le", "la", "les", "un", "une", "des", "du", "de", "d", "l",
    "et", "ou", "a", "au", "aux", "en", "dans", "sur", "pour", "par",
    "avec", "sans", "est", "sont", "été", "était", "ce", "cette", "ces",
    "qui", "que", "dont", "où", "quand", "comment", "pourquoi",
    "son", "sa", "ses", "leur", "leurs", "mon", "ma", "mes",
    "il", "elle", "ils", "elles", "on", "nous", "vous",
    "plus", "moins", "très", "bien", "aussi", "comme", "ainsi",
    "premier", "première", "premiers", "premières",
    "avoir", "être", "fait", "faire",
    // English
    "the", "an", "of", "in", "at", "to", "for", "by",
    "with", "from", "is", "are", "was", "were", "been", "be",
    "has", "have", "had", "this", "that", "these", "those",
    "which", "who", "whom", "whose", "when", "where", "why", "how",
    "first", "one", "two", "three",
];

/// Variant -> canonical tag
const SYNONYMS: &[(&str, &str)] = &[
    // bug / insect story
    ("mite", "bug_insect"),
    ("moth", "bug_insect"),
    ("papillon", "bug_insect"),
    ("insecte", "bug_insect"),
    ("bug", "bug_term"),
    ("bogue", "bug_term"),
    ("erreur", "bug_term"),
    ("hopper", "grace_hopper"),
    ("grace", "grace_hopper"),
    ("harvard", "harvard_mark"),
    ("mark", "harvard_mark"),
    ("ordinateur", "computer"),
    ("computer", "computer"),
    ("informatique", "computer"),
    ("machine", "computer"),
    ("origine", "origin"),
    ("origin", "origin"),
    ("histoire", "origin"),
    ("history", "origin"),
    ("naissance", "origin"),
    // decades
    ("1947", "year_1940s"),
    ("1940", "year_1940s"),
    ("1940s", "year_1940s"),
    ("1990", "year_1990s"),
    ("1990s", "year_1990s"),
    ("1995", "year_1990s"),
    ("1996", "year_1990s"),
    ("1997", "year_1990s"),
    ("1998", "year_1990s"),
    ("1999", "year_1990s"),
    ("easter", "easter_egg"),
    ("egg", "easter_egg"),
    ("caché", "easter_egg"),
    ("cache", "easter_egg"),
    ("hidden", "easter_egg"),
    ("secret", "easter_egg"),
    ("simulateur", "simulator_game"),
    ("simulator", "simulator_game"),
    ("jeu", "simulator_game"),
    ("game", "simulator_game"),
    ("vol", "flight_sim"),
    ("flight", "flight_sim"),
    ("excel", "spreadsheet"),
    ("tableur", "spreadsheet"),
    ("spreadsheet", "spreadsheet"),
    ("calc", "spreadsheet"),
    ("microsoft", "microsoft"),
    ("office", "microsoft"),
    ("développeur", "developer"),
    ("developpeur", "developer"),
    ("developer", "developer"),
    ("programmeur", "developer"),
    ("programmer", "developer"),
    ("ingénieur", "developer"),
    ("ingenieur", "developer"),
    ("engineer", "developer"),
    ("email", "email"),
    ("mail", "email"),
    ("courriel", "email"),
    ("courrier", "email"),
    ("internet", "network"),
    ("arpanet", "network"),
    ("réseau", "network"),
    ("reseau", "network"),
    ("network", "network"),
    ("web", "network"),
    ("intelligence", "ai"),
    ("artificielle", "ai"),
    ("artificial", "ai"),
    ("learning", "ai"),
    ("neural", "ai"),
    ("neurone", "ai"),
    ("deep", "ai"),
    ("langage", "programming"),
    ("language", "programming"),
    ("programmation", "programming"),
    ("programming", "programming"),
    ("code", "programming"),
    ("coder", "programming"),
    ("nasa", "space"),
    ("spatial", "space"),
    ("space", "space"),
    ("apollo", "space"),
    ("lune", "space"),
    ("moon", "space"),
    ("fusée", "space"),
    ("rocket", "space"),
    ("cryptographie", "crypto"),
    ("cryptography", "crypto"),
    ("chiffrement", "crypto"),
    ("encryption", "crypto"),
    ("sécurité", "crypto"),
    ("security", "crypto"),
    ("hacker", "crypto"),
    ("pirate", "crypto"),
];

static STOP_WORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

static SYNONYM_MAP: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| SYNONYMS.iter().copied().collect());

/// Canonical tags extracted from one text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet(BTreeSet<String>);

impl KeywordSet {
    pub fn from_text(text: &str) -> Self {
        let lowered = text.to_lowercase();
        let tags = lowered
            .split_whitespace()
            .map(|word| word.trim_matches(PUNCTUATION))
            .filter(|word| !word.is_empty())
            .filter(|word| !STOP_WORD_SET.contains(word))
            .filter(|word| word.chars().count() >= MIN_KEYWORD_CHARS)
            .map(|word| SYNONYM_MAP.get(word).copied().unwrap_or(word).to_string())
            .collect();
        Self(tags)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    /// Shared tags over the size of the smaller set; 0.0 when either is empty.
    pub fn overlap(&self, other: &KeywordSet) -> f64 {
        let smaller = self.len().min(other.len());
        if smaller == 0 {
            return 0.0;
        }
        let common = self.0.intersection(&other.0).count();
        common as f64 / smaller as f64
    }
}

/// Similarity score between two free-text summaries.
pub fn similarity(a: &str, b: &str) -> f64 {
    KeywordSet::from_text(a).overlap(&KeywordSet::from_text(b))
}

/// Scores summaries and classifies them against a threshold.
#[derive(Debug, Clone, Copy)]
pub struct SimilarityEngine {
    threshold: f64,
}

impl Default for SimilarityEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl SimilarityEngine {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn score(&self, a: &str, b: &str) -> f64 {
        similarity(a, b)
    }

    /// Strictly above the threshold.
    pub fn is_similar(&self, score: f64) -> bool {
        score > self.threshold
    }

    /// Index and score of the stored text closest to `candidate`, if any is
    /// similar. Ties go to the earliest entry.
    pub fn best_match<'a, I>(&self, candidate: &str, stored: I) -> Option<(usize, f64)>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let wanted = KeywordSet::from_text(candidate);
        if wanted.is_empty() {
            return None;
        }

        let mut best: Option<(usize, f64)> = None;
        for (index, text) in stored.into_iter().enumerate() {
            let score = wanted.overlap(&KeywordSet::from_text(text));
            if !self.is_similar(score) {
                continue;
            }
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((index, score));
            }
        }
        best
    }
}
