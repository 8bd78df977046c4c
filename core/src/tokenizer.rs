use crate::error::{IndexError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    // ASCII punctuation only; `[[:punct:]]` never matches outside ASCII.
    static ref PUNCT: Regex = Regex::new(r"[[:punct:]]+").expect("valid regex");
}

/// Upper bound on re-stemming passes; Porter2 settles within two or three.
const MAX_STEM_PASSES: usize = 8;

/// Built-in English stopwords, compared against the lowercased,
/// punctuation-free surface form (before stemming).
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "a","about","above","after","again","against","all","am","an","and","any","are","as","at",
    "be","because","been","before","being","below","between","both","but","by",
    "can","cannot","could",
    "did","do","does","doing","down","during",
    "each","few","for","from","further",
    "had","has","have","having","he","her","here","hers","herself","him","himself","his","how",
    "i","if","in","into","is","it","its","itself",
    "me","more","most","my","myself",
    "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
    "same","she","should","so","some","such",
    "than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
    "under","until","up","very",
    "was","we","were","what","when","where","which","while","who","whom","why","with","would",
    "you","your","yours","yourself","yourselves"
];

#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    pub stopwords: HashSet<String>,
    /// Apply NFKC compatibility folding before lowercasing.
    pub fold_compatibility: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            stopwords: DEFAULT_STOPWORDS.iter().map(|w| w.to_string()).collect(),
            fold_compatibility: false,
        }
    }
}

impl NormalizerConfig {
    /// Replace the stopword set with the contents of a file holding one word per line.
    pub fn with_stopwords_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| IndexError::Stopwords { path: path.to_path_buf(), source })?;
        self.stopwords = text
            .lines()
            .map(str::trim)
            .map(|w| PUNCT.replace_all(&w.to_lowercase(), "").into_owned())
            .filter(|w| !w.is_empty())
            .collect();
        tracing::debug!(path = %path.display(), count = self.stopwords.len(), "loaded stopwords");
        Ok(self)
    }
}

/// Turns raw text into index tokens: lowercase, strip ASCII punctuation,
/// split on whitespace, drop stopwords, then stem with the English
/// (Porter2) Snowball stemmer.
///
/// A word is stemmed until the stemmer leaves it unchanged, and a stem that is
/// itself a stopword is dropped, so normalizing the joined output of
/// `normalize` yields the same tokens again.
///
/// Immutable once built, so one instance can be shared by every index and query.
pub struct Normalizer {
    stopwords: HashSet<String>,
    stemmer: Stemmer,
    fold_compatibility: bool,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self {
            stopwords: config.stopwords,
            stemmer: Stemmer::create(Algorithm::English),
            fold_compatibility: config.fold_compatibility,
        }
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    pub fn normalize(&self, text: &str) -> Vec<String> {
        let lowered = if self.fold_compatibility {
            text.nfkc().collect::<String>().to_lowercase()
        } else {
            text.to_lowercase()
        };
        let stripped = PUNCT.replace_all(&lowered, "");
        stripped
            .split_whitespace()
            .filter(|word| !self.is_stopword(word))
            .map(|word| self.stem(word))
            .filter(|stem| !self.is_stopword(stem))
            .collect()
    }

    fn stem(&self, word: &str) -> String {
        let mut current = word.to_string();
        for _ in 0..MAX_STEM_PASSES {
            let next = self.stemmer.stem(&current);
            if next == current {
                break;
            }
            current = next.into_owned();
        }
        current
    }

    /// Normalize a term that must yield exactly one token.
    pub fn single_token(&self, term: &str) -> Result<String> {
        let mut tokens = self.normalize(term);
        if tokens.len() != 1 {
            return Err(IndexError::InvalidTerm { term: term.to_string(), tokens });
        }
        Ok(tokens.remove(0))
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizerConfig::default())
    }
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer")
            .field("stopwords", &self.stopwords.len())
            .field("fold_compatibility", &self.fold_compatibility)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inflections_share_a_stem() {
        let t = Normalizer::default().normalize("Searching; searched, searches!");
        assert_eq!(t, vec!["search", "search", "search"]);
    }

    #[test]
    fn stems_that_are_stopwords_are_dropped() {
        let n = Normalizer::default();
        assert!(n.normalize("outs overs").is_empty());
        assert_eq!(n.normalize("outs heist"), vec!["heist"]);
    }

    #[test]
    fn punctuation_only_is_empty() {
        let n = Normalizer::default();
        assert!(n.normalize("?!... --- ,,,").is_empty());
        assert!(n.normalize("").is_empty());
    }

    #[test]
    fn single_token_rejects_zero_and_many() {
        let n = Normalizer::default();
        assert_eq!(n.single_token("Great").unwrap(), "great");
        assert!(matches!(n.single_token("the"), Err(IndexError::InvalidTerm { .. })));
        assert!(matches!(n.single_token("great escape"), Err(IndexError::InvalidTerm { .. })));
    }
}
