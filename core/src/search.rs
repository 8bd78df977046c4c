use crate::error::{IndexError, Result};
use crate::index::{DocId, Document, InvertedIndex};
use crate::stats::Bm25Params;
use std::collections::BTreeSet;

pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// How each query token is weighted by rarity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scoring {
    /// BM25 term score times BM25 IDF.
    #[default]
    Bm25,
    /// BM25 term score times plain `ln((N + 1) / (df + 1))`. Kept for
    /// comparison with older rankings.
    LegacyIdf,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    pub limit: usize,
    pub params: Bm25Params,
    pub scoring: Scoring,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { limit: DEFAULT_SEARCH_LIMIT, params: Bm25Params::default(), scoring: Scoring::default() }
    }
}

impl SearchOptions {
    pub fn with_limit(limit: usize) -> Self {
        Self { limit, ..Self::default() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit<'a> {
    pub doc_id: DocId,
    pub score: f64,
    pub document: &'a Document,
}

impl InvertedIndex {
    /// Top `limit` documents for `query`, most relevant first.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<&Document>> {
        let hits = self.search_with(query, &SearchOptions::with_limit(limit))?;
        Ok(hits.into_iter().map(|hit| hit.document).collect())
    }

    /// Ranked hits for `query`. Candidates are the union of the query tokens'
    /// postings; ties on score go to the lower document id.
    pub fn search_with(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchHit<'_>>> {
        self.ensure_ready()?;
        let tokens = self.normalizer().normalize(query);
        if tokens.is_empty() || options.limit == 0 {
            return Ok(Vec::new());
        }

        let mut candidates: BTreeSet<DocId> = BTreeSet::new();
        for token in &tokens {
            if let Some(ids) = self.postings_for_token(token) {
                candidates.extend(ids.iter().copied());
            }
        }
        tracing::debug!(query, tokens = tokens.len(), candidates = candidates.len(), "scoring candidates");

        let weights: Vec<f64> = tokens
            .iter()
            .map(|token| match options.scoring {
                Scoring::Bm25 => self.token_bm25_idf(token),
                Scoring::LegacyIdf => self.token_idf(token),
            })
            .collect();

        let mut scored: Vec<(DocId, f64)> = candidates
            .into_iter()
            .map(|doc_id| {
                let score = tokens
                    .iter()
                    .zip(&weights)
                    .map(|(token, weight)| self.token_bm25_score(doc_id, token, options.params) * weight)
                    .sum::<f64>();
                (doc_id, score)
            })
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        scored.truncate(options.limit);

        scored
            .into_iter()
            .map(|(doc_id, score)| {
                let document = self
                    .document(doc_id)
                    .ok_or_else(|| IndexError::Inconsistent(format!("posting references unknown document {doc_id}")))?;
                Ok(SearchHit { doc_id, score, document })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Normalizer;
    use std::sync::Arc;

    fn corpus() -> InvertedIndex {
        let mut idx = InvertedIndex::new(Arc::new(Normalizer::default()));
        idx.build(vec![
            Document::new(1, "Rust", "fast systems language"),
            Document::new(2, "Rust Rust", "rust everywhere"),
            Document::new(3, "Gardening", "soil and compost"),
            Document::new(4, "Systems", "operating systems design"),
        ])
        .unwrap();
        idx
    }

    #[test]
    fn higher_term_frequency_ranks_first() {
        let idx = corpus();
        let hits = idx.search_with("rust", &SearchOptions::default()).unwrap();
        let ids: Vec<DocId> = hits.iter().map(|h| h.doc_id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn union_includes_partial_matches() {
        let idx = corpus();
        let ids: Vec<DocId> = idx.search("rust compost", 10).unwrap().iter().map(|d| d.id).collect();
        assert!(ids.contains(&3));
        assert!(ids.contains(&1));
        assert!(ids.contains(&2));
        assert!(!ids.contains(&4));
    }

    #[test]
    fn zero_limit_and_stopword_queries_are_empty() {
        let idx = corpus();
        assert!(idx.search("rust", 0).unwrap().is_empty());
        assert!(idx.search("the and of", 5).unwrap().is_empty());
    }

    #[test]
    fn legacy_scoring_keeps_candidates() {
        let idx = corpus();
        let options = SearchOptions { scoring: Scoring::LegacyIdf, ..SearchOptions::default() };
        let hits = idx.search_with("systems", &options).unwrap();
        let ids: Vec<DocId> = hits.iter().map(|h| h.doc_id).collect();
        assert_eq!(ids, vec![4, 1]);
    }

    #[test]
    fn search_before_build_is_an_error() {
        let idx = InvertedIndex::new(Arc::new(Normalizer::default()));
        assert!(matches!(idx.search("rust", 5), Err(IndexError::NotReady)));
    }
}
