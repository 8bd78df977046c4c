//! Term and document statistics over a built [`InvertedIndex`].
//!
//! Public methods take raw terms and normalize them to exactly one token;
//! the `token_*` helpers work on tokens that are already normalized so the
//! query path never stems a stem twice.

use crate::index::{DocId, InvertedIndex};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// BM25 tuning knobs. The defaults give standard BM25 behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    /// Term frequency saturation.
    pub k1: f64,
    /// Strength of document length normalization, 0..=1.
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

impl InvertedIndex {
    pub fn term_frequency(&self, doc_id: DocId, term: &str) -> Result<u32> {
        self.ensure_ready()?;
        let token = self.normalizer().single_token(term)?;
        Ok(self.token_frequency(doc_id, &token))
    }

    pub fn document_frequency(&self, term: &str) -> Result<usize> {
        self.ensure_ready()?;
        let token = self.normalizer().single_token(term)?;
        Ok(self.token_document_frequency(&token))
    }

    /// `ln((N + 1) / (df + 1))`
    pub fn idf(&self, term: &str) -> Result<f64> {
        self.ensure_ready()?;
        let token = self.normalizer().single_token(term)?;
        Ok(self.token_idf(&token))
    }

    /// `ln((N - df + 0.5) / (df + 0.5) + 1)`, left unclamped.
    pub fn bm25_idf(&self, term: &str) -> Result<f64> {
        self.ensure_ready()?;
        let token = self.normalizer().single_token(term)?;
        Ok(self.token_bm25_idf(&token))
    }

    /// Raw term frequency times plain IDF.
    pub fn tf_idf(&self, doc_id: DocId, term: &str) -> Result<f64> {
        self.ensure_ready()?;
        let token = self.normalizer().single_token(term)?;
        Ok(self.token_frequency(doc_id, &token) as f64 * self.token_idf(&token))
    }

    pub fn bm25_term_score(&self, doc_id: DocId, term: &str, params: Bm25Params) -> Result<f64> {
        self.ensure_ready()?;
        let token = self.normalizer().single_token(term)?;
        Ok(self.token_bm25_score(doc_id, &token, params))
    }

    /// Mean normalized length over all documents, 0 for an empty index.
    pub fn average_document_length(&self) -> f64 {
        let lengths = self.doc_lengths();
        if lengths.is_empty() {
            return 0.0;
        }
        let total: u64 = lengths.values().map(|&len| len as u64).sum();
        total as f64 / lengths.len() as f64
    }

    pub(crate) fn token_frequency(&self, doc_id: DocId, token: &str) -> u32 {
        match self.term_frequencies().get(&doc_id) {
            Some(counts) => counts.get(token).copied().unwrap_or(0),
            None => 0,
        }
    }

    pub(crate) fn token_document_frequency(&self, token: &str) -> usize {
        self.postings_for_token(token).map_or(0, |ids| ids.len())
    }

    pub(crate) fn token_idf(&self, token: &str) -> f64 {
        let n = self.num_documents() as f64;
        let df = self.token_document_frequency(token) as f64;
        ((n + 1.0) / (df + 1.0)).ln()
    }

    pub(crate) fn token_bm25_idf(&self, token: &str) -> f64 {
        let n = self.num_documents() as f64;
        let df = self.token_document_frequency(token) as f64;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    pub(crate) fn token_bm25_score(&self, doc_id: DocId, token: &str, params: Bm25Params) -> f64 {
        let tf = self.token_frequency(doc_id, token) as f64;
        if tf == 0.0 {
            return 0.0;
        }
        let avg_len = self.average_document_length();
        let length_norm = if avg_len > 0.0 {
            let doc_len = self.document_length(doc_id).unwrap_or(0) as f64;
            1.0 - params.b + params.b * (doc_len / avg_len)
        } else {
            1.0
        };
        tf * (params.k1 + 1.0) / (tf + params.k1 * length_norm)
    }
}
