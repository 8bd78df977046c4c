use crate::error::{IndexError, Result};
use crate::tokenizer::Normalizer;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

pub type DocId = u32;

/// Token -> ids of the documents containing it.
pub type Postings = BTreeMap<String, BTreeSet<DocId>>;
/// Document id -> token -> occurrences in that document.
pub type TermFrequencies = BTreeMap<DocId, BTreeMap<String, u32>>;
/// Document id -> normalized token count, repeats included.
pub type DocLengths = BTreeMap<DocId, u32>;
pub type DocMap = BTreeMap<DocId, Document>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub title: String,
    #[serde(default, alias = "description")]
    pub body: String,
    /// Any other fields of the source record, carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Document {
    pub fn new(id: DocId, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self { id, title: title.into(), body: body.into(), extra: serde_json::Map::new() }
    }

    /// Text that gets indexed for this document: title and body joined by a space.
    pub fn indexed_text(&self) -> String {
        format!("{} {}", self.title, self.body)
    }
}

/// In-memory inverted index over a document collection.
///
/// All four tables are filled by a single [`InvertedIndex::build`] pass (or
/// restored by [`crate::persist::load_index`]) and are read-only afterwards.
#[derive(Debug)]
pub struct InvertedIndex {
    normalizer: Arc<Normalizer>,
    postings: Postings,
    docs: DocMap,
    term_frequencies: TermFrequencies,
    doc_lengths: DocLengths,
    ready: bool,
}

impl InvertedIndex {
    pub fn new(normalizer: Arc<Normalizer>) -> Self {
        Self {
            normalizer,
            postings: Postings::new(),
            docs: DocMap::new(),
            term_frequencies: TermFrequencies::new(),
            doc_lengths: DocLengths::new(),
            ready: false,
        }
    }

    /// Reassemble an index from its persisted tables, checking that they agree.
    pub(crate) fn from_parts(
        normalizer: Arc<Normalizer>,
        postings: Postings,
        docs: DocMap,
        term_frequencies: TermFrequencies,
        doc_lengths: DocLengths,
    ) -> Result<Self> {
        let index = Self { normalizer, postings, docs, term_frequencies, doc_lengths, ready: true };
        index.validate()?;
        Ok(index)
    }

    pub fn normalizer(&self) -> &Arc<Normalizer> {
        &self.normalizer
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn postings(&self) -> &Postings {
        &self.postings
    }

    pub fn docs(&self) -> &DocMap {
        &self.docs
    }

    pub fn term_frequencies(&self) -> &TermFrequencies {
        &self.term_frequencies
    }

    pub fn doc_lengths(&self) -> &DocLengths {
        &self.doc_lengths
    }

    pub fn num_documents(&self) -> usize {
        self.docs.len()
    }

    pub fn num_terms(&self) -> usize {
        self.postings.len()
    }

    pub fn document(&self, doc_id: DocId) -> Option<&Document> {
        self.docs.get(&doc_id)
    }

    pub fn document_length(&self, doc_id: DocId) -> Option<u32> {
        self.doc_lengths.get(&doc_id).copied()
    }

    pub(crate) fn ensure_ready(&self) -> Result<()> {
        if self.ready {
            Ok(())
        } else {
            Err(IndexError::NotReady)
        }
    }

    pub(crate) fn postings_for_token(&self, token: &str) -> Option<&BTreeSet<DocId>> {
        self.postings.get(token)
    }

    fn clear(&mut self) {
        self.postings.clear();
        self.docs.clear();
        self.term_frequencies.clear();
        self.doc_lengths.clear();
        self.ready = false;
    }

    /// Index `text` under `doc_id`. Does not touch the document map.
    pub(crate) fn add_document(&mut self, doc_id: DocId, text: &str) -> Result<()> {
        if self.doc_lengths.contains_key(&doc_id) {
            return Err(IndexError::DuplicateDocument(doc_id));
        }
        let tokens = self.normalizer.normalize(text);
        let mut counts: BTreeMap<String, u32> = BTreeMap::new();
        for token in &tokens {
            match counts.get_mut(token) {
                Some(count) => *count += 1,
                None => {
                    counts.insert(token.clone(), 1);
                }
            }
        }
        for token in counts.keys() {
            match self.postings.get_mut(token) {
                Some(ids) => {
                    ids.insert(doc_id);
                }
                None => {
                    self.postings.insert(token.clone(), BTreeSet::from([doc_id]));
                }
            }
        }
        self.term_frequencies.insert(doc_id, counts);
        self.doc_lengths.insert(doc_id, tokens.len() as u32);
        Ok(())
    }

    /// Rebuild every table from scratch over `documents`.
    ///
    /// Duplicate ids are rejected before anything is reset, so a failed build
    /// leaves the previous index untouched.
    pub fn build<I>(&mut self, documents: I) -> Result<()>
    where
        I: IntoIterator<Item = Document>,
    {
        let documents: Vec<Document> = documents.into_iter().collect();
        let mut seen: HashSet<DocId> = HashSet::with_capacity(documents.len());
        for doc in &documents {
            if !seen.insert(doc.id) {
                return Err(IndexError::DuplicateDocument(doc.id));
            }
        }

        self.clear();
        for doc in documents {
            self.add_document(doc.id, &doc.indexed_text())?;
            self.docs.insert(doc.id, doc);
        }
        self.ready = true;
        tracing::info!(
            num_docs = self.docs.len(),
            num_terms = self.postings.len(),
            "index build complete"
        );
        Ok(())
    }

    /// Sorted ids of the documents containing `term`, which must normalize to one token.
    pub fn documents_for(&self, term: &str) -> Result<Vec<DocId>> {
        self.ensure_ready()?;
        let token = self.normalizer.single_token(term)?;
        Ok(self
            .postings_for_token(&token)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default())
    }

    fn validate(&self) -> Result<()> {
        let doc_ids: BTreeSet<DocId> = self.docs.keys().copied().collect();
        if !self.term_frequencies.keys().copied().eq(doc_ids.iter().copied()) {
            return Err(IndexError::Inconsistent(
                "term frequency table keys differ from document map".into(),
            ));
        }
        if !self.doc_lengths.keys().copied().eq(doc_ids.iter().copied()) {
            return Err(IndexError::Inconsistent(
                "document length table keys differ from document map".into(),
            ));
        }
        for (token, ids) in &self.postings {
            if let Some(missing) = ids.iter().find(|id| !doc_ids.contains(id)) {
                return Err(IndexError::Inconsistent(format!(
                    "posting for {token:?} references unknown document {missing}"
                )));
            }
        }
        Ok(())
    }
}
