//! Keyword search core: text normalization, an inverted index with per-document
//! term statistics, BM25 ranking, and an on-disk cache of the built index.

pub mod error;
pub mod handle;
pub mod index;
pub mod persist;
pub mod search;
pub mod stats;
pub mod tokenizer;

pub use error::{Artifact, ErrorKind, IndexError, Result};
pub use handle::IndexHandle;
pub use index::{DocId, Document, InvertedIndex};
pub use search::{Scoring, SearchHit, SearchOptions, DEFAULT_SEARCH_LIMIT};
pub use stats::Bm25Params;
pub use tokenizer::{Normalizer, NormalizerConfig};
