use crate::DocId;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Named pieces of the on-disk cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Directory,
    Index,
    DocMap,
    TermFrequencies,
    DocLengths,
    Meta,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Artifact::Directory => "cache directory",
            Artifact::Index => "inverted index",
            Artifact::DocMap => "document map",
            Artifact::TermFrequencies => "term frequency table",
            Artifact::DocLengths => "document length table",
            Artifact::Meta => "index metadata",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceCause {
    #[error("io: {0}")]
    Io(#[from] io::Error),
    #[error("binary encoding: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("json encoding: {0}")]
    Json(#[from] serde_json::Error),
}

/// Broad category of an [`IndexError`], for callers that only need to decide
/// how to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Persistence,
    Precondition,
    Consistency,
}

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("expected exactly one token for {term:?}, got {tokens:?}")]
    InvalidTerm { term: String, tokens: Vec<String> },

    #[error("document id {0} appears more than once in the input")]
    DuplicateDocument(DocId),

    #[error("{artifact} at {}: {source}", path.display())]
    Persistence {
        artifact: Artifact,
        path: PathBuf,
        #[source]
        source: PersistenceCause,
    },

    #[error("no index has been built or loaded")]
    NotReady,

    #[error("index is inconsistent: {0}")]
    Inconsistent(String),

    #[error("reading stopwords from {}: {source}", path.display())]
    Stopwords {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl IndexError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IndexError::InvalidTerm { .. } | IndexError::DuplicateDocument(_) => ErrorKind::Input,
            IndexError::Persistence { .. } | IndexError::Stopwords { .. } => ErrorKind::Persistence,
            IndexError::NotReady => ErrorKind::Precondition,
            IndexError::Inconsistent(_) => ErrorKind::Consistency,
        }
    }

    pub(crate) fn persistence(
        artifact: Artifact,
        path: impl Into<PathBuf>,
        source: impl Into<PersistenceCause>,
    ) -> Self {
        IndexError::Persistence { artifact, path: path.into(), source: source.into() }
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;
