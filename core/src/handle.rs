use crate::index::InvertedIndex;
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared access to the current index for concurrent readers.
///
/// Readers take a snapshot and query it without holding the lock. A rebuild or
/// reload produces a new index that is swapped in whole; snapshots already
/// handed out keep the old one alive until they are dropped.
#[derive(Debug)]
pub struct IndexHandle {
    current: RwLock<Arc<InvertedIndex>>,
}

impl IndexHandle {
    pub fn new(index: InvertedIndex) -> Self {
        Self { current: RwLock::new(Arc::new(index)) }
    }

    pub fn snapshot(&self) -> Arc<InvertedIndex> {
        self.current.read().clone()
    }

    /// Install `index` and return the one it replaced.
    pub fn replace(&self, index: InvertedIndex) -> Arc<InvertedIndex> {
        let next = Arc::new(index);
        let prev = std::mem::replace(&mut *self.current.write(), next);
        tracing::debug!(num_docs = self.current.read().num_documents(), "index swapped");
        prev
    }
}
