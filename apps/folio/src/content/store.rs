//! ContentStore: the loaded document, held for the lifetime of the process.
//!
//! The loader is the only writer. Readers either query `current()` or subscribe
//! to the ready signal; the signal is not replayed to late subscribers.

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use crate::models::ContentDocument;

const READY_CHANNEL_CAPACITY: usize = 8;

pub struct ContentStore {
    current: RwLock<Option<Arc<ContentDocument>>>,
    ready: broadcast::Sender<Arc<ContentDocument>>,
}

impl ContentStore {
    pub fn new() -> Self {
        let (ready, _) = broadcast::channel(READY_CHANNEL_CAPACITY);
        Self {
            current: RwLock::new(None),
            ready,
        }
    }

    pub async fn current(&self) -> Option<Arc<ContentDocument>> {
        self.current.read().await.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ContentDocument>> {
        self.ready.subscribe()
    }

    /// Stores `doc` and announces it. Returns the number of listeners notified.
    pub(crate) async fn publish(&self, doc: Arc<ContentDocument>) -> usize {
        *self.current.write().await = Some(Arc::clone(&doc));
        // No subscribers is fine; the document is still queryable.
        self.ready.send(doc).unwrap_or(0)
    }
}

impl Default for ContentStore {
    fn default() -> Self {
        Self::new()
    }
}
