//! Lock-free queue distributing targets across workers

use std::sync::atomic::{AtomicUsize, Ordering};

/// Work queue with an atomic claim cursor.
///
/// Workers call [`claim()`](WorkQueue::claim) to take the next item;
/// every item is handed to exactly one worker.
pub struct WorkQueue<T> {
    items: Vec<T>,
    cursor: AtomicUsize,
}

impl<T> WorkQueue<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Claim the next item, or `None` when the queue is drained.
    pub fn claim(&self) -> Option<&T> {
        let i = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.items.get(i)
    }

    /// Total items the queue started with.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
