use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::RecordId;

/// Monotonic id source for counter-keyed stores.
///
/// Ids are never recycled: deleting a record does not rewind the counter.
#[derive(Debug)]
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    /// Generator whose first id is 1.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Issue the next id. Concurrent callers always observe distinct values.
    pub fn next_id(&self) -> RecordId {
        RecordId::Seq(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
