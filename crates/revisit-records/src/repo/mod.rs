//! Storage contract and its backends.
//!
//! Every backend answers the same five operations. Only equality lookup by
//! id and a single `next_revision_date <= T` range predicate are required of
//! the underlying store.

use async_trait::async_trait;

use crate::error::Result;
use crate::record::Record;
use crate::types::{ListFilter, RecordId};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryRepository;
pub use sqlite::{SqliteEmployeeRepository, SqliteQuestionRepository};

/// Persistence for one record kind.
///
/// Writes are all-or-nothing: a failed `update` leaves the stored record
/// exactly as it was.
#[async_trait]
pub trait Repository<R: Record>: Send + Sync {
    /// Short backend label for health output and logs.
    fn backend(&self) -> &'static str;

    /// Persist a new record under a freshly assigned id and return it as stored.
    ///
    /// The record is built inside the same critical section as the write, so
    /// a concurrent delete of the new id cannot make a committed insert fail.
    async fn insert(&self, draft: R::Draft) -> Result<R>;

    /// `Ok(None)` when no live record has this id.
    async fn get(&self, id: &RecordId) -> Result<Option<R>>;

    /// Live records passing `filter`, in insertion order.
    async fn list(&self, filter: &ListFilter) -> Result<Vec<R>>;

    /// Merge `changes` and return the full post-update record.
    ///
    /// Fails with `NotFound` when the id is absent.
    async fn update(&self, id: &RecordId, changes: &R::Changes) -> Result<R>;

    /// Fails with `NotFound` when the id is absent.
    async fn delete(&self, id: &RecordId) -> Result<()>;
}
