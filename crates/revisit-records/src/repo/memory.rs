use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use super::Repository;
use crate::error::{RecordError, Result};
use crate::ids::IdGenerator;
use crate::record::{IdScheme, Record};
use crate::types::{ListFilter, RecordId};

struct Slot<R> {
    /// Insertion sequence, used to keep listings stable.
    seq: u64,
    record: R,
}

/// Process-local store backed by a sharded concurrent map.
///
/// Each update runs under the entry's shard lock, so two writers to the same
/// id never interleave their merges, while writers to other shards proceed
/// in parallel.
pub struct MemoryRepository<R: Record> {
    records: DashMap<RecordId, Slot<R>>,
    ids: IdGenerator,
    inserted: AtomicU64,
}

impl<R: Record> MemoryRepository<R> {
    pub fn new() -> Self {
        Self::with_ids(IdGenerator::new())
    }

    /// Use a specific counter for `IdScheme::Sequential` kinds.
    pub fn with_ids(ids: IdGenerator) -> Self {
        Self {
            records: DashMap::new(),
            ids,
            inserted: AtomicU64::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn assign_id(&self) -> RecordId {
        match R::ID_SCHEME {
            IdScheme::Sequential => self.ids.next_id(),
            IdScheme::Uuid => RecordId::Uuid(Uuid::new_v4()),
        }
    }
}

impl<R: Record> Default for MemoryRepository<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Record> Repository<R> for MemoryRepository<R> {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, draft: R::Draft) -> Result<R> {
        let id = self.assign_id();
        let seq = self.inserted.fetch_add(1, Ordering::Relaxed);
        let record = R::from_draft(id.clone(), draft);
        self.records.insert(
            id.clone(),
            Slot {
                seq,
                record: record.clone(),
            },
        );
        debug!(kind = R::KIND, %id, "record inserted");
        Ok(record)
    }

    async fn get(&self, id: &RecordId) -> Result<Option<R>> {
        Ok(self.records.get(id).map(|slot| slot.record.clone()))
    }

    async fn list(&self, filter: &ListFilter) -> Result<Vec<R>> {
        let mut matched: Vec<(u64, R)> = self
            .records
            .iter()
            .filter(|entry| filter.admits(entry.record.due_at()))
            .map(|entry| (entry.seq, entry.record.clone()))
            .collect();
        matched.sort_by_key(|(seq, _)| *seq);
        Ok(matched.into_iter().map(|(_, record)| record).collect())
    }

    async fn update(&self, id: &RecordId, changes: &R::Changes) -> Result<R> {
        let mut slot = self
            .records
            .get_mut(id)
            .ok_or_else(|| RecordError::not_found(R::KIND, id))?;
        slot.record.apply(changes);
        Ok(slot.record.clone())
    }

    async fn delete(&self, id: &RecordId) -> Result<()> {
        self.records
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RecordError::not_found(R::KIND, id))
    }
}
