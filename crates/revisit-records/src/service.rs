use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use crate::error::{RecordError, Result};
use crate::record::Record;
use crate::repo::Repository;
use crate::types::RecordId;

/// Validation and scheduling rules for one record kind, over any repository.
///
/// Cheap to clone; every clone shares the same backing store.
pub struct RecordService<R: Record> {
    repo: Arc<dyn Repository<R>>,
}

impl<R: Record> Clone for RecordService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<R: Record> RecordService<R> {
    pub fn new(repo: Arc<dyn Repository<R>>) -> Self {
        Self { repo }
    }

    pub fn backend(&self) -> &'static str {
        self.repo.backend()
    }

    /// Validate `input`, store it under a fresh id and return the stored record.
    #[instrument(skip_all, fields(kind = R::KIND))]
    pub async fn create_record(&self, input: R::Input) -> Result<R> {
        let draft = R::validate(input)?;
        let record = self.repo.insert(draft).await?;
        info!("record created");
        Ok(record)
    }

    /// Records visible at `now`: every employee, or only the due questions.
    #[instrument(skip(self), fields(kind = R::KIND))]
    pub async fn list_records(&self, now: DateTime<Utc>) -> Result<Vec<R>> {
        let records = self.repo.list(&R::list_filter(now)).await?;
        debug!(count = records.len(), "records listed");
        Ok(records)
    }

    #[instrument(skip(self), fields(kind = R::KIND, id = %id))]
    pub async fn get_record(&self, id: &RecordId) -> Result<R> {
        self.repo
            .get(id)
            .await?
            .ok_or_else(|| RecordError::not_found(R::KIND, id))
    }

    /// Apply a partial update, resolving derived fields against the current time.
    pub async fn update_record(&self, id: &RecordId, patch: R::Patch) -> Result<R> {
        self.update_record_at(id, patch, Utc::now()).await
    }

    /// Like [`update_record`](Self::update_record) with an explicit clock.
    ///
    /// An empty patch is rejected before the store is consulted, so it reports
    /// a validation error even for an unknown id.
    #[instrument(skip(self, patch), fields(kind = R::KIND, id = %id))]
    pub async fn update_record_at(
        &self,
        id: &RecordId,
        patch: R::Patch,
        now: DateTime<Utc>,
    ) -> Result<R> {
        let changes = R::resolve(patch, now)?;
        let record = self.repo.update(id, &changes).await?;
        info!("record updated");
        Ok(record)
    }

    #[instrument(skip(self), fields(kind = R::KIND, id = %id))]
    pub async fn delete_record(&self, id: &RecordId) -> Result<()> {
        self.repo.delete(id).await?;
        info!("record deleted");
        Ok(())
    }
}
