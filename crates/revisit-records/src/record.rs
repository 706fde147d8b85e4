use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ValidationError;
use crate::types::{ListFilter, RecordId};

/// How a store assigns ids to new records of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdScheme {
    /// Process-wide counter, see [`crate::ids::IdGenerator`].
    Sequential,
    /// Backend-native random/time-ordered UUIDs.
    Uuid,
}

/// A storable record kind.
///
/// Each kind describes its create input, the validated draft handed to a
/// repository, the client-facing partial update and the resolved field
/// writes that a repository merges. Keeping `Patch` and `Changes` apart is
/// what lets a kind attach derived writes (such as a recomputed due date)
/// without ever accepting them from the client.
pub trait Record: Clone + Serialize + Send + Sync + 'static {
    /// Lowercase singular name used in messages and log fields.
    const KIND: &'static str;
    const ID_SCHEME: IdScheme;

    /// Raw create payload; every field optional so validation can name gaps.
    type Input: Send;
    /// Validated create payload.
    type Draft: Clone + Send + Sync + 'static;
    /// Raw partial update payload.
    type Patch: Send;
    /// Field writes applied by a repository.
    type Changes: Clone + Send + Sync + 'static;

    fn validate(input: Self::Input) -> Result<Self::Draft, ValidationError>;

    fn from_draft(id: RecordId, draft: Self::Draft) -> Self;

    /// Turn a patch into field writes at `now`.
    ///
    /// Fails with [`ValidationError::EmptyUpdate`] when no field is present.
    fn resolve(patch: Self::Patch, now: DateTime<Utc>) -> Result<Self::Changes, ValidationError>;

    /// Merge only the present fields of `changes` into `self`.
    fn apply(&mut self, changes: &Self::Changes);

    /// Filter used by the list operation for a request made at `now`.
    fn list_filter(now: DateTime<Utc>) -> ListFilter;

    /// Due date consulted by in-memory filtering.
    fn due_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}
