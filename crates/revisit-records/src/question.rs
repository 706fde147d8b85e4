use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::record::{IdScheme, Record};
use crate::schedule::{self, Reschedule};
use crate::types::{ListFilter, RecordId};

/// A flash-card style question reviewed on a caller-chosen cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: RecordId,
    pub question_text: String,
    pub solution: String,
    /// Instant from which the question shows up in the due list.
    pub next_revision_date: DateTime<Utc>,
    /// Days between reviews, as last chosen by the reviewer.
    pub current_interval_days: u32,
}

/// Create payload. `next_revision_date` is stored verbatim; an `id` key is
/// ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewQuestion {
    pub question_text: Option<String>,
    pub solution: Option<String>,
    pub next_revision_date: Option<DateTime<Utc>>,
    pub current_interval_days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub question_text: String,
    pub solution: String,
    pub next_revision_date: DateTime<Utc>,
    pub current_interval_days: u32,
}

/// Partial update accepted from clients.
///
/// There is deliberately no `next_revision_date` here: the due date moves
/// only through `current_interval_days`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct QuestionPatch {
    pub question_text: Option<String>,
    pub solution: Option<String>,
    pub current_interval_days: Option<u32>,
}

impl QuestionPatch {
    pub fn is_empty(&self) -> bool {
        self.question_text.is_none()
            && self.solution.is_none()
            && self.current_interval_days.is_none()
    }

    pub fn interval(days: u32) -> Self {
        Self {
            current_interval_days: Some(days),
            ..Self::default()
        }
    }
}

/// Field writes for a question, with the schedule resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionChanges {
    pub question_text: Option<String>,
    pub solution: Option<String>,
    pub reschedule: Option<Reschedule>,
}

impl Record for Question {
    const KIND: &'static str = "question";
    const ID_SCHEME: IdScheme = IdScheme::Uuid;

    type Input = NewQuestion;
    type Draft = QuestionDraft;
    type Patch = QuestionPatch;
    type Changes = QuestionChanges;

    fn validate(input: NewQuestion) -> Result<QuestionDraft, ValidationError> {
        match input {
            NewQuestion {
                question_text: Some(question_text),
                solution: Some(solution),
                next_revision_date: Some(next_revision_date),
                current_interval_days,
            } => Ok(QuestionDraft {
                question_text,
                solution,
                next_revision_date: schedule::normalize(next_revision_date),
                current_interval_days: current_interval_days.unwrap_or(0),
            }),
            partial => {
                let missing = [
                    ("question_text", partial.question_text.is_none()),
                    ("solution", partial.solution.is_none()),
                    ("next_revision_date", partial.next_revision_date.is_none()),
                ]
                .into_iter()
                .filter_map(|(field, absent)| absent.then_some(field))
                .collect();
                Err(ValidationError::MissingFields(missing))
            }
        }
    }

    fn from_draft(id: RecordId, draft: QuestionDraft) -> Self {
        Self {
            id,
            question_text: draft.question_text,
            solution: draft.solution,
            next_revision_date: draft.next_revision_date,
            current_interval_days: draft.current_interval_days,
        }
    }

    fn resolve(patch: QuestionPatch, now: DateTime<Utc>) -> Result<QuestionChanges, ValidationError> {
        if patch.is_empty() {
            return Err(ValidationError::EmptyUpdate);
        }
        let reschedule = patch
            .current_interval_days
            .map(|days| schedule::reschedule(days, now))
            .transpose()?;
        Ok(QuestionChanges {
            question_text: patch.question_text,
            solution: patch.solution,
            reschedule,
        })
    }

    fn apply(&mut self, changes: &QuestionChanges) {
        if let Some(text) = &changes.question_text {
            self.question_text = text.clone();
        }
        if let Some(solution) = &changes.solution {
            self.solution = solution.clone();
        }
        if let Some(r) = changes.reschedule {
            self.current_interval_days = r.interval_days;
            self.next_revision_date = r.next_revision_date;
        }
    }

    fn list_filter(now: DateTime<Utc>) -> ListFilter {
        ListFilter::DueBy(now)
    }

    fn due_at(&self) -> Option<DateTime<Utc>> {
        Some(self.next_revision_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn question(next: DateTime<Utc>) -> Question {
        Question {
            id: RecordId::Uuid(uuid::Uuid::nil()),
            question_text: "What is ownership?".into(),
            solution: "Each value has a single owner.".into(),
            next_revision_date: next,
            current_interval_days: 0,
        }
    }

    #[test]
    fn interval_defaults_to_zero() {
        let input: NewQuestion = serde_json::from_str(
            r#"{"question_text":"Q","solution":"A","next_revision_date":"2026-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        let draft = Question::validate(input).unwrap();
        assert_eq!(draft.current_interval_days, 0);
        assert_eq!(
            draft.next_revision_date,
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn missing_revision_date_is_reported() {
        let input: NewQuestion =
            serde_json::from_str(r#"{"question_text":"Q","solution":"A"}"#).unwrap();
        assert_eq!(
            Question::validate(input).unwrap_err(),
            ValidationError::MissingFields(vec!["next_revision_date"])
        );
    }

    #[test]
    fn negative_interval_does_not_deserialize() {
        let parsed = serde_json::from_str::<QuestionPatch>(r#"{"current_interval_days":-3}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn interval_change_reschedules_from_now_not_from_previous_date() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap();
        let mut q = question(now + Duration::days(100));

        let changes = Question::resolve(QuestionPatch::interval(7), now).unwrap();
        q.apply(&changes);

        assert_eq!(q.current_interval_days, 7);
        assert_eq!(q.next_revision_date, now + Duration::days(7));
    }

    #[test]
    fn text_only_patch_keeps_schedule() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap();
        let mut q = question(now);
        let patch = QuestionPatch {
            solution: Some("Moves transfer ownership.".into()),
            ..QuestionPatch::default()
        };
        q.apply(&Question::resolve(patch, now + Duration::days(3)).unwrap());

        assert_eq!(q.solution, "Moves transfer ownership.");
        assert_eq!(q.next_revision_date, now);
        assert_eq!(q.current_interval_days, 0);
    }

    #[test]
    fn revision_date_alone_is_not_an_update() {
        let patch: QuestionPatch =
            serde_json::from_str(r#"{"next_revision_date":"2030-01-01T00:00:00Z"}"#).unwrap();
        assert_eq!(
            Question::resolve(patch, Utc::now()).unwrap_err(),
            ValidationError::EmptyUpdate
        );
    }

    #[test]
    fn due_list_uses_request_time() {
        let now = Utc::now();
        assert_eq!(Question::list_filter(now), ListFilter::DueBy(now));
        assert!(Question::list_filter(now).admits(question(now - Duration::days(1)).due_at()));
        assert!(!Question::list_filter(now).admits(question(now + Duration::days(1)).due_at()));
    }
}
