use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

use super::Repository;
use crate::db::ConnectionPool;
use crate::employee::{Employee, EmployeeDraft, EmployeePatch};
use crate::error::{RecordError, Result};
use crate::question::{Question, QuestionChanges, QuestionDraft};
use crate::record::Record;
use crate::types::{ListFilter, RecordId};

const EMPLOYEE_SELECT_SQL: &str = "SELECT id, name, position, department FROM employees";

const QUESTION_SELECT_SQL: &str = "SELECT
    id,
    question_text,
    solution,
    next_revision_date,
    current_interval_days
FROM questions";

/// Employee store on a shared [`ConnectionPool`].
///
/// `get` and `list` run on reader connections; every write is one statement
/// plus a re-select on the writer connection, so the returned record is the
/// one that write produced.
pub struct SqliteEmployeeRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteEmployeeRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Private `:memory:` database, mostly for tests.
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(Arc::new(ConnectionPool::in_memory()?)))
    }
}

#[async_trait]
impl Repository<Employee> for SqliteEmployeeRepository {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn insert(&self, draft: EmployeeDraft) -> Result<Employee> {
        let now = Utc::now().to_rfc3339();
        let employee = self
            .pool
            .write(move |db| {
                db.execute(
                    "INSERT INTO employees (name, position, department, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?4)",
                    params![draft.name, draft.position, draft.department, now],
                )?;
                let rowid = db.last_insert_rowid();
                Ok(select_employee(db, rowid)?)
            })
            .await?;
        debug!(id = %employee.id, "employee row inserted");
        Ok(employee)
    }

    async fn get(&self, id: &RecordId) -> Result<Option<Employee>> {
        let Some(key) = seq_key(id) else {
            return Ok(None);
        };
        self.pool
            .read(move |db| Ok(select_employee(db, key).optional()?))
            .await
    }

    async fn list(&self, filter: &ListFilter) -> Result<Vec<Employee>> {
        if !filter.admits(None) {
            return Ok(Vec::new());
        }
        self.pool
            .read(|db| {
                let mut stmt = db.prepare(&format!("{EMPLOYEE_SELECT_SQL} ORDER BY id"))?;
                let employees = stmt
                    .query_map([], row_to_employee)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(employees)
            })
            .await
    }

    async fn update(&self, id: &RecordId, changes: &EmployeePatch) -> Result<Employee> {
        let key = seq_key(id).ok_or_else(|| RecordError::not_found(Employee::KIND, id))?;
        let changes = changes.clone();
        let now = Utc::now().to_rfc3339();
        let updated = self
            .pool
            .write(move |db| {
                let changed = db.execute(
                    "UPDATE employees
                     SET name       = COALESCE(?1, name),
                         position   = COALESCE(?2, position),
                         department = COALESCE(?3, department),
                         updated_at = ?4
                     WHERE id = ?5",
                    params![changes.name, changes.position, changes.department, now, key],
                )?;
                if changed == 0 {
                    return Ok(None);
                }
                Ok(Some(select_employee(db, key)?))
            })
            .await?;
        updated.ok_or_else(|| RecordError::not_found(Employee::KIND, id))
    }

    async fn delete(&self, id: &RecordId) -> Result<()> {
        let key = seq_key(id).ok_or_else(|| RecordError::not_found(Employee::KIND, id))?;
        let n = self
            .pool
            .write(move |db| Ok(db.execute("DELETE FROM employees WHERE id = ?1", [key])?))
            .await?;
        if n == 0 {
            return Err(RecordError::not_found(Employee::KIND, id));
        }
        Ok(())
    }
}

/// Question store on a shared [`ConnectionPool`].
///
/// Ids are UUIDv7 so they sort by creation time; revision dates are stored
/// as epoch microseconds so the due query is a plain integer comparison.
pub struct SqliteQuestionRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteQuestionRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Private `:memory:` database, mostly for tests.
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(Arc::new(ConnectionPool::in_memory()?)))
    }
}

#[async_trait]
impl Repository<Question> for SqliteQuestionRepository {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn insert(&self, draft: QuestionDraft) -> Result<Question> {
        let key = Uuid::now_v7().to_string();
        let now = Utc::now().to_rfc3339();
        let question = self
            .pool
            .write(move |db| {
                db.execute(
                    "INSERT INTO questions
                     (id, question_text, solution, next_revision_date, current_interval_days,
                      created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                    params![
                        key,
                        draft.question_text,
                        draft.solution,
                        draft.next_revision_date.timestamp_micros(),
                        draft.current_interval_days,
                        now,
                    ],
                )?;
                Ok(select_question(db, &key)?)
            })
            .await?;
        debug!(id = %question.id, "question row inserted");
        Ok(question)
    }

    async fn get(&self, id: &RecordId) -> Result<Option<Question>> {
        let Some(key) = uuid_key(id) else {
            return Ok(None);
        };
        self.pool
            .read(move |db| Ok(select_question(db, &key).optional()?))
            .await
    }

    async fn list(&self, filter: &ListFilter) -> Result<Vec<Question>> {
        let filter = *filter;
        self.pool
            .read(move |db| {
                let questions = match filter {
                    ListFilter::All => {
                        let mut stmt =
                            db.prepare(&format!("{QUESTION_SELECT_SQL} ORDER BY rowid"))?;
                        let rows = stmt
                            .query_map([], row_to_question)?
                            .collect::<rusqlite::Result<Vec<_>>>()?;
                        rows
                    }
                    ListFilter::DueBy(cutoff) => {
                        let mut stmt = db.prepare(&format!(
                            "{QUESTION_SELECT_SQL} WHERE next_revision_date <= ?1 ORDER BY rowid"
                        ))?;
                        let rows = stmt
                            .query_map([cutoff.timestamp_micros()], row_to_question)?
                            .collect::<rusqlite::Result<Vec<_>>>()?;
                        rows
                    }
                };
                Ok(questions)
            })
            .await
    }

    async fn update(&self, id: &RecordId, changes: &QuestionChanges) -> Result<Question> {
        let key = uuid_key(id).ok_or_else(|| RecordError::not_found(Question::KIND, id))?;
        let (interval, next_revision) = match changes.reschedule {
            Some(r) => (
                Some(r.interval_days),
                Some(r.next_revision_date.timestamp_micros()),
            ),
            None => (None, None),
        };
        let question_text = changes.question_text.clone();
        let solution = changes.solution.clone();
        let now = Utc::now().to_rfc3339();
        let updated = self
            .pool
            .write(move |db| {
                let changed = db.execute(
                    "UPDATE questions
                     SET question_text         = COALESCE(?1, question_text),
                         solution              = COALESCE(?2, solution),
                         current_interval_days = COALESCE(?3, current_interval_days),
                         next_revision_date    = COALESCE(?4, next_revision_date),
                         updated_at            = ?5
                     WHERE id = ?6",
                    params![question_text, solution, interval, next_revision, now, key],
                )?;
                if changed == 0 {
                    return Ok(None);
                }
                Ok(Some(select_question(db, &key)?))
            })
            .await?;
        updated.ok_or_else(|| RecordError::not_found(Question::KIND, id))
    }

    async fn delete(&self, id: &RecordId) -> Result<()> {
        let key = uuid_key(id).ok_or_else(|| RecordError::not_found(Question::KIND, id))?;
        let n = self
            .pool
            .write(move |db| Ok(db.execute("DELETE FROM questions WHERE id = ?1", [key])?))
            .await?;
        if n == 0 {
            return Err(RecordError::not_found(Question::KIND, id));
        }
        Ok(())
    }
}

/// Integer primary key for a counter id; `None` for ids this table never issues.
fn seq_key(id: &RecordId) -> Option<i64> {
    match id {
        RecordId::Seq(n) => i64::try_from(*n).ok(),
        RecordId::Uuid(_) => None,
    }
}

fn uuid_key(id: &RecordId) -> Option<String> {
    match id {
        RecordId::Uuid(u) => Some(u.to_string()),
        RecordId::Seq(_) => None,
    }
}

fn select_employee(db: &Connection, key: i64) -> rusqlite::Result<Employee> {
    db.query_row(
        &format!("{EMPLOYEE_SELECT_SQL} WHERE id = ?1"),
        [key],
        row_to_employee,
    )
}

fn select_question(db: &Connection, key: &str) -> rusqlite::Result<Question> {
    db.query_row(
        &format!("{QUESTION_SELECT_SQL} WHERE id = ?1"),
        [key],
        row_to_question,
    )
}

fn row_to_employee(row: &Row<'_>) -> rusqlite::Result<Employee> {
    let rowid: i64 = row.get(0)?;
    let id = u64::try_from(rowid).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(0, rowid))?;
    Ok(Employee {
        id: RecordId::Seq(id),
        name: row.get(1)?,
        position: row.get(2)?,
        department: row.get(3)?,
    })
}

fn row_to_question(row: &Row<'_>) -> rusqlite::Result<Question> {
    let id_text: String = row.get(0)?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
    let micros: i64 = row.get(3)?;
    let next_revision_date = DateTime::<Utc>::from_timestamp_micros(micros)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(3, micros))?;
    Ok(Question {
        id: RecordId::Uuid(id),
        question_text: row.get(1)?,
        solution: row.get(2)?,
        next_revision_date,
        current_interval_days: row.get(4)?,
    })
}
