//! Record storage and scheduling for the revisit service.
//!
//! Two record kinds share one set of rules: an employee directory with
//! counter-issued ids, and spaced-repetition questions whose due date is
//! recomputed from the review interval on every interval change.

pub mod db;
pub mod employee;
pub mod error;
pub mod ids;
pub mod question;
pub mod record;
pub mod repo;
pub mod schedule;
pub mod service;
pub mod types;

pub use employee::{sample_employees, Employee, EmployeePatch, NewEmployee};
pub use error::{RecordError, Result, ValidationError};
pub use question::{NewQuestion, Question, QuestionPatch};
pub use record::Record;
pub use repo::{MemoryRepository, Repository, SqliteEmployeeRepository, SqliteQuestionRepository};
pub use service::RecordService;
pub use types::{ListFilter, RecordId};
