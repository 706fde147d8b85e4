use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::record::{IdScheme, Record};
use crate::types::{ListFilter, RecordId};

/// A staff member in the employee directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: RecordId,
    pub name: String,
    pub position: String,
    pub department: String,
}

/// Create payload. An `id` key in the body is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewEmployee {
    pub name: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
}

impl NewEmployee {
    pub fn new(
        name: impl Into<String>,
        position: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            position: Some(position.into()),
            department: Some(department.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeDraft {
    pub name: String,
    pub position: String,
    pub department: String,
}

/// Partial update; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EmployeePatch {
    pub name: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
}

impl EmployeePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.position.is_none() && self.department.is_none()
    }
}

impl Record for Employee {
    const KIND: &'static str = "employee";
    const ID_SCHEME: IdScheme = IdScheme::Sequential;

    type Input = NewEmployee;
    type Draft = EmployeeDraft;
    type Patch = EmployeePatch;
    type Changes = EmployeePatch;

    fn validate(input: NewEmployee) -> Result<EmployeeDraft, ValidationError> {
        match input {
            NewEmployee {
                name: Some(name),
                position: Some(position),
                department: Some(department),
            } => Ok(EmployeeDraft {
                name,
                position,
                department,
            }),
            partial => {
                let missing = [
                    ("name", partial.name.is_none()),
                    ("position", partial.position.is_none()),
                    ("department", partial.department.is_none()),
                ]
                .into_iter()
                .filter_map(|(field, absent)| absent.then_some(field))
                .collect();
                Err(ValidationError::MissingFields(missing))
            }
        }
    }

    fn from_draft(id: RecordId, draft: EmployeeDraft) -> Self {
        Self {
            id,
            name: draft.name,
            position: draft.position,
            department: draft.department,
        }
    }

    fn resolve(patch: EmployeePatch, _now: DateTime<Utc>) -> Result<EmployeePatch, ValidationError> {
        if patch.is_empty() {
            return Err(ValidationError::EmptyUpdate);
        }
        Ok(patch)
    }

    fn apply(&mut self, changes: &EmployeePatch) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(position) = &changes.position {
            self.position = position.clone();
        }
        if let Some(department) = &changes.department {
            self.department = department.clone();
        }
    }

    fn list_filter(_now: DateTime<Utc>) -> ListFilter {
        ListFilter::All
    }
}

/// The directory a fresh deployment starts with when seeding is enabled.
pub fn sample_employees() -> Vec<NewEmployee> {
    vec![
        NewEmployee::new("Alice", "Software Engineer", "Technology"),
        NewEmployee::new("Bob", "Data Scientist", "Analytics"),
        NewEmployee::new("Charlie", "Product Manager", "Product"),
    ]
}
