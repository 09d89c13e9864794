use crate::error::{MissingFieldSnafu, RosterResult};
use serde::{Deserialize, Serialize};
use snafu::ensure;

/// A student as stored in `public.students`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Student {
    pub id: i32,
    pub name: String,
    pub email: String,
}

/// A student that hasn't been given an ID by the store yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
}

/// The public shape of a student, used for request and response bodies.
///
/// Doesn't carry the ID - only the create and update responses (which return a full [`Student`]) do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentPayload {
    pub name: String,
    pub email: String,
}

impl From<Student> for StudentPayload {
    fn from(Student { id: _, name, email }: Student) -> Self {
        Self { name, email }
    }
}

impl From<StudentPayload> for NewStudent {
    fn from(StudentPayload { name, email }: StudentPayload) -> Self {
        Self { name, email }
    }
}

impl StudentPayload {
    /// Both fields are required, so blank ones are treated as missing.
    pub fn ensure_required_fields(&self) -> RosterResult<()> {
        ensure!(
            !self.name.trim().is_empty(),
            MissingFieldSnafu { field: "name" }
        );
        ensure!(
            !self.email.trim().is_empty(),
            MissingFieldSnafu { field: "email" }
        );
        Ok(())
    }
}

impl NewStudent {
    pub fn with_id(self, id: i32) -> Student {
        let Self { name, email } = self;
        Student { id, name, email }
    }
}
