use crate::{
    data::{
        store::StudentStore,
        student::{NewStudent, Student, StudentPayload},
    },
    error::{MissingStudentSnafu, RosterResult},
};
use snafu::{OptionExt, ensure};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct StudentService {
    store: Arc<dyn StudentStore>,
}

impl StudentService {
    pub fn new(store: Arc<dyn StudentStore>) -> Self {
        Self { store }
    }

    pub async fn save(&self, payload: StudentPayload) -> RosterResult<Student> {
        let student = self.store.create(NewStudent::from(payload)).await?;
        info!(id = student.id, "Added student");
        Ok(student)
    }

    pub async fn list_all(&self) -> RosterResult<Vec<StudentPayload>> {
        let students = self.store.find_all().await?;
        debug!(count = students.len(), "Listed students");
        Ok(students.into_iter().map(StudentPayload::from).collect())
    }

    pub async fn get_by_id(&self, id: i32) -> RosterResult<StudentPayload> {
        let student = self
            .store
            .find_by_id(id)
            .await?
            .context(MissingStudentSnafu { id })?;
        Ok(student.into())
    }

    pub async fn update(&self, id: i32, payload: StudentPayload) -> RosterResult<Student> {
        let existing = self
            .store
            .find_by_id(id)
            .await?
            .context(MissingStudentSnafu { id })?;

        //can still go missing between the read and the write if someone else deletes it
        let updated = self
            .store
            .update(existing.id, NewStudent::from(payload))
            .await?
            .context(MissingStudentSnafu { id })?;

        info!(id, "Updated student");
        Ok(updated)
    }

    pub async fn delete_by_id(&self, id: i32) -> RosterResult<()> {
        ensure!(self.store.delete_by_id(id).await?, MissingStudentSnafu { id });
        info!(id, "Removed student");
        Ok(())
    }

    pub async fn close(&self) {
        self.store.close().await;
    }
}
