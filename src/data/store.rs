use crate::{
    data::{
        storage::StudentStorage,
        student::{AgeUpdate, NewStudent, Payload, Student},
    },
    error::{IdsExhaustedSnafu, MissingStudentSnafu, NoStudentsWithLastNameSnafu, RosterResult},
};
use snafu::{OptionExt, ensure};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Every operation reloads the full table from storage, and every mutation writes the full
/// table back before returning. Nothing is cached between calls.
///
/// Mutations hold the write half of `lock` for their whole load-modify-save cycle, so two
/// concurrent writers can't both read the same snapshot and clobber each other.
#[derive(Debug)]
pub struct StudentStore {
    storage: Arc<dyn StudentStorage>,
    lock: RwLock<()>,
}

impl StudentStore {
    pub fn new(storage: Arc<dyn StudentStorage>) -> Self {
        Self {
            storage,
            lock: RwLock::new(()),
        }
    }

    pub async fn initialise(&self) -> RosterResult<()> {
        let _guard = self.lock.write().await;
        self.storage.initialise().await
    }

    pub async fn list_all(&self) -> RosterResult<Vec<Student>> {
        let _guard = self.lock.read().await;
        self.storage.load().await
    }

    pub async fn list_by_last_name(&self, last_name: &str) -> RosterResult<Vec<Student>> {
        let matching: Vec<_> = self
            .list_all()
            .await?
            .into_iter()
            .filter(|student| student.last_name == last_name)
            .collect();

        ensure!(
            !matching.is_empty(),
            NoStudentsWithLastNameSnafu { last_name }
        );
        Ok(matching)
    }

    pub async fn get_by_id(&self, id: u32) -> RosterResult<Student> {
        self.list_all()
            .await?
            .into_iter()
            .find(|student| student.id == id)
            .context(MissingStudentSnafu { id })
    }

    pub async fn insert(&self, payload: &Payload) -> RosterResult<Student> {
        let new_student = NewStudent::from_payload(payload, "POST")?;

        let _guard = self.lock.write().await;
        let mut students = self.storage.load().await?;

        let id = next_id(&students)?;
        let student = new_student.into_student(id);
        students.push(student.clone());
        self.storage.save(&students).await?;

        info!(id, count = students.len(), "Inserted student");
        Ok(student)
    }

    pub async fn replace_by_id(&self, id: u32, payload: &Payload) -> RosterResult<Student> {
        let new_details = NewStudent::from_payload(payload, "PUT")?;

        self.modify(id, |student| student.replace_with(new_details))
            .await
            .inspect(|_| info!(id, "Replaced student"))
    }

    pub async fn update_age(&self, id: u32, payload: &Payload) -> RosterResult<Student> {
        let AgeUpdate { age } = AgeUpdate::from_payload(payload)?;

        self.modify(id, |student| student.age = age)
            .await
            .inspect(|_| info!(id, age, "Updated student age"))
    }

    pub async fn delete_by_id(&self, id: u32) -> RosterResult<u32> {
        let _guard = self.lock.write().await;
        let mut students = self.storage.load().await?;

        let index = students
            .iter()
            .position(|student| student.id == id)
            .context(MissingStudentSnafu { id })?;
        students.remove(index);
        self.storage.save(&students).await?;

        info!(id, count = students.len(), "Deleted student");
        Ok(id)
    }

    async fn modify(&self, id: u32, change: impl FnOnce(&mut Student)) -> RosterResult<Student> {
        let _guard = self.lock.write().await;
        let mut students = self.storage.load().await?;

        let student = students
            .iter_mut()
            .find(|student| student.id == id)
            .context(MissingStudentSnafu { id })?;
        change(student);
        let updated = student.clone();

        self.storage.save(&students).await?;
        Ok(updated)
    }
}

///one past the biggest surviving id - so deleting the newest student frees its id up again
fn next_id(students: &[Student]) -> RosterResult<u32> {
    let max = students.iter().map(|student| student.id).max().unwrap_or(0);
    max.checked_add(1).context(IdsExhaustedSnafu { max })
}
