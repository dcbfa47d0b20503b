use crate::{
    data::student::{FIELDNAMES, Student},
    error::{
        CsvFlushSnafu, CsvSnafu, ReadStorageSnafu, RosterError, RosterResult, WriteStorageSnafu,
    },
};
use async_trait::async_trait;
use snafu::ResultExt;
use std::{fmt::Debug, io::ErrorKind, path::PathBuf};
use tokio::fs;

/// Where the student table lives between requests.
///
/// Implementors only ever deal in whole collections: `load` returns every record in order and
/// `save` replaces everything that was there before.
#[async_trait]
pub trait StudentStorage: Send + Sync + Debug {
    ///creates an empty table if there isn't one yet, and leaves an existing one alone
    async fn initialise(&self) -> RosterResult<()>;
    async fn load(&self) -> RosterResult<Vec<Student>>;
    async fn save(&self, students: &[Student]) -> RosterResult<()>;
}

pub fn encode_students(students: &[Student]) -> RosterResult<Vec<u8>> {
    //headers are written by hand so that an empty table still gets them
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(vec![]);
    wtr.write_record(FIELDNAMES).context(CsvSnafu)?;
    for student in students {
        wtr.serialize(student).context(CsvSnafu)?;
    }

    wtr.into_inner()
        .map_err(csv::IntoInnerError::into_error)
        .context(CsvFlushSnafu)
}

pub fn decode_students(bytes: &[u8]) -> RosterResult<Vec<Student>> {
    csv::Reader::from_reader(bytes)
        .deserialize()
        .collect::<Result<Vec<Student>, _>>()
        .context(CsvSnafu)
}

#[derive(Debug, Clone)]
pub struct CsvFileStorage {
    path: PathBuf,
}

impl CsvFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

#[async_trait]
impl StudentStorage for CsvFileStorage {
    async fn initialise(&self) -> RosterResult<()> {
        if fs::try_exists(&self.path)
            .await
            .context(ReadStorageSnafu { path: &self.path })?
        {
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .context(WriteStorageSnafu { path: parent })?;
        }

        self.save(&[]).await?;
        info!(path = %self.path.display(), "Created empty students file");
        Ok(())
    }

    async fn load(&self) -> RosterResult<Vec<Student>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No students file yet, treating as empty");
                return Ok(vec![]);
            }
            Err(source) => {
                return Err(RosterError::ReadStorage {
                    source,
                    path: self.path.clone(),
                });
            }
        };

        let students = decode_students(&bytes)?;
        debug!(count = students.len(), "Loaded students");
        Ok(students)
    }

    async fn save(&self, students: &[Student]) -> RosterResult<()> {
        let bytes = encode_students(students)?;

        //write next to the real file then swap it in, so nobody reads half a table
        let tmp = self.temp_path();
        fs::write(&tmp, bytes)
            .await
            .context(WriteStorageSnafu { path: &tmp })?;
        fs::rename(&tmp, &self.path)
            .await
            .context(WriteStorageSnafu { path: &self.path })?;

        debug!(count = students.len(), "Saved students");
        Ok(())
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStorage {
    students: tokio::sync::Mutex<Vec<Student>>,
    saves: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn save_count(&self) -> usize {
        self.saves.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl StudentStorage for MemoryStorage {
    async fn initialise(&self) -> RosterResult<()> {
        Ok(())
    }

    async fn load(&self) -> RosterResult<Vec<Student>> {
        Ok(self.students.lock().await.clone())
    }

    async fn save(&self, students: &[Student]) -> RosterResult<()> {
        *self.students.lock().await = students.to_vec();
        self.saves.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}
