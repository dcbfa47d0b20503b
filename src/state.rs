use crate::{
    config::RuntimeConfiguration,
    data::{
        storage::{CsvFileStorage, StudentStorage},
        store::StudentStore,
    },
    error::RosterResult,
};
use std::{ops::Deref, sync::Arc};

#[derive(Clone, Debug)]
pub struct RosterState {
    store: Arc<StudentStore>,
}

impl RosterState {
    pub async fn new(config: &RuntimeConfiguration) -> RosterResult<Self> {
        let storage = CsvFileStorage::new(config.students_csv());
        Self::with_storage(Arc::new(storage)).await
    }

    pub async fn with_storage(storage: Arc<dyn StudentStorage>) -> RosterResult<Self> {
        let store = StudentStore::new(storage);
        store.initialise().await?;

        Ok(Self {
            store: Arc::new(store),
        })
    }
}

impl Deref for RosterState {
    type Target = StudentStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}
