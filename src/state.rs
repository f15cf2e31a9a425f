use crate::{
    config::{RuntimeConfiguration, StoreConfig},
    error::RosterResult,
    store::{StudentStore, memory::MemoryStudentStore, postgres::PostgresStudentStore},
};
use sqlx::postgres::PgPoolOptions;
use std::{ops::Deref, sync::Arc};

#[derive(Clone, Debug)]
pub struct RosterState {
    store: Arc<dyn StudentStore>,
}

impl RosterState {
    pub async fn new(config: &RuntimeConfiguration) -> RosterResult<Self> {
        let store: Arc<dyn StudentStore> = match config.store_config() {
            StoreConfig::Postgres(db_config) => {
                let options = PgPoolOptions::new().max_connections(db_config.max_connections());
                Arc::new(PostgresStudentStore::connect(options, db_config).await?)
            }
            StoreConfig::Memory => {
                warn!("Using the in-memory store, students will not outlive the process");
                Arc::new(MemoryStudentStore::default())
            }
        };

        Ok(Self::with_store(store))
    }

    pub fn with_store(store: Arc<dyn StudentStore>) -> Self {
        Self { store }
    }

    pub async fn sensible_shutdown(&self) {
        self.store.close().await;
    }
}

impl Deref for RosterState {
    type Target = dyn StudentStore;

    fn deref(&self) -> &Self::Target {
        self.store.as_ref()
    }
}
