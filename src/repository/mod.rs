//! Repository layer for database operations

pub mod beds;
pub mod equipment;
pub mod history;
pub mod users;

use std::sync::Arc;

use sqlx::{Pool, Postgres};

pub use beds::{BedStore, BedsRepository};
pub use equipment::{EquipmentRepository, EquipmentStore};
pub use history::{HistoryLedger, HistoryRepository};
pub use users::{UserStore, UsersRepository};

/// Main repository struct holding the store implementations
#[derive(Clone)]
pub struct Repository {
    pub beds: Arc<dyn BedStore>,
    pub history: Arc<dyn HistoryLedger>,
    pub equipment: Arc<dyn EquipmentStore>,
    pub users: Arc<dyn UserStore>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            beds: Arc::new(BedsRepository::new(pool.clone())),
            history: Arc::new(HistoryRepository::new(pool.clone())),
            equipment: Arc::new(EquipmentRepository::new(pool.clone())),
            users: Arc::new(UsersRepository::new(pool)),
        }
    }
}
