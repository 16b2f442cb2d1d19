//! Business logic services

pub mod auth;
pub mod beds;
pub mod equipment;
pub mod stats;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub beds: beds::BedsService,
    pub equipment: equipment::EquipmentService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.users, auth_config),
            beds: beds::BedsService::new(repository.beds, repository.history),
            equipment: equipment::EquipmentService::new(repository.equipment),
        }
    }
}
