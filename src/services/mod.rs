//! Business logic services

pub mod borrows;
pub mod catalog;
pub mod history;
pub mod stats;
pub mod users;

use std::sync::Arc;

use crate::{config::PaginationConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub users: users::UsersService,
    pub borrows: borrows::BorrowsService,
    pub history: history::HistoryService,
    pub stats: stats::StatsService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, pagination: PaginationConfig) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone(), pagination),
            users: users::UsersService::new(repository.clone(), pagination),
            borrows: borrows::BorrowsService::new(Arc::new(repository.borrows.clone())),
            history: history::HistoryService::new(repository.clone(), pagination),
            stats: stats::StatsService::new(repository.clone()),
            repository,
        }
    }

    /// Whether the database answers
    pub async fn is_ready(&self) -> bool {
        match self.repository.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Readiness check failed: {}", e);
                false
            }
        }
    }
}
