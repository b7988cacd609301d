//! Persistent store for retailer onboarding records.

mod memory;
mod model;
mod postgres;

use async_trait::async_trait;
use futures::stream::BoxStream;
use sqlx::migrate::MigrateError;
use thiserror::Error;

pub use memory::InMemoryRepository;
pub use model::{NewRetailerRecord, RecordId, RetailerFilter, RetailerRecord};
pub use postgres::PostgresRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] MigrateError),

    #[error("stored record could not be decoded: {0}")]
    Decode(String),
}

/// Storage contract shared by the HTTP handlers and the export pipeline.
///
/// Records are append-only: the store assigns an identity on insert and never
/// updates or deletes. `query` yields matches lazily and makes no promise
/// about ordering.
#[async_trait]
pub trait RetailerRepository: Send + Sync {
    async fn insert(&self, record: &NewRetailerRecord) -> Result<RecordId, RepositoryError>;

    fn query<'a>(
        &'a self,
        filter: &RetailerFilter,
    ) -> BoxStream<'a, Result<RetailerRecord, RepositoryError>>;

    async fn health_check(&self) -> Result<(), RepositoryError>;

    async fn close(&self);
}
