use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{NewRetailerRecord, RecordId, RepositoryError, RetailerFilter, RetailerRecord, RetailerRepository};

/// Process-local store. Contents are lost when the process exits.
///
/// `query` reads from a snapshot taken on first poll, so the lock is not held
/// while the caller consumes the stream and later inserts are not seen.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    records: RwLock<Vec<RetailerRecord>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RetailerRepository for InMemoryRepository {
    async fn insert(&self, record: &NewRetailerRecord) -> Result<RecordId, RepositoryError> {
        let id = Uuid::new_v4();
        self.records.write().await.push(RetailerRecord {
            id,
            created_at: Utc::now(),
            data: record.clone(),
        });
        Ok(id)
    }

    fn query<'a>(
        &'a self,
        filter: &RetailerFilter,
    ) -> BoxStream<'a, Result<RetailerRecord, RepositoryError>> {
        let filter = filter.clone();
        stream::once(async move { self.records.read().await.clone() })
            .flat_map(move |snapshot| {
                let filter = filter.clone();
                stream::iter(
                    snapshot
                        .into_iter()
                        .filter(move |record| filter.matches(&record.data))
                        .map(Ok),
                )
            })
            .boxed()
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn close(&self) {}
}
