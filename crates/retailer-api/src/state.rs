use std::sync::Arc;

use anyhow::{Context, Result};
use retailer_core::settings::ServiceSettings;
use retailer_repository::{InMemoryRepository, PostgresRepository, RetailerRepository};
use tracing::{info, warn};

use crate::config::{AppConfig, StoreKind};

/// Shared by every handler. The store handle is opened once at startup and
/// closed after the server stops.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn RetailerRepository>,
    pub settings: ServiceSettings,
}

impl AppState {
    pub fn new(repository: Arc<dyn RetailerRepository>, settings: ServiceSettings) -> Self {
        Self {
            repository,
            settings,
        }
    }

    /// Opens the configured store, applying migrations unless told not to.
    pub async fn open(config: &AppConfig, run_migrations: bool) -> Result<Self> {
        let repository: Arc<dyn RetailerRepository> = match config.store {
            StoreKind::Postgres => {
                let repository = connect_postgres(config).await?;
                if run_migrations {
                    repository
                        .run_migrations()
                        .await
                        .context("failed to run database migrations")?;
                    info!("Database migrations applied");
                } else {
                    warn!("Skipping migrations at user request");
                }
                Arc::new(repository)
            }
            StoreKind::Memory => {
                warn!("Using in-memory record store; submissions will not survive a restart");
                Arc::new(InMemoryRepository::new())
            }
        };

        Ok(Self::new(repository, config.settings))
    }

    pub async fn close(&self) {
        self.repository.close().await;
    }
}

pub async fn connect_postgres(config: &AppConfig) -> Result<PostgresRepository> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL (or RETAILER_DATABASE_URL) must be set")?;

    PostgresRepository::connect(database_url, config.max_connections)
        .await
        .context("failed to connect to Postgres")
}
