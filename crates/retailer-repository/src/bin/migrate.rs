use anyhow::{Context, Result};
use retailer_repository::PostgresRepository;
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let database_url = env::var("DATABASE_URL")
        .or_else(|_| env::var("RETAILER_DATABASE_URL"))
        .context("DATABASE_URL (or RETAILER_DATABASE_URL) must be set")?;
    let repo = PostgresRepository::connect(&database_url, 1).await?;
    repo.run_migrations().await?;
    Ok(())
}
