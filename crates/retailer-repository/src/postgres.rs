use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{BoxStream, StreamExt};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::{NewRetailerRecord, RecordId, RepositoryError, RetailerFilter, RetailerRecord, RetailerRepository};

#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
    ) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;
        info!(max_connections, "Postgres connection pool established");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl RetailerRepository for PostgresRepository {
    async fn insert(&self, record: &NewRetailerRecord) -> Result<RecordId, RepositoryError> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO retailers (
                id,
                employee_name,
                retailer_name,
                retailer_contact,
                retailer_email,
                shop_name,
                city_village,
                tehsil,
                district,
                state,
                visiting_date_time,
                bbps,
                aeps,
                dmt,
                cms,
                onboarding_status,
                retailer_image,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(id)
        .bind(&record.employee_name)
        .bind(&record.retailer_name)
        .bind(&record.retailer_contact)
        .bind(&record.retailer_email)
        .bind(&record.shop_name)
        .bind(&record.city_village)
        .bind(&record.tehsil)
        .bind(&record.district)
        .bind(&record.state)
        .bind(record.visiting_date_time)
        .bind(&record.bbps)
        .bind(&record.aeps)
        .bind(&record.dmt)
        .bind(&record.cms)
        .bind(&record.onboarding_status)
        .bind(&record.retailer_image)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    fn query<'a>(
        &'a self,
        filter: &RetailerFilter,
    ) -> BoxStream<'a, Result<RetailerRecord, RepositoryError>> {
        sqlx::query(
            r#"
            SELECT
                id,
                employee_name,
                retailer_name,
                retailer_contact,
                retailer_email,
                shop_name,
                city_village,
                tehsil,
                district,
                state,
                visiting_date_time,
                bbps,
                aeps,
                dmt,
                cms,
                onboarding_status,
                retailer_image,
                created_at
            FROM retailers
            WHERE ($1::timestamptz IS NULL OR visiting_date_time >= $1)
              AND ($2::timestamptz IS NULL OR visiting_date_time <= $2)
              AND ($3::text IS NULL OR employee_name ILIKE $3 ESCAPE '\')
            "#,
        )
        .bind(filter.visited_from)
        .bind(filter.visited_to)
        .bind(filter.employee_name_contains.as_deref().map(like_pattern))
        .fetch(&self.pool)
        .map(|row| match row {
            Ok(row) => record_from_row(&row),
            Err(err) => Err(RepositoryError::Database(err)),
        })
        .boxed()
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

fn record_from_row(row: &PgRow) -> Result<RetailerRecord, RepositoryError> {
    let decode = |err: sqlx::Error| RepositoryError::Decode(err.to_string());

    Ok(RetailerRecord {
        id: row.try_get("id").map_err(decode)?,
        created_at: row.try_get("created_at").map_err(decode)?,
        data: NewRetailerRecord {
            employee_name: row.try_get("employee_name").map_err(decode)?,
            retailer_name: row.try_get("retailer_name").map_err(decode)?,
            retailer_contact: row.try_get("retailer_contact").map_err(decode)?,
            retailer_email: row.try_get("retailer_email").map_err(decode)?,
            shop_name: row.try_get("shop_name").map_err(decode)?,
            city_village: row.try_get("city_village").map_err(decode)?,
            tehsil: row.try_get("tehsil").map_err(decode)?,
            district: row.try_get("district").map_err(decode)?,
            state: row.try_get("state").map_err(decode)?,
            visiting_date_time: row.try_get("visiting_date_time").map_err(decode)?,
            bbps: row.try_get("bbps").map_err(decode)?,
            aeps: row.try_get("aeps").map_err(decode)?,
            dmt: row.try_get("dmt").map_err(decode)?,
            cms: row.try_get("cms").map_err(decode)?,
            onboarding_status: row.try_get("onboarding_status").map_err(decode)?,
            retailer_image: row.try_get("retailer_image").map_err(decode)?,
        },
    })
}

/// Builds an `ILIKE` pattern that matches `needle` literally anywhere.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
