use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::{
    db::ClothingStore,
    error::AppResult,
    models::{ClothingId, ClothingPatch, ClothingRecord, ConditionFilter, NewClothingItem},
};

/// Creates a PostgreSQL connection pool
///
/// Connections are opened on first use, so the server starts even when the
/// database is unreachable and failures surface per request instead.
pub fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect_lazy(database_url)?;

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Clothing store backed by the `clothing_items` table
#[derive(Clone)]
pub struct PgClothingStore {
    pool: PgPool,
}

impl PgClothingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ClothingStore for PgClothingStore {
    async fn list(&self) -> AppResult<Vec<ClothingRecord>> {
        let rows = sqlx::query_as::<_, ClothingRecord>(
            r#"
            SELECT id, name, weather_conditions, created_at
            FROM clothing_items
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn get(&self, id: ClothingId) -> AppResult<Option<ClothingRecord>> {
        let row = sqlx::query_as::<_, ClothingRecord>(
            r#"
            SELECT id, name, weather_conditions, created_at
            FROM clothing_items
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_matching(&self, filter: &ConditionFilter) -> AppResult<Vec<ClothingRecord>> {
        // `&&` is array overlap: true when the arrays share any element
        let rows = sqlx::query_as::<_, ClothingRecord>(
            r#"
            SELECT id, name, weather_conditions, created_at
            FROM clothing_items
            WHERE weather_conditions && $1
            ORDER BY created_at, id
            "#,
        )
        .bind(filter.tokens())
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(
            tokens = ?filter.tokens(),
            matches = rows.len(),
            "Clothing filter executed"
        );

        Ok(rows)
    }

    async fn create(&self, item: NewClothingItem) -> AppResult<ClothingRecord> {
        let row = sqlx::query_as::<_, ClothingRecord>(
            r#"
            INSERT INTO clothing_items (id, name, weather_conditions)
            VALUES ($1, $2, $3)
            RETURNING id, name, weather_conditions, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&item.name)
        .bind(&item.weather_conditions)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, id: ClothingId, patch: ClothingPatch) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE clothing_items
            SET name = COALESCE($2, name),
                weather_conditions = COALESCE($3, weather_conditions)
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(patch.name)
        .bind(patch.weather_conditions)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: ClothingId) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM clothing_items WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
