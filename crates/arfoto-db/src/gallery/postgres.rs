use arfoto_core::{GalleryRecord, NewGalleryRecord};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres};
use std::time::Duration;
use uuid::Uuid;

use crate::error::{validate_collection, DocumentStoreResult};
use crate::store::DocumentStore;

const MAX_CONNECTIONS: u32 = 5;
const CONNECTION_TIMEOUT_SECS: u64 = 30;

/// Gallery records in Postgres
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and make sure the gallery table exists.
    pub async fn connect(database_url: &str) -> DocumentStoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(CONNECTION_TIMEOUT_SECS))
            .connect(database_url)
            .await?;

        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> DocumentStoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS gallery_records (
                id UUID PRIMARY KEY,
                collection TEXT NOT NULL,
                url TEXT NOT NULL,
                avatar TEXT NOT NULL,
                avatar_file TEXT NOT NULL,
                file_size BIGINT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS gallery_records_collection_created_at_idx \
             ON gallery_records (collection, created_at DESC)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    #[tracing::instrument(skip(self, record), fields(db.table = "gallery_records", db.operation = "insert"))]
    async fn insert(
        &self,
        collection: &str,
        record: NewGalleryRecord,
    ) -> DocumentStoreResult<GalleryRecord> {
        validate_collection(collection)?;

        // created_at is left to the column default: server time, not client time.
        let record = sqlx::query_as::<Postgres, GalleryRecord>(
            r#"
            INSERT INTO gallery_records (id, collection, url, avatar, avatar_file, file_size)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, url, avatar, avatar_file, created_at, file_size
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(collection)
        .bind(&record.url)
        .bind(&record.avatar)
        .bind(&record.avatar_file)
        .bind(record.file_size)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "gallery_records", db.operation = "select"))]
    async fn list(&self, collection: &str, limit: usize) -> DocumentStoreResult<Vec<GalleryRecord>> {
        validate_collection(collection)?;

        let records = sqlx::query_as::<Postgres, GalleryRecord>(
            r#"
            SELECT id, url, avatar, avatar_file, created_at, file_size
            FROM gallery_records
            WHERE collection = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(collection)
        .bind(limit.min(i64::MAX as usize) as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
