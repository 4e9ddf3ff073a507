use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::{postgres::PgRow, types::Json, PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::store::{Document, DocumentStore};

/// Document store backed by one JSONB table per collection
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn table(collection: &str) -> Result<String, DatabaseError> {
        DatabaseManager::validate_collection_name(collection)?;
        Ok(DatabaseManager::quote_identifier(collection))
    }

    fn row_to_document(row: &PgRow) -> Result<Document, DatabaseError> {
        let id: Uuid = row.try_get("id")?;
        let body: Value = row.try_get("body")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

        match body {
            Value::Object(body) => Ok(Document {
                id,
                body,
                created_at,
                updated_at,
            }),
            _ => Err(DatabaseError::QueryError(format!(
                "document {} has a non-object body",
                id
            ))),
        }
    }
}

const COLUMNS: &str = "id, body, created_at, updated_at";

/// Rows share `created_at` within a batch; `seq` keeps their insertion order
fn create_table_sql(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (
            seq BIGSERIAL NOT NULL,
            id UUID PRIMARY KEY,
            body JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
        table
    )
}

fn select_page_sql(table: &str) -> String {
    format!(
        "SELECT {} FROM {} ORDER BY seq LIMIT $1 OFFSET $2",
        COLUMNS, table
    )
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ensure_collection(&self, collection: &str) -> Result<(), DatabaseError> {
        let table = Self::table(collection)?;
        let index = DatabaseManager::quote_identifier(&format!("{}_seq_idx", collection));

        sqlx::query(&create_table_sql(&table))
            .execute(&self.pool)
            .await?;

        // Tables created before the sequence column existed
        sqlx::query(&format!(
            "ALTER TABLE {} ADD COLUMN IF NOT EXISTS seq BIGSERIAL NOT NULL",
            table
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} (seq)",
            index, table
        ))
        .execute(&self.pool)
        .await?;

        info!("Ensured collection table {}", table);
        Ok(())
    }

    async fn insert_many(
        &self,
        collection: &str,
        bodies: Vec<Map<String, Value>>,
    ) -> Result<Vec<Document>, DatabaseError> {
        let table = Self::table(collection)?;
        let sql = format!(
            "INSERT INTO {} (id, body, created_at, updated_at) VALUES ($1, $2, $3, $3) RETURNING {}",
            table, COLUMNS
        );
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;
        let mut documents = Vec::with_capacity(bodies.len());
        for body in bodies {
            let row = sqlx::query(&sql)
                .bind(Uuid::new_v4())
                .bind(Json(Value::Object(body)))
                .bind(now)
                .fetch_one(&mut *tx)
                .await?;
            documents.push(Self::row_to_document(&row)?);
        }
        tx.commit().await?;

        debug!("Inserted {} documents into {}", documents.len(), table);
        Ok(documents)
    }

    async fn find_all(
        &self,
        collection: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Document>, DatabaseError> {
        let table = Self::table(collection)?;
        let rows = sqlx::query(&select_page_sql(&table))
            .bind(limit)
            .bind(offset.unwrap_or(0))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_document).collect()
    }

    async fn find_ids(&self, collection: &str, ids: &[Uuid]) -> Result<Vec<Document>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let table = Self::table(collection)?;
        let rows = sqlx::query(&format!(
            "SELECT {} FROM {} WHERE id = ANY($1)",
            COLUMNS, table
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_document).collect()
    }

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Document>, DatabaseError> {
        let table = Self::table(collection)?;
        let row = sqlx::query(&format!("SELECT {} FROM {} WHERE id = $1", COLUMNS, table))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_document).transpose()
    }

    async fn replace(
        &self,
        collection: &str,
        id: Uuid,
        body: Map<String, Value>,
    ) -> Result<Option<Document>, DatabaseError> {
        let table = Self::table(collection)?;
        let row = sqlx::query(&format!(
            "UPDATE {} SET body = $2, updated_at = now() WHERE id = $1 RETURNING {}",
            table, COLUMNS
        ))
        .bind(id)
        .bind(Json(Value::Object(body)))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_document).transpose()
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<Option<Document>, DatabaseError> {
        let table = Self::table(collection)?;
        let row = sqlx::query(&format!("DELETE FROM {} WHERE id = $1 RETURNING {}", table, COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_document).transpose()
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
