use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use super::{DocPath, DocumentStore};

/// Documents kept as JSONB rows keyed by `(collection, id)`.
#[derive(Clone)]
pub struct PgDocumentStore {
    db: PgPool,
}

impl PgDocumentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, path: &DocPath) -> anyhow::Result<Option<Value>> {
        let row = sqlx::query_as::<_, (Value,)>(
            r#"
            SELECT data
              FROM documents
             WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(&path.collection)
        .bind(&path.id)
        .fetch_optional(&self.db)
        .await
        .with_context(|| format!("get document {}", path))?;
        Ok(row.map(|(data,)| data))
    }

    async fn list(&self, collection: &str) -> anyhow::Result<Vec<(String, Value)>> {
        let rows = sqlx::query_as::<_, (String, Value)>(
            r#"
            SELECT id, data
              FROM documents
             WHERE collection = $1
             ORDER BY id ASC
            "#,
        )
        .bind(collection)
        .fetch_all(&self.db)
        .await
        .with_context(|| format!("list collection {}", collection))?;
        Ok(rows)
    }

    async fn set(&self, path: &DocPath, data: Value) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = now()
            "#,
        )
        .bind(&path.collection)
        .bind(&path.id)
        .bind(data)
        .execute(&self.db)
        .await
        .with_context(|| format!("set document {}", path))?;
        Ok(())
    }

    async fn merge(&self, path: &DocPath, data: Value) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET data = documents.data || EXCLUDED.data, updated_at = now()
            "#,
        )
        .bind(&path.collection)
        .bind(&path.id)
        .bind(data)
        .execute(&self.db)
        .await
        .with_context(|| format!("merge document {}", path))?;
        Ok(())
    }

    async fn delete(&self, path: &DocPath) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            DELETE FROM documents
             WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(&path.collection)
        .bind(&path.id)
        .execute(&self.db)
        .await
        .with_context(|| format!("delete document {}", path))?;
        Ok(())
    }
}
