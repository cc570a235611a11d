//! PostgreSQL stores.
//!
//! Similarity is delegated to `pg_trgm`, so ranked search scans the index inside the
//! database instead of shipping every key to the service.

use super::{EmployeeStore, ReverseIndexEntry, ReverseIndexStore, ScoredEntry};
use crate::employees::types::{EmployeeField, EmployeeId, EmployeeSummary};
use crate::error::StoreError;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{FromRow, Row};

pub async fn connect(database_url: &str) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    tracing::info!("Connected to PostgreSQL");
    Ok(pool)
}

/// Creates the extension and tables this crate relies on, if missing.
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    let statements = [
        "CREATE EXTENSION IF NOT EXISTS pg_trgm",
        r#"
        CREATE TABLE IF NOT EXISTS employees (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            surname TEXT NOT NULL,
            patronymic TEXT,
            role TEXT,
            email TEXT,
            birthday TEXT,
            telegram_id TEXT,
            vk_id TEXT,
            team TEXT,
            phones TEXT[] NOT NULL DEFAULT '{}',
            photo_link TEXT
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS reverse_index (
            key TEXT PRIMARY KEY,
            ids TEXT[] NOT NULL
        )
        "#,
        "CREATE INDEX IF NOT EXISTS reverse_index_key_trgm ON reverse_index USING gin (key gin_trgm_ops)",
    ];

    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Escapes `LIKE` metacharacters so the prefix is matched literally.
pub fn escape_like(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[derive(Clone, Debug)]
pub struct PgReverseIndex {
    pool: PgPool,
}

impl PgReverseIndex {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct IndexRow {
    key: String,
    ids: Vec<String>,
}

#[derive(FromRow)]
struct ScoredRow {
    key: String,
    ids: Vec<String>,
    score: f32,
}

#[async_trait]
impl ReverseIndexStore for PgReverseIndex {
    async fn append(&self, id: &str, keys: &[String]) -> Result<(), StoreError> {
        if keys.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            INSERT INTO reverse_index (key, ids)
            SELECT key, ARRAY[$1::text]
            FROM unnest($2::text[]) AS key
            ON CONFLICT (key) DO UPDATE
            SET ids = array_append(reverse_index.ids, $1::text)
            "#,
        )
        .bind(id)
        .bind(keys)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, id: &str, keys: &[String]) -> Result<(), StoreError> {
        if keys.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE reverse_index SET ids = array_remove(ids, $1) WHERE key = ANY($2)")
            .bind(id)
            .bind(keys)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM reverse_index WHERE key = ANY($1) AND cardinality(ids) = 0")
            .bind(keys)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn lookup(&self, key: &str) -> Result<Option<Vec<EmployeeId>>, StoreError> {
        let row: Option<IndexRow> =
            sqlx::query_as("SELECT key, ids FROM reverse_index WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|row| row.ids))
    }

    async fn similar(
        &self,
        tokens: &[String],
        threshold: f64,
    ) -> Result<Vec<ScoredEntry>, StoreError> {
        let rows: Vec<ScoredRow> = sqlx::query_as(
            r#"
            SELECT r.key, r.ids, similarity(t.token, r.key) AS score
            FROM reverse_index AS r, unnest($1::text[]) AS t(token)
            WHERE similarity(t.token, r.key) > $2
            "#,
        )
        .bind(tokens)
        .bind(threshold as f32)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ScoredEntry {
                key: row.key,
                ids: row.ids,
                score: f64::from(row.score),
            })
            .collect())
    }

    async fn prefixed(&self, prefix: &str) -> Result<Vec<ReverseIndexEntry>, StoreError> {
        let pattern = format!("{}%", escape_like(prefix));
        let rows: Vec<IndexRow> = sqlx::query_as(
            r"SELECT key, ids FROM reverse_index WHERE key LIKE $1 ESCAPE '\' ORDER BY key",
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ReverseIndexEntry {
                key: row.key,
                ids: row.ids,
            })
            .collect())
    }
}

#[derive(Clone, Debug)]
pub struct PgEmployees {
    pool: PgPool,
}

impl PgEmployees {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct SummaryRow {
    id: String,
    name: String,
    surname: String,
    patronymic: Option<String>,
    photo_link: Option<String>,
}

#[async_trait]
impl EmployeeStore for PgEmployees {
    async fn fetch_summaries(&self, ids: &[EmployeeId]) -> Result<Vec<EmployeeSummary>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<SummaryRow> = sqlx::query_as(
            r#"
            SELECT e.id, e.name, e.surname, e.patronymic, e.photo_link
            FROM employees AS e
            JOIN unnest($1::text[]) WITH ORDINALITY AS t(id, ord) USING (id)
            ORDER BY t.ord
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| EmployeeSummary {
                id: row.id,
                name: row.name,
                surname: row.surname,
                patronymic: row.patronymic,
                photo_link: row.photo_link,
            })
            .collect())
    }

    async fn fetch_values(
        &self,
        id: &str,
        fields: &[EmployeeField],
    ) -> Result<Option<Vec<String>>, StoreError> {
        if fields.is_empty() {
            let exists: Option<PgRow> = sqlx::query("SELECT 1 FROM employees WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            return Ok(exists.map(|_| Vec::new()));
        }

        // Column names come from `EmployeeField::column`, never from input.
        let columns: Vec<&str> = fields.iter().map(|field| field.column()).collect();
        let query = format!("SELECT {} FROM employees WHERE id = $1", columns.join(", "));

        let Some(row) = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let mut values = Vec::new();
        for field in fields {
            if *field == EmployeeField::Phones {
                let phones: Option<Vec<String>> = row.try_get(field.column())?;
                values.extend(phones.unwrap_or_default());
            } else {
                let value: Option<String> = row.try_get(field.column())?;
                values.extend(value);
            }
        }
        Ok(Some(values))
    }
}
