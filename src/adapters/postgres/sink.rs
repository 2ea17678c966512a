//! Postgres implementation of the record sink.
//!
//! Replaces a destination table wholesale: drop, recreate with one TEXT
//! column per record field, and insert in chunks inside a single
//! transaction. Values arrive as opaque JSON scalars and are stored in
//! their text rendering; the sink enforces no schema beyond uniform keys.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPool;
use sqlx::{Postgres, QueryBuilder, Row};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Record;
use crate::domain::ports::RecordSink;

/// Postgres bind parameters are a u16 count; batches must stay under it.
const MAX_BIND_PARAMS: usize = u16::MAX as usize;

/// Quote a SQL identifier, escaping embedded double quotes.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Render a JSON scalar as a text column value; `None` maps to SQL NULL.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Record sink backed by a Postgres database.
pub struct PostgresSink {
    pool: PgPool,
    /// Rows per INSERT batch.
    chunk_size: usize,
}

impl PostgresSink {
    pub fn new(pool: PgPool, chunk_size: usize) -> Self {
        Self {
            pool,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Rows per batch, clamped so `rows * columns` stays within the bind
    /// parameter limit.
    fn rows_per_batch(&self, columns: usize) -> usize {
        self.chunk_size.min(MAX_BIND_PARAMS / columns.max(1)).max(1)
    }
}

#[async_trait]
impl RecordSink for PostgresSink {
    async fn replace_table(&self, table: &str, records: &[Record]) -> DomainResult<u64> {
        if records.is_empty() {
            return Err(DomainError::ValidationFailed(
                "refusing to replace a table with zero records".to_string(),
            ));
        }

        // Column set from the first record; records are uniformly keyed by
        // contract, and missing fields bind as NULL.
        let columns: Vec<String> = records[0].fields().keys().cloned().collect();
        let column_list = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let column_defs = columns
            .iter()
            .map(|c| format!("{} TEXT", quote_ident(c)))
            .collect::<Vec<_>>()
            .join(", ");

        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("DROP TABLE IF EXISTS {}", quote_ident(table)))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!(
            "CREATE TABLE {} ({column_defs})",
            quote_ident(table)
        ))
        .execute(&mut *tx)
        .await?;

        let batch_rows = self.rows_per_batch(columns.len());
        for batch in records.chunks(batch_rows) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
                "INSERT INTO {} ({column_list}) ",
                quote_ident(table)
            ));
            builder.push_values(batch, |mut row, record| {
                for column in &columns {
                    row.push_bind(record.fields().get(column).and_then(scalar_text));
                }
            });
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;

        tracing::info!(
            table,
            rows = records.len(),
            columns = columns.len(),
            "replaced sink table"
        );
        Ok(records.len() as u64)
    }

    async fn count_rows(&self, table: &str) -> DomainResult<i64> {
        let count: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", quote_ident(table)))
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn category_distribution(
        &self,
        table: &str,
        column: &str,
        limit: i64,
    ) -> DomainResult<Vec<(String, i64)>> {
        let sql = format!(
            "SELECT {col}, COUNT(*) AS count FROM {table} \
             GROUP BY {col} ORDER BY count DESC, {col} ASC LIMIT $1",
            col = quote_ident(column),
            table = quote_ident(table),
        );
        let rows = sqlx::query(&sql).bind(limit).fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let value: Option<String> = row.get(0);
                let count: i64 = row.get(1);
                (
                    value.unwrap_or_else(|| {
                        crate::domain::models::UNKNOWN_CATEGORY.to_string()
                    }),
                    count,
                )
            })
            .collect())
    }

    async fn distinct_values(&self, table: &str, column: &str) -> DomainResult<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT {col} FROM {table} WHERE {col} IS NOT NULL",
            col = quote_ident(column),
            table = quote_ident(table),
        );
        let rows = sqlx::query_scalar::<_, String>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
