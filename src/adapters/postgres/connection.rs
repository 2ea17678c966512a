//! Postgres connection pool management.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::DatabaseConfig;

/// Sink database connection pool.
#[derive(Debug)]
pub struct SinkConnection {
    pool: PgPool,
}

impl SinkConnection {
    /// Create a connection pool from the sink database configuration.
    ///
    /// Fails fast on an empty URL rather than letting the driver produce an
    /// opaque parse error.
    pub async fn connect(config: &DatabaseConfig) -> DomainResult<Self> {
        if config.url.is_empty() {
            return Err(DomainError::ValidationFailed(
                "database.url is not set; export STRATIFY_DATABASE__URL or add it to \
                 .stratify/local.yaml"
                    .to_string(),
            ));
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(&config.url)
            .await
            .map_err(|e| {
                DomainError::DatabaseError(format!("failed to create connection pool: {e}"))
            })?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close the connection pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_url_rejected_before_connecting() {
        let config = DatabaseConfig::default();
        let result = SinkConnection::connect(&config).await;
        match result {
            Err(DomainError::ValidationFailed(msg)) => {
                assert!(msg.contains("STRATIFY_DATABASE__URL"), "got: {msg}");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
