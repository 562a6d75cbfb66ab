//! Repository for the exchange log.
//!
//! The log is append-only: there is no update or delete path.

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::{CreateExchange, Exchange};

/// Repository for exchange database operations.
#[derive(Debug, Clone)]
pub struct ExchangeRepository {
    pool: SqlitePool,
}

impl ExchangeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a new exchange. The timestamp is assigned here.
    #[instrument(skip(self, exchange), fields(source = %exchange.source))]
    pub async fn insert(&self, exchange: CreateExchange) -> Result<Exchange> {
        // Fixed-width UTC so text order matches time order.
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO exchanges (prompt, image, response, source, timestamp)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&exchange.prompt)
        .bind(&exchange.image)
        .bind(&exchange.response)
        .bind(exchange.source.to_string())
        .bind(&timestamp)
        .fetch_one(&self.pool)
        .await
        .context("inserting exchange")?;

        debug!(id, "recorded exchange");
        self.get(id)
            .await?
            .with_context(|| format!("exchange {} not found after insert", id))
    }

    /// Get an exchange by ID.
    pub async fn get(&self, id: i64) -> Result<Option<Exchange>> {
        sqlx::query_as::<_, Exchange>(
            "SELECT id, prompt, image, response, source, timestamp FROM exchanges WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("fetching exchange")
    }

    /// All exchanges, newest first.
    #[instrument(skip(self))]
    pub async fn list_newest_first(&self) -> Result<Vec<Exchange>> {
        sqlx::query_as::<_, Exchange>(
            r#"
            SELECT id, prompt, image, response, source, timestamp
            FROM exchanges
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("listing exchanges")
    }

    /// The most recent `limit` exchanges, newest first.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<Exchange>> {
        sqlx::query_as::<_, Exchange>(
            r#"
            SELECT id, prompt, image, response, source, timestamp
            FROM exchanges
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("listing recent exchanges")
    }

    /// Count stored exchanges.
    pub async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM exchanges")
            .fetch_one(&self.pool)
            .await
            .context("counting exchanges")
    }
}
