use sqlx::PgPool;

use crate::database::models::IdempotencyRecord;

#[derive(Clone)]
pub struct IdempotencyRepository {
    pool: PgPool,
}

impl IdempotencyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a stored response if it exists and has not aged past the
    /// retention window. An expired record is indistinguishable from a
    /// missing one.
    pub async fn get(
        &self,
        key: &str,
        ttl_hours: i64,
    ) -> Result<Option<IdempotencyRecord>, sqlx::Error> {
        sqlx::query_as::<_, IdempotencyRecord>(
            r#"
            SELECT key, response_body, status_code, created_at
            FROM idempotency_keys
            WHERE key = $1 AND created_at > NOW() - ($2::bigint * INTERVAL '1 hour')
            "#,
        )
        .bind(key)
        .bind(ttl_hours)
        .fetch_optional(&self.pool)
        .await
    }

    /// Insert-if-absent in a single statement. Two concurrent writers for
    /// the same key race on the primary key, and only the first insert is
    /// kept; the loser's write is dropped without an error.
    pub async fn store(
        &self,
        key: &str,
        response_body: &str,
        status_code: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO idempotency_keys (key, response_body, status_code)
            VALUES ($1, $2, $3)
            ON CONFLICT (key) DO NOTHING
            "#,
        )
        .bind(key)
        .bind(response_body)
        .bind(status_code)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete records older than the retention window. Called by the
    /// periodic sweep task.
    pub async fn cleanup(&self, ttl_hours: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM idempotency_keys
            WHERE created_at < NOW() - ($1::bigint * INTERVAL '1 hour')
            "#,
        )
        .bind(ttl_hours)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
