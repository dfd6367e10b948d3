use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// One stored response per client-supplied key. Write-once: the first writer
/// wins and later writers are silently ignored.
#[derive(Debug, Clone, FromRow)]
pub struct IdempotencyRecord {
    pub key: String,
    pub response_body: String,
    pub status_code: i32,
    pub created_at: DateTime<Utc>,
}
