use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::LeavePolicy;

#[derive(Clone)]
pub struct PolicyRepository {
    pool: PgPool,
}

impl PolicyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_all(&self) -> Result<Vec<LeavePolicy>, sqlx::Error> {
        sqlx::query_as::<_, LeavePolicy>(
            r#"
            SELECT
                id,
                category,
                max_days,
                carry_forward,
                accrual,
                min_notice_days,
                created_at,
                updated_at
            FROM
                leave_policies
            ORDER BY
                category
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<LeavePolicy>, sqlx::Error> {
        sqlx::query_as::<_, LeavePolicy>(
            r#"
            SELECT
                id,
                category,
                max_days,
                carry_forward,
                accrual,
                min_notice_days,
                created_at,
                updated_at
            FROM
                leave_policies
            WHERE
                id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}
