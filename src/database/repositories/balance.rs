use bigdecimal::BigDecimal;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::models::{BalanceWithPolicy, LeaveBalance};

const BALANCE_COLUMNS: &str = "id, user_id, policy_id, balance_days, updated_at";

/// Owns the leave-balance rows. All mutation goes through `deduct` and
/// `accrue`; nothing else writes to leave_balances.
#[derive(Clone)]
pub struct BalanceRepository {
    pool: PgPool,
}

impl BalanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_balance(
        &self,
        user_id: Uuid,
        policy_id: Uuid,
    ) -> Result<Option<LeaveBalance>, sqlx::Error> {
        let query = format!(
            "SELECT {BALANCE_COLUMNS} FROM leave_balances WHERE user_id = $1 AND policy_id = $2"
        );

        sqlx::query_as::<_, LeaveBalance>(&query)
            .bind(user_id)
            .bind(policy_id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn get_balances_with_policy(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<BalanceWithPolicy>, sqlx::Error> {
        sqlx::query_as::<_, BalanceWithPolicy>(
            r#"
            SELECT
                lb.id,
                lb.user_id,
                lb.policy_id,
                lb.balance_days,
                lb.updated_at,
                lp.category,
                lp.max_days
            FROM
                leave_balances lb
                JOIN leave_policies lp ON lb.policy_id = lp.id
            WHERE
                lb.user_id = $1
            ORDER BY
                lp.category
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Atomic guarded read-modify-write: the `balance_days >= $1` predicate
    /// means the update can never drive the balance negative. Returns the
    /// new balance, or None when no row matched (missing row or
    /// insufficient balance; the caller disambiguates with `get_balance`).
    pub async fn deduct(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        policy_id: Uuid,
        days: &BigDecimal,
    ) -> Result<Option<BigDecimal>, sqlx::Error> {
        sqlx::query_scalar::<_, BigDecimal>(
            r#"
            UPDATE leave_balances
            SET
                balance_days = balance_days - $1,
                updated_at = $2
            WHERE
                user_id = $3
                AND policy_id = $4
                AND balance_days >= $1
            RETURNING balance_days
            "#,
        )
        .bind(days)
        .bind(Utc::now())
        .bind(user_id)
        .bind(policy_id)
        .fetch_optional(&mut **tx)
        .await
    }

    /// Credit days to a balance, creating the row when absent.
    pub async fn accrue(
        &self,
        user_id: Uuid,
        policy_id: Uuid,
        days: &BigDecimal,
    ) -> Result<LeaveBalance, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO
                leave_balances (user_id, policy_id, balance_days)
            VALUES
                ($1, $2, $3)
            ON CONFLICT (user_id, policy_id) DO UPDATE
            SET
                balance_days = leave_balances.balance_days + EXCLUDED.balance_days,
                updated_at = NOW()
            RETURNING {BALANCE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, LeaveBalance>(&query)
            .bind(user_id)
            .bind(policy_id)
            .bind(days)
            .fetch_one(&self.pool)
            .await
    }
}
