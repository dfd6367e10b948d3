use chrono::{NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::database::models::{HalfDay, LeaveAudit, LeaveRequest, LeaveRequestInput, LeaveStatus};

const REQUEST_COLUMNS: &str = r#"
    id,
    user_id,
    policy_id,
    status,
    start_date,
    end_date,
    half_day,
    reason,
    approved_by,
    approved_at,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct LeaveRepository {
    pool: PgPool,
}

impl LeaveRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new PENDING request inside the caller's transaction.
    pub async fn create_request(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        input: &LeaveRequestInput,
    ) -> Result<LeaveRequest, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO
                leave_requests (user_id, policy_id, status, start_date, end_date, half_day, reason)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {REQUEST_COLUMNS}
            "#
        );

        sqlx::query_as::<_, LeaveRequest>(&query)
            .bind(user_id)
            .bind(input.policy_id)
            .bind(LeaveStatus::Pending)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.half_day)
            .bind(&input.reason)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn get_request_by_id(&self, id: Uuid) -> Result<Option<LeaveRequest>, sqlx::Error> {
        let query = format!("SELECT {REQUEST_COLUMNS} FROM leave_requests WHERE id = $1");

        sqlx::query_as::<_, LeaveRequest>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Filterable, paginated request listing. Returns the page plus the
    /// unpaginated total for the X-Total-Count header.
    pub async fn list_requests(
        &self,
        user_id: Option<Uuid>,
        status: Option<LeaveStatus>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        page: i64,
        size: i64,
    ) -> Result<(Vec<LeaveRequest>, i64), sqlx::Error> {
        fn push_filters(
            builder: &mut QueryBuilder<'_, Postgres>,
            user_id: Option<Uuid>,
            status: Option<LeaveStatus>,
            from: Option<NaiveDate>,
            to: Option<NaiveDate>,
        ) {
            builder.push(" WHERE 1=1");
            if let Some(uid) = user_id {
                builder.push(" AND user_id = ").push_bind(uid);
            }
            if let Some(s) = status {
                builder.push(" AND status = ").push_bind(s);
            }
            // "from"/"to" select requests whose span touches the window.
            if let Some(f) = from {
                builder.push(" AND end_date >= ").push_bind(f);
            }
            if let Some(t) = to {
                builder.push(" AND start_date <= ").push_bind(t);
            }
        }

        let mut count_builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM leave_requests");
        push_filters(&mut count_builder, user_id, status, from, to);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {REQUEST_COLUMNS} FROM leave_requests"));
        push_filters(&mut builder, user_id, status, from, to);
        builder.push(" ORDER BY created_at DESC");
        builder.push(" LIMIT ").push_bind(size);
        builder.push(" OFFSET ").push_bind((page - 1) * size);

        let requests = builder
            .build_query_as::<LeaveRequest>()
            .fetch_all(&self.pool)
            .await?;

        Ok((requests, total))
    }

    /// True when a PENDING or APPROVED request for the same employee touches
    /// the closed interval [start, end].
    pub async fn has_overlapping_request(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        exclude_request_id: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            r#"
            SELECT COUNT(*) FROM leave_requests
            WHERE status IN ('PENDING', 'APPROVED')
            "#,
        );
        builder.push(" AND user_id = ").push_bind(user_id);
        builder.push(" AND start_date <= ").push_bind(end);
        builder.push(" AND end_date >= ").push_bind(start);
        if let Some(exclude) = exclude_request_id {
            builder.push(" AND id != ").push_bind(exclude);
        }

        let count: i64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Move a PENDING request to a terminal status. The status predicate
    /// makes the transition one-directional even under concurrent callers;
    /// a zero row count means the request was no longer pending.
    pub async fn update_request_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        status: LeaveStatus,
        approved_by: Uuid,
    ) -> Result<Option<LeaveRequest>, sqlx::Error> {
        let now = Utc::now();
        let query = format!(
            r#"
            UPDATE leave_requests
            SET
                status = $1,
                approved_by = $2,
                approved_at = $3,
                updated_at = $3
            WHERE
                id = $4
                AND status = $5
            RETURNING {REQUEST_COLUMNS}
            "#
        );

        sqlx::query_as::<_, LeaveRequest>(&query)
            .bind(status)
            .bind(approved_by)
            .bind(now)
            .bind(id)
            .bind(LeaveStatus::Pending)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Append an audit entry. The table is append-only; nothing ever
    /// updates or deletes these rows.
    pub async fn create_audit(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request_id: Uuid,
        action: &str,
        actor_id: Uuid,
        notes: Option<&str>,
    ) -> Result<LeaveAudit, sqlx::Error> {
        sqlx::query_as::<_, LeaveAudit>(
            r#"
            INSERT INTO
                leave_audit (request_id, action, actor_id, notes)
            VALUES
                ($1, $2, $3, $4)
            RETURNING
                id, request_id, action, actor_id, notes, created_at
            "#,
        )
        .bind(request_id)
        .bind(action)
        .bind(actor_id)
        .bind(notes)
        .fetch_one(&mut **tx)
        .await
    }

    /// Minimal rows for the leave summary report: status plus the span
    /// needed to re-run the day-counting rule on the read side.
    pub async fn spans_since(
        &self,
        from: chrono::DateTime<Utc>,
    ) -> Result<Vec<LeaveSpan>, sqlx::Error> {
        sqlx::query_as::<_, LeaveSpan>(
            r#"
            SELECT status, start_date, end_date, half_day
            FROM leave_requests
            WHERE created_at >= $1
            "#,
        )
        .bind(from)
        .fetch_all(&self.pool)
        .await
    }
}

/// Projection used by the reporting aggregation.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LeaveSpan {
    pub status: LeaveStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub half_day: Option<HalfDay>,
}
