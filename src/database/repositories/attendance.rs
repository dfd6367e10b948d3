use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::models::{AttendanceLog, ClockSource};

const LOG_COLUMNS: &str = r#"
    id,
    user_id,
    work_date,
    clock_in,
    clock_out,
    duration_minutes,
    lat,
    lng,
    source,
    created_at
"#;

#[derive(Clone)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Latest row for today, open or closed. Drives the status read.
    pub async fn get_today_log(&self, user_id: Uuid) -> Result<Option<AttendanceLog>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {LOG_COLUMNS}
            FROM attendance_logs
            WHERE user_id = $1 AND work_date = CURRENT_DATE
            ORDER BY clock_in DESC
            LIMIT 1
            "#
        );

        sqlx::query_as::<_, AttendanceLog>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Today's open row, if any. Open means no clock-out yet.
    pub async fn get_open_log(&self, user_id: Uuid) -> Result<Option<AttendanceLog>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {LOG_COLUMNS}
            FROM attendance_logs
            WHERE user_id = $1 AND work_date = CURRENT_DATE AND clock_out IS NULL
            ORDER BY clock_in DESC
            LIMIT 1
            "#
        );

        sqlx::query_as::<_, AttendanceLog>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Insert a new open row for today. The partial unique index on
    /// (user_id, work_date) turns a concurrent double clock-in into a
    /// unique violation, which the service maps to ALREADY_CLOCKED_IN.
    pub async fn insert_clock_in(
        &self,
        user_id: Uuid,
        lat: Option<f64>,
        lng: Option<f64>,
        source: ClockSource,
    ) -> Result<AttendanceLog, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO
                attendance_logs (user_id, lat, lng, source)
            VALUES
                ($1, $2, $3, $4)
            RETURNING {LOG_COLUMNS}
            "#
        );

        sqlx::query_as::<_, AttendanceLog>(&query)
            .bind(user_id)
            .bind(lat)
            .bind(lng)
            .bind(source)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn set_clock_out(
        &self,
        id: Uuid,
        clock_out: DateTime<Utc>,
        duration_minutes: i32,
    ) -> Result<AttendanceLog, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE attendance_logs
            SET
                clock_out = $1,
                duration_minutes = $2
            WHERE
                id = $3
            RETURNING {LOG_COLUMNS}
            "#
        );

        sqlx::query_as::<_, AttendanceLog>(&query)
            .bind(clock_out)
            .bind(duration_minutes)
            .bind(id)
            .fetch_one(&self.pool)
            .await
    }

    /// Paginated listing with optional employee and clock-in window filters.
    pub async fn list_logs(
        &self,
        user_id: Option<Uuid>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        page: i64,
        size: i64,
    ) -> Result<(Vec<AttendanceLog>, i64), sqlx::Error> {
        fn push_filters(
            builder: &mut QueryBuilder<'_, Postgres>,
            user_id: Option<Uuid>,
            from: Option<NaiveDate>,
            to: Option<NaiveDate>,
        ) {
            builder.push(" WHERE 1=1");
            if let Some(uid) = user_id {
                builder.push(" AND user_id = ").push_bind(uid);
            }
            if let Some(f) = from {
                builder.push(" AND work_date >= ").push_bind(f);
            }
            if let Some(t) = to {
                builder.push(" AND work_date <= ").push_bind(t);
            }
        }

        let mut count_builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM attendance_logs");
        push_filters(&mut count_builder, user_id, from, to);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {LOG_COLUMNS} FROM attendance_logs"));
        push_filters(&mut builder, user_id, from, to);
        builder.push(" ORDER BY clock_in DESC");
        builder.push(" LIMIT ").push_bind(size);
        builder.push(" OFFSET ").push_bind((page - 1) * size);

        let logs = builder
            .build_query_as::<AttendanceLog>()
            .fetch_all(&self.pool)
            .await?;

        Ok((logs, total))
    }
}
