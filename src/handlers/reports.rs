use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::database::models::LeaveStatus;
use crate::database::repositories::{LeaveRepository, LeaveSpan};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;
use crate::services::policy_validator::leave_days;

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// Window size in days, counting back from now.
    pub range: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveSummary {
    pub total_requests: i64,
    pub approved_count: i64,
    pub rejected_count: i64,
    pub pending_count: i64,
    pub cancelled_count: i64,
    pub total_days: BigDecimal,
    pub approval_rate: f64,
}

/// Read-side aggregation over recent leave requests. Reuses the same
/// day-counting rule as validation and deduction so report totals match the
/// ledger.
pub async fn leave_summary(
    claims: Claims,
    repo: web::Data<LeaveRepository>,
    query: web::Query<SummaryQuery>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::Forbidden("Insufficient permissions".to_string()));
    }

    let range_days = query.range.unwrap_or(30).clamp(1, 365);
    let from = Utc::now() - Duration::days(range_days);

    let spans = repo.spans_since(from).await?;
    let summary = summarize(&spans);

    Ok(HttpResponse::Ok().json(ApiResponse::success(summary)))
}

fn summarize(spans: &[LeaveSpan]) -> LeaveSummary {
    let mut summary = LeaveSummary {
        total_requests: 0,
        approved_count: 0,
        rejected_count: 0,
        pending_count: 0,
        cancelled_count: 0,
        total_days: BigDecimal::from(0),
        approval_rate: 0.0,
    };

    for span in spans {
        summary.total_requests += 1;
        match span.status {
            LeaveStatus::Approved => summary.approved_count += 1,
            LeaveStatus::Rejected => summary.rejected_count += 1,
            LeaveStatus::Pending => summary.pending_count += 1,
            LeaveStatus::Cancelled => summary.cancelled_count += 1,
        }
        summary.total_days += leave_days(span.start_date, span.end_date, span.half_day);
    }

    if summary.total_requests > 0 {
        summary.approval_rate =
            (summary.approved_count as f64 / summary.total_requests as f64) * 100.0;
    }

    summary
}
