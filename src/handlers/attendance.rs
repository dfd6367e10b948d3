use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::ClockInInput;
use crate::database::repositories::AttendanceRepository;
use crate::error::AppError;
use crate::handlers::shared::{ApiResponse, Page, Paginated};
use crate::services::attendance::AttendanceService;
use crate::services::auth::Claims;

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub user_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

pub async fn clock_in(
    claims: Claims,
    service: web::Data<AttendanceService>,
    input: web::Json<ClockInInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_employee() && !claims.is_admin() {
        return Err(AppError::Forbidden("Insufficient permissions".to_string()));
    }

    let log = service.clock_in(claims.sub, input.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(log)))
}

pub async fn clock_out(
    claims: Claims,
    service: web::Data<AttendanceService>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_employee() && !claims.is_admin() {
        return Err(AppError::Forbidden("Insufficient permissions".to_string()));
    }

    let log = service.clock_out(claims.sub).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(log)))
}

/// Today's clock state for the authenticated employee.
pub async fn today_status(
    claims: Claims,
    service: web::Data<AttendanceService>,
) -> Result<HttpResponse, AppError> {
    let status = service.today_status(claims.sub).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(status)))
}

pub async fn list_logs(
    claims: Claims,
    repo: web::Data<AttendanceRepository>,
    query: web::Query<LogsQuery>,
) -> Result<HttpResponse, AppError> {
    let user_filter = if claims.is_admin() {
        query.user_id
    } else {
        match query.user_id {
            Some(uid) if uid != claims.sub => {
                return Err(AppError::Forbidden(
                    "You can only access your own data".to_string(),
                ));
            }
            _ => Some(claims.sub),
        }
    };

    let page = Page::from_params(query.page, query.size);
    let (logs, total) = repo
        .list_logs(user_filter, query.from, query.to, page.page, page.size)
        .await?;

    Ok(HttpResponse::Ok()
        .insert_header(("X-Total-Count", total.to_string()))
        .json(Paginated::new(logs, total, page)))
}
