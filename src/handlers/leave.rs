use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{LeaveRequestInput, LeaveStatus, TransitionInput};
use crate::database::repositories::{BalanceRepository, LeaveRepository, PolicyRepository};
use crate::error::{AppError, ErrorCode};
use crate::handlers::shared::{ApiResponse, Page, Paginated};
use crate::services::auth::Claims;
use crate::services::leave::LeaveService;

#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct RequestsQuery {
    pub user_id: Option<Uuid>,
    pub status: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccrueInput {
    pub user_id: Uuid,
    pub policy_id: Uuid,
    pub days: BigDecimal,
}

/// Employees see their own data; admins may act on anyone's.
fn resolve_target_user(claims: &Claims, requested: Option<Uuid>) -> Result<Uuid, AppError> {
    match requested {
        Some(user_id) if user_id != claims.sub => {
            if claims.is_admin() {
                Ok(user_id)
            } else {
                Err(AppError::Forbidden(
                    "You can only access your own data".to_string(),
                ))
            }
        }
        _ => Ok(claims.sub),
    }
}

/// List the caller's balances (admins may pass user_id) with policy metadata.
pub async fn get_balance(
    claims: Claims,
    repo: web::Data<BalanceRepository>,
    query: web::Query<BalanceQuery>,
) -> Result<HttpResponse, AppError> {
    let target = resolve_target_user(&claims, query.user_id)?;
    let balances = repo.get_balances_with_policy(target).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(balances)))
}

pub async fn list_requests(
    claims: Claims,
    repo: web::Data<LeaveRepository>,
    query: web::Query<RequestsQuery>,
) -> Result<HttpResponse, AppError> {
    let status_filter = match &query.status {
        Some(status_str) => Some(status_str.parse::<LeaveStatus>().map_err(|_| {
            AppError::validation(ErrorCode::InvalidStatus, "Invalid status")
        })?),
        None => None,
    };

    // Employees always see their own requests; admins see everything unless
    // they filter by employee.
    let user_filter = if claims.is_admin() {
        query.user_id
    } else {
        Some(resolve_target_user(&claims, query.user_id)?)
    };

    let page = Page::from_params(query.page, query.size);
    let (requests, total) = repo
        .list_requests(user_filter, status_filter, query.from, query.to, page.page, page.size)
        .await?;

    Ok(HttpResponse::Ok()
        .insert_header(("X-Total-Count", total.to_string()))
        .json(Paginated::new(requests, total, page)))
}

pub async fn get_request(
    claims: Claims,
    repo: web::Data<LeaveRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let request = repo
        .get_request_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Leave request not found".to_string()))?;

    if request.user_id != claims.sub && !claims.is_admin() {
        return Err(AppError::Forbidden(
            "You can only access your own data".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

/// Submit a new leave request for the authenticated employee.
pub async fn create_request(
    claims: Claims,
    service: web::Data<LeaveService>,
    input: web::Json<LeaveRequestInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_employee() && !claims.is_admin() {
        return Err(AppError::Forbidden("Insufficient permissions".to_string()));
    }

    let request = service.create(&claims, input.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(request)))
}

/// Approve, reject, or cancel a pending request. The status value is
/// validated before anything is looked up.
pub async fn update_request(
    claims: Claims,
    service: web::Data<LeaveService>,
    path: web::Path<Uuid>,
    input: web::Json<TransitionInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::Forbidden("Insufficient permissions".to_string()));
    }

    let input = input.into_inner();
    let new_status = input
        .status
        .parse::<LeaveStatus>()
        .map_err(|_| AppError::validation(ErrorCode::InvalidStatus, "Invalid status"))?;

    let updated = service
        .transition(path.into_inner(), new_status, &claims, input.notes)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(updated)))
}

/// Credit days to an employee's balance, creating the row when absent.
pub async fn accrue_balance(
    claims: Claims,
    policies: web::Data<PolicyRepository>,
    balances: web::Data<BalanceRepository>,
    input: web::Json<AccrueInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::Forbidden("Insufficient permissions".to_string()));
    }

    let input = input.into_inner();
    if input.days <= BigDecimal::from(0) {
        return Err(AppError::validation(
            ErrorCode::ValidationError,
            "Accrual days must be positive",
        ));
    }

    if policies.get_by_id(input.policy_id).await?.is_none() {
        return Err(AppError::validation(ErrorCode::InvalidPolicy, "Invalid policy"));
    }

    let balance = balances
        .accrue(input.user_id, input.policy_id, &input.days)
        .await?;

    log::info!(
        "Balance accrued: user={} policy={} days={}",
        input.user_id,
        input.policy_id,
        input.days
    );
    Ok(HttpResponse::Ok().json(ApiResponse::success(balance)))
}
