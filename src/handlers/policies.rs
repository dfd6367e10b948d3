use actix_web::{web, HttpResponse};

use crate::database::repositories::PolicyRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

/// Read-only policy catalog. Policy administration happens out of band.
pub async fn list_policies(
    _claims: Claims,
    repo: web::Data<PolicyRepository>,
) -> Result<HttpResponse, AppError> {
    let policies = repo.get_all().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(policies)))
}
