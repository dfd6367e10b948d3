use actix_web::{http::StatusCode, test, web, App};
use pretty_assertions::assert_eq;
use serde_json::json;
use serial_test::serial;
use uuid::Uuid;

use leave_be::database::repositories::{
    BalanceRepository, LeaveRepository, PolicyRepository,
};
use leave_be::handlers::leave;
use leave_be::services::{LeaveService, Notifier, PolicyValidator};

mod common;

fn leave_service(pool: sqlx::PgPool) -> LeaveService {
    let validator = PolicyValidator::new(
        PolicyRepository::new(pool.clone()),
        LeaveRepository::new(pool.clone()),
        BalanceRepository::new(pool.clone()),
    );
    LeaveService::new(
        pool.clone(),
        LeaveRepository::new(pool.clone()),
        BalanceRepository::new(pool),
        validator,
        Notifier::spawn(),
    )
}

macro_rules! leave_app {
    ($config:expr) => {{
        let pool = common::lazy_pool();
        test::init_service(
            App::new()
                .app_data(web::Data::new($config.clone()))
                .app_data(web::Data::new(PolicyRepository::new(pool.clone())))
                .app_data(web::Data::new(LeaveRepository::new(pool.clone())))
                .app_data(web::Data::new(BalanceRepository::new(pool.clone())))
                .app_data(web::Data::new(leave_service(pool)))
                .service(
                    web::scope("/api/v1").service(
                        web::scope("/leave")
                            .route("/balance", web::get().to(leave::get_balance))
                            .route("/balance/accrue", web::post().to(leave::accrue_balance))
                            .route("/requests", web::get().to(leave::list_requests))
                            .route("/requests", web::post().to(leave::create_request))
                            .route("/requests/{id}", web::get().to(leave::get_request))
                            .route("/requests/{id}", web::patch().to(leave::update_request)),
                    ),
                ),
        )
        .await
    }};
}

#[actix_web::test]
#[serial]
async fn create_request_without_token_is_unauthorized() {
    common::setup_test_env();
    let config = common::test_config();
    let app = leave_app!(config);

    let req = test::TestRequest::post()
        .uri("/api/v1/leave/requests")
        .set_json(json!({
            "policyId": Uuid::new_v4(),
            "startDate": "2025-12-01",
            "endDate": "2025-12-05",
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
#[serial]
async fn list_requests_without_token_is_unauthorized() {
    common::setup_test_env();
    let config = common::test_config();
    let app = leave_app!(config);

    let req = test::TestRequest::get()
        .uri("/api/v1/leave/requests")
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
#[serial]
async fn unknown_status_is_rejected_before_any_lookup() {
    common::setup_test_env();
    let config = common::test_config();
    let app = leave_app!(config);
    let token = common::bearer_token(&config, Uuid::new_v4(), &["ADMIN"]);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/leave/requests/{}", Uuid::new_v4()))
        .insert_header(common::auth_header(&token))
        .set_json(json!({ "status": "FINALIZED" }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "INVALID_STATUS");
    assert_eq!(body["message"], "Invalid status");
    assert!(
        chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok(),
        "timestamp should be ISO-8601, got {}",
        body["timestamp"]
    );
}

#[actix_web::test]
#[serial]
async fn transition_back_to_pending_is_rejected() {
    common::setup_test_env();
    let config = common::test_config();
    let app = leave_app!(config);
    let token = common::bearer_token(&config, Uuid::new_v4(), &["ADMIN"]);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/leave/requests/{}", Uuid::new_v4()))
        .insert_header(common::auth_header(&token))
        .set_json(json!({ "status": "PENDING" }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "INVALID_STATUS");
}

#[actix_web::test]
#[serial]
async fn transitions_are_admin_only() {
    common::setup_test_env();
    let config = common::test_config();
    let app = leave_app!(config);
    let token = common::bearer_token(&config, Uuid::new_v4(), &["EMPLOYEE"]);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/leave/requests/{}", Uuid::new_v4()))
        .insert_header(common::auth_header(&token))
        .set_json(json!({ "status": "APPROVED" }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "FORBIDDEN");
}

#[actix_web::test]
#[serial]
async fn employee_cannot_read_another_users_balance() {
    common::setup_test_env();
    let config = common::test_config();
    let app = leave_app!(config);
    let token = common::bearer_token(&config, Uuid::new_v4(), &["EMPLOYEE"]);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/leave/balance?user_id={}", Uuid::new_v4()))
        .insert_header(common::auth_header(&token))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
#[serial]
async fn bogus_status_filter_is_a_validation_error() {
    common::setup_test_env();
    let config = common::test_config();
    let app = leave_app!(config);
    let token = common::bearer_token(&config, Uuid::new_v4(), &["EMPLOYEE"]);

    let req = test::TestRequest::get()
        .uri("/api/v1/leave/requests?status=BOGUS")
        .insert_header(common::auth_header(&token))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "INVALID_STATUS");
}

#[actix_web::test]
#[serial]
async fn balance_accrual_is_admin_only() {
    common::setup_test_env();
    let config = common::test_config();
    let app = leave_app!(config);
    let token = common::bearer_token(&config, Uuid::new_v4(), &["EMPLOYEE"]);

    let req = test::TestRequest::post()
        .uri("/api/v1/leave/balance/accrue")
        .insert_header(common::auth_header(&token))
        .set_json(json!({
            "userId": Uuid::new_v4(),
            "policyId": Uuid::new_v4(),
            "days": "1.5",
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
#[serial]
async fn negative_accrual_is_rejected() {
    common::setup_test_env();
    let config = common::test_config();
    let app = leave_app!(config);
    let token = common::bearer_token(&config, Uuid::new_v4(), &["ADMIN"]);

    let req = test::TestRequest::post()
        .uri("/api/v1/leave/balance/accrue")
        .insert_header(common::auth_header(&token))
        .set_json(json!({
            "userId": Uuid::new_v4(),
            "policyId": Uuid::new_v4(),
            "days": "-2",
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}
