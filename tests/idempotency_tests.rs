use actix_web::{http::StatusCode, test, web, App, HttpResponse};
use pretty_assertions::assert_eq;
use serial_test::serial;

use leave_be::database::repositories::IdempotencyRepository;
use leave_be::middleware::IdempotencyGuard;

mod common;

async fn echo_ok() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "handled": true }))
}

macro_rules! guarded_app {
    () => {{
        let pool = common::lazy_pool();
        test::init_service(
            App::new().service(
                web::scope("/api/v1")
                    .wrap(IdempotencyGuard::new(IdempotencyRepository::new(pool), 24))
                    .route("/echo", web::get().to(echo_ok))
                    .route("/echo", web::post().to(echo_ok)),
            ),
        )
        .await
    }};
}

#[actix_web::test]
#[serial]
async fn reads_bypass_the_guard_even_with_a_key() {
    common::setup_test_env();
    let app = guarded_app!();

    // A GET with a key must pass straight through: read-only requests are
    // never wrapped, so the unreachable database is never consulted.
    let req = test::TestRequest::get()
        .uri("/api/v1/echo")
        .insert_header(("Idempotency-Key", "read-key-1"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["handled"], true);
}

#[actix_web::test]
#[serial]
async fn mutations_without_a_key_bypass_the_guard() {
    common::setup_test_env();
    let app = guarded_app!();

    let req = test::TestRequest::post().uri("/api/v1/echo").to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["handled"], true);
}

#[actix_web::test]
#[serial]
async fn blank_keys_are_treated_as_absent() {
    common::setup_test_env();
    let app = guarded_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/echo")
        .insert_header(("Idempotency-Key", "   "))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
#[serial]
async fn store_failure_never_fails_the_request() {
    common::setup_test_env();
    let app = guarded_app!();

    // The keyed mutation runs against an unreachable idempotency store:
    // the lookup degrades to a miss and the post-handler store failure is
    // swallowed, so the caller still sees the handler's response.
    let req = test::TestRequest::post()
        .uri("/api/v1/echo")
        .insert_header(("Idempotency-Key", "req-degraded-1"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["handled"], true);
}
