use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use leave_be::config::Config;
use leave_be::services::auth::Claims;

pub fn setup_test_env() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost:5432/leave_attendance_test".to_string(),
        jwt_secret: "test-jwt-secret-key-that-is-long-enough".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        cors_origins: vec![],
        idempotency_ttl_hours: 24,
        geo_enabled: false,
        geo_office_lat: -33.8688,
        geo_office_lng: 151.2093,
        geo_radius_meters: 500.0,
    }
}

/// Pool that never actually connects. The tests in this suite only exercise
/// paths that are decided before any query runs.
pub fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .connect_lazy("postgres://localhost:5432/leave_attendance_test")
        .expect("lazy pool")
}

pub fn bearer_token(config: &Config, sub: Uuid, roles: &[&str]) -> String {
    let claims = Claims {
        sub,
        email: Some("worker@example.com".to_string()),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        exp: 4_102_444_800, // 2100-01-01
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_ref()),
    )
    .expect("failed to sign test token")
}

pub fn auth_header(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
