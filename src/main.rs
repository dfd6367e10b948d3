use std::time::Duration;

use actix_cors::Cors;
use actix_web::{get, middleware::Logger, web, App, HttpResponse, HttpServer, Responder};
use anyhow::Result;

use leave_be::database::{
    init_database,
    repositories::{
        AttendanceRepository, BalanceRepository, IdempotencyRepository, LeaveRepository,
        PolicyRepository,
    },
};
use leave_be::handlers::{attendance, leave, policies, reports};
use leave_be::middleware::{IdempotencyGuard, RequestId};
use leave_be::services::{
    AttendanceService, GeoFence, LeaveService, Notifier, PolicyValidator,
};
use leave_be::Config;

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init();

    // Load configuration
    let config = Config::from_env()?;
    log::info!("Configuration loaded (environment: {})", config.environment);

    // Initialize database
    let pool = init_database(&config.database_url).await?;
    log::info!("Database initialized");

    // Repositories own cloned pool handles; nothing reads a global.
    let policy_repository = PolicyRepository::new(pool.clone());
    let leave_repository = LeaveRepository::new(pool.clone());
    let balance_repository = BalanceRepository::new(pool.clone());
    let attendance_repository = AttendanceRepository::new(pool.clone());
    let idempotency_repository = IdempotencyRepository::new(pool.clone());

    let notifier = Notifier::spawn();
    let geo_fence = GeoFence::from_config(&config);
    let validator = PolicyValidator::new(
        policy_repository.clone(),
        leave_repository.clone(),
        balance_repository.clone(),
    );
    let leave_service = LeaveService::new(
        pool.clone(),
        leave_repository.clone(),
        balance_repository.clone(),
        validator,
        notifier.clone(),
    );
    let attendance_service =
        AttendanceService::new(attendance_repository.clone(), geo_fence);

    // Periodic sweep of expired idempotency records.
    {
        let sweep_repo = idempotency_repository.clone();
        let ttl_hours = config.idempotency_ttl_hours;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60 * 60));
            loop {
                interval.tick().await;
                match sweep_repo.cleanup(ttl_hours).await {
                    Ok(0) => {}
                    Ok(deleted) => log::info!("Cleaned up {} old idempotency keys", deleted),
                    Err(err) => log::error!("Failed to cleanup idempotency keys: {}", err),
                }
            }
        });
    }

    let policy_repo_data = web::Data::new(policy_repository);
    let leave_repo_data = web::Data::new(leave_repository);
    let balance_repo_data = web::Data::new(balance_repository);
    let attendance_repo_data = web::Data::new(attendance_repository);
    let leave_service_data = web::Data::new(leave_service);
    let attendance_service_data = web::Data::new(attendance_service);
    let config_data = web::Data::new(config.clone());

    let cors_origins = config.cors_origins.clone();
    let idempotency_ttl_hours = config.idempotency_ttl_hours;
    let server_address = config.server_address();
    log::info!("Server starting on http://{}", server_address);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                "Authorization",
                "Content-Type",
                "Accept",
                "Idempotency-Key",
                "X-Correlation-ID",
            ])
            .max_age(3600);
        for origin in &cors_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .app_data(policy_repo_data.clone())
            .app_data(leave_repo_data.clone())
            .app_data(balance_repo_data.clone())
            .app_data(attendance_repo_data.clone())
            .app_data(leave_service_data.clone())
            .app_data(attendance_service_data.clone())
            .app_data(config_data.clone())
            .wrap(cors)
            .wrap(RequestId)
            .wrap(Logger::new(
                r#"%a "%r" %s %b "%{User-Agent}i" %T correlation_id=%{x-correlation-id}o"#,
            ))
            .service(health)
            .service(
                web::scope("/api/v1")
                    .wrap(IdempotencyGuard::new(
                        IdempotencyRepository::new(pool.clone()),
                        idempotency_ttl_hours,
                    ))
                    .service(
                        web::scope("/leave")
                            .route("/balance", web::get().to(leave::get_balance))
                            .route("/balance/accrue", web::post().to(leave::accrue_balance))
                            .route("/requests", web::get().to(leave::list_requests))
                            .route("/requests", web::post().to(leave::create_request))
                            .route("/requests/{id}", web::get().to(leave::get_request))
                            .route("/requests/{id}", web::patch().to(leave::update_request))
                            .route("/policies", web::get().to(policies::list_policies)),
                    )
                    .service(
                        web::scope("/attendance")
                            .route("", web::get().to(attendance::list_logs))
                            .route("/today", web::get().to(attendance::today_status))
                            .route("/clock-in", web::post().to(attendance::clock_in))
                            .route("/clock-out", web::post().to(attendance::clock_out)),
                    )
                    .service(
                        web::scope("/reports")
                            .route("/leave-summary", web::get().to(reports::leave_summary)),
                    ),
            )
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
