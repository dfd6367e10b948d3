use anyhow::Result;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub idempotency_ttl_hours: i64,
    pub geo_enabled: bool,
    pub geo_office_lat: f64,
    pub geo_office_lng: f64,
    pub geo_radius_meters: f64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();
        Self::from_env_only()
    }

    /// Read configuration from environment variables without touching .env
    /// files, so tests can control the environment directly.
    pub fn from_env_only() -> Result<Self> {
        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://@localhost:5432/leave_attendance".to_string()),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                "your-super-secret-jwt-key-change-this-in-production-12345".to_string()
            }),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            cors_origins: env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            idempotency_ttl_hours: env::var("IDEMPOTENCY_TTL_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .unwrap_or(24),
            geo_enabled: env::var("GEO_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            geo_office_lat: env::var("GEO_OFFICE_LAT")
                .unwrap_or_else(|_| "-33.8688".to_string())
                .parse()
                .unwrap_or(-33.8688),
            geo_office_lng: env::var("GEO_OFFICE_LNG")
                .unwrap_or_else(|_| "151.2093".to_string())
                .parse()
                .unwrap_or(151.2093),
            geo_radius_meters: env::var("GEO_RADIUS_METERS")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .unwrap_or(500.0),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
