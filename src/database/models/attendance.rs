use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub work_date: NaiveDate,
    pub clock_in: DateTime<Utc>,
    pub clock_out: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub source: ClockSource,
    pub created_at: DateTime<Utc>,
}

/// Body of POST /attendance/clock-in. Coordinates are optional; geo
/// validation only runs when both are present.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockInInput {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub source: Option<ClockSource>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum ClockSource {
        Mobile => "MOBILE",
        Web => "WEB",
        Admin => "ADMIN",
    }
}

/// Per-day attendance state machine position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TodayState {
    NotStarted,
    ClockedIn,
    ClockedOut,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayStatus {
    pub status: TodayState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<AttendanceLog>,
}
