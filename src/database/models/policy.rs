use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

/// Immutable reference data describing one leave category. Rows are created
/// by administrators out of band; this service only reads them.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeavePolicy {
    pub id: Uuid,
    pub category: PolicyCategory,
    pub max_days: i32,
    pub carry_forward: bool,
    pub accrual: AccrualCadence,
    pub min_notice_days: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum PolicyCategory {
        Annual => "ANNUAL",
        Casual => "CASUAL",
        Sick => "SICK",
        Unpaid => "UNPAID",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum AccrualCadence {
        Monthly => "MONTHLY",
        Yearly => "YEARLY",
    }
}
