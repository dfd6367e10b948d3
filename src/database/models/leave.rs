use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;
use super::policy::PolicyCategory;
use crate::error::ErrorCode;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub policy_id: Uuid,
    pub status: LeaveStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub half_day: Option<HalfDay>,
    pub reason: Option<String>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of POST /leave/requests. The employee identity comes from the
/// verified token, never from the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequestInput {
    pub policy_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub half_day: Option<HalfDay>,
    pub reason: Option<String>,
}

/// Body of PATCH /leave/requests/{id}. The status arrives as a raw string so
/// an unknown value maps to INVALID_STATUS instead of a deserializer error.
#[derive(Debug, Deserialize)]
pub struct TransitionInput {
    pub status: String,
    pub notes: Option<String>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum LeaveStatus {
        Pending => "PENDING",
        Approved => "APPROVED",
        Rejected => "REJECTED",
        Cancelled => "CANCELLED",
    }
}

impl LeaveStatus {
    /// PENDING is the only non-terminal state; transitions may only target
    /// the terminal ones.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum HalfDay {
        Am => "AM",
        Pm => "PM",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveBalance {
    pub id: Uuid,
    pub user_id: Uuid,
    pub policy_id: Uuid,
    pub balance_days: BigDecimal,
    pub updated_at: DateTime<Utc>,
}

/// Balance row joined with its policy metadata, for the balance listing.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BalanceWithPolicy {
    pub id: Uuid,
    pub user_id: Uuid,
    pub policy_id: Uuid,
    pub balance_days: BigDecimal,
    pub updated_at: DateTime<Utc>,
    pub category: PolicyCategory,
    pub max_days: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveAudit {
    pub id: Uuid,
    pub request_id: Uuid,
    pub action: String,
    pub actor_id: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Outcome of running a request through the policy checks. `error_code`
/// matches the first failed check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            error_code: None,
        }
    }

    pub fn fail(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            errors: vec![message.into()],
            error_code: Some(code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("APPROVED".parse::<LeaveStatus>(), Ok(LeaveStatus::Approved));
        assert_eq!("cancelled".parse::<LeaveStatus>(), Ok(LeaveStatus::Cancelled));
        assert!("FINALIZED".parse::<LeaveStatus>().is_err());
    }

    #[test]
    fn pending_is_the_only_non_terminal_state() {
        assert!(!LeaveStatus::Pending.is_terminal());
        assert!(LeaveStatus::Approved.is_terminal());
        assert!(LeaveStatus::Rejected.is_terminal());
        assert!(LeaveStatus::Cancelled.is_terminal());
    }

    #[test]
    fn request_input_accepts_half_day_marker() {
        let input: LeaveRequestInput = serde_json::from_value(serde_json::json!({
            "policyId": "7f0b2a54-2f3e-4a4a-9c35-02e9a1a4f1be",
            "startDate": "2025-11-15",
            "endDate": "2025-11-15",
            "halfDay": "AM",
        }))
        .unwrap();

        assert_eq!(input.half_day, Some(HalfDay::Am));
        assert_eq!(input.start_date, input.end_date);
        assert_eq!(input.reason, None);
    }
}
