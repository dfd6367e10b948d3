use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate, Utc, Weekday};
use uuid::Uuid;

use crate::database::models::{HalfDay, ValidationResult};
use crate::database::repositories::{BalanceRepository, LeaveRepository, PolicyRepository};
use crate::error::{AppError, ErrorCode};

/// Runs a proposed leave request through the policy rules in order,
/// stopping at the first failure. The same instance is used when creating a
/// request and when revalidating an existing one.
#[derive(Clone)]
pub struct PolicyValidator {
    policies: PolicyRepository,
    leaves: LeaveRepository,
    balances: BalanceRepository,
}

impl PolicyValidator {
    pub fn new(
        policies: PolicyRepository,
        leaves: LeaveRepository,
        balances: BalanceRepository,
    ) -> Self {
        Self {
            policies,
            leaves,
            balances,
        }
    }

    pub async fn validate(
        &self,
        user_id: Uuid,
        policy_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        half_day: Option<HalfDay>,
        exclude_request_id: Option<Uuid>,
    ) -> Result<ValidationResult, AppError> {
        let Some(policy) = self.policies.get_by_id(policy_id).await? else {
            return Ok(ValidationResult::fail(
                ErrorCode::InvalidPolicy,
                "Invalid policy",
            ));
        };

        if end_date < start_date {
            return Ok(ValidationResult::fail(
                ErrorCode::InvalidDateRange,
                "End date must be after start date",
            ));
        }

        let today = Utc::now().date_naive();
        let notice_days = business_days_between(today, start_date);
        if notice_days < policy.min_notice_days as i64 {
            return Ok(ValidationResult::fail(
                ErrorCode::InsufficientNotice,
                format!(
                    "Minimum notice period is {} business days",
                    policy.min_notice_days
                ),
            ));
        }

        let has_overlap = self
            .leaves
            .has_overlapping_request(user_id, start_date, end_date, exclude_request_id)
            .await?;
        if has_overlap {
            return Ok(ValidationResult::fail(
                ErrorCode::LeaveOverlap,
                "Leave request overlaps with an existing approved or pending request",
            ));
        }

        let Some(balance) = self.balances.get_balance(user_id, policy_id).await? else {
            return Ok(ValidationResult::fail(
                ErrorCode::BalanceNotFound,
                "Leave balance not found",
            ));
        };

        let requested_days = leave_days(start_date, end_date, half_day);
        if requested_days > balance.balance_days {
            return Ok(ValidationResult::fail(
                ErrorCode::InsufficientBalance,
                format!(
                    "Insufficient leave balance. Available: {}, Requested: {}",
                    balance.balance_days, requested_days
                ),
            ));
        }

        Ok(ValidationResult::ok())
    }
}

/// The day-counting rule, shared verbatim between validation and deduction.
/// Same-day spans are 1 day (0.5 with a half-day marker); longer spans count
/// business days inclusively, minus 0.5 for a half-day marker. Weekend-only
/// spans bottom out at zero.
pub fn leave_days(start_date: NaiveDate, end_date: NaiveDate, half_day: Option<HalfDay>) -> BigDecimal {
    let half_units = if start_date == end_date {
        if half_day.is_some() { 1 } else { 2 }
    } else {
        let business = business_days_inclusive(start_date, end_date);
        let units = business * 2 - if half_day.is_some() { 1 } else { 0 };
        units.max(0)
    };

    BigDecimal::from(half_units) / BigDecimal::from(2)
}

/// Mon-Fri days in the closed interval [start, end].
pub fn business_days_inclusive(start: NaiveDate, end: NaiveDate) -> i64 {
    if end < start {
        return 0;
    }
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| is_business_day(*d))
        .count() as i64
}

/// Mon-Fri days in the half-open interval (from, to]; the notice window an
/// employee has before their leave starts.
pub fn business_days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    if to <= from {
        return 0;
    }
    from.iter_days()
        .skip(1)
        .take_while(|d| *d <= to)
        .filter(|d| is_business_day(*d))
        .count() as i64
}

fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::from_str(s).unwrap()
    }

    fn days(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn same_day_with_half_marker_counts_half() {
        // 2025-11-15 is a Saturday; the marker rule applies regardless.
        assert_eq!(
            leave_days(date("2025-11-15"), date("2025-11-15"), Some(HalfDay::Am)),
            days("0.5")
        );
    }

    #[test]
    fn same_day_without_marker_counts_one() {
        assert_eq!(
            leave_days(date("2025-11-15"), date("2025-11-15"), None),
            days("1")
        );
    }

    #[test]
    fn weekend_span_counts_only_business_days() {
        // Sat 2025-11-15 through Mon 2025-11-17: only the Monday counts.
        assert_eq!(
            leave_days(date("2025-11-15"), date("2025-11-17"), None),
            days("1")
        );
    }

    #[test]
    fn full_business_week_counts_five() {
        // Mon 2025-11-17 through Fri 2025-11-21.
        assert_eq!(
            leave_days(date("2025-11-17"), date("2025-11-21"), None),
            days("5")
        );
    }

    #[test]
    fn half_marker_shaves_half_off_a_multi_day_span() {
        assert_eq!(
            leave_days(date("2025-11-17"), date("2025-11-21"), Some(HalfDay::Pm)),
            days("4.5")
        );
    }

    #[test]
    fn span_across_a_weekend_skips_it() {
        // Fri 2025-11-21 through Mon 2025-11-24: Friday and Monday.
        assert_eq!(
            leave_days(date("2025-11-21"), date("2025-11-24"), None),
            days("2")
        );
    }

    #[test]
    fn weekend_only_span_is_zero_and_never_negative() {
        assert_eq!(
            leave_days(date("2025-11-15"), date("2025-11-16"), None),
            days("0")
        );
        assert_eq!(
            leave_days(date("2025-11-15"), date("2025-11-16"), Some(HalfDay::Am)),
            days("0")
        );
    }

    #[test]
    fn business_days_inclusive_handles_edges() {
        assert_eq!(business_days_inclusive(date("2025-11-17"), date("2025-11-17")), 1);
        assert_eq!(business_days_inclusive(date("2025-11-15"), date("2025-11-16")), 0);
        assert_eq!(business_days_inclusive(date("2025-11-21"), date("2025-11-17")), 0);
        // Two full weeks.
        assert_eq!(business_days_inclusive(date("2025-11-17"), date("2025-11-28")), 10);
    }

    #[test]
    fn notice_window_excludes_the_current_day() {
        // Friday to the following Monday leaves one business day of notice.
        assert_eq!(business_days_between(date("2025-11-14"), date("2025-11-17")), 1);
        // Same day means no notice at all.
        assert_eq!(business_days_between(date("2025-11-17"), date("2025-11-17")), 0);
        // Friday to Saturday crosses no business day.
        assert_eq!(business_days_between(date("2025-11-14"), date("2025-11-15")), 0);
        // Monday to Friday of the same week.
        assert_eq!(business_days_between(date("2025-11-17"), date("2025-11-21")), 4);
    }
}
