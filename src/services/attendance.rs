use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::models::{AttendanceLog, ClockInInput, ClockSource, TodayState, TodayStatus};
use crate::database::repositories::AttendanceRepository;
use crate::error::{AppError, ErrorCode};
use crate::services::geo::GeoFence;

/// Per-employee, per-day clock state machine:
/// NOT_STARTED -> CLOCKED_IN -> CLOCKED_OUT, forward only.
#[derive(Clone)]
pub struct AttendanceService {
    repo: AttendanceRepository,
    geo: GeoFence,
}

impl AttendanceService {
    pub fn new(repo: AttendanceRepository, geo: GeoFence) -> Self {
        Self { repo, geo }
    }

    pub async fn clock_in(
        &self,
        user_id: Uuid,
        input: ClockInInput,
    ) -> Result<AttendanceLog, AppError> {
        if self.repo.get_open_log(user_id).await?.is_some() {
            return Err(AppError::conflict(
                ErrorCode::AlreadyClockedIn,
                "Already clocked in today",
            ));
        }

        if let (Some(lat), Some(lng)) = (input.lat, input.lng) {
            let check = self.geo.validate(lat, lng);
            if !check.valid {
                let message = match check.distance_meters {
                    Some(distance) => format!(
                        "Location is {:.0}m away from office (allowed: {:.0}m)",
                        distance,
                        self.geo.radius_meters()
                    ),
                    None => "Location is outside the allowed area".to_string(),
                };
                return Err(AppError::validation(ErrorCode::GeoOutOfRange, message));
            }
        }

        let source = input.source.unwrap_or(ClockSource::Mobile);
        match self
            .repo
            .insert_clock_in(user_id, input.lat, input.lng, source)
            .await
        {
            Ok(log) => {
                log::info!("User clocked in: user={} log={} source={}", user_id, log.id, source);
                Ok(log)
            }
            // A concurrent clock-in beat us to the open-row index.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(AppError::conflict(
                ErrorCode::AlreadyClockedIn,
                "Already clocked in today",
            )),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn clock_out(&self, user_id: Uuid) -> Result<AttendanceLog, AppError> {
        let Some(today) = self.repo.get_today_log(user_id).await? else {
            return Err(AppError::conflict(
                ErrorCode::ClockOutMissingIn,
                "No clock in found for today",
            ));
        };

        if today.clock_out.is_some() {
            return Err(AppError::conflict(
                ErrorCode::AlreadyClockedOut,
                "Already clocked out today",
            ));
        }

        let now = Utc::now();
        let duration = elapsed_minutes(today.clock_in, now);
        let updated = self.repo.set_clock_out(today.id, now, duration).await?;

        log::info!(
            "User clocked out: user={} log={} duration={}min",
            user_id,
            updated.id,
            duration
        );
        Ok(updated)
    }

    pub async fn today_status(&self, user_id: Uuid) -> Result<TodayStatus, AppError> {
        let status = match self.repo.get_today_log(user_id).await? {
            None => TodayStatus {
                status: TodayState::NotStarted,
                log: None,
            },
            Some(log) if log.clock_out.is_some() => TodayStatus {
                status: TodayState::ClockedOut,
                log: Some(log),
            },
            Some(log) => TodayStatus {
                status: TodayState::ClockedIn,
                log: Some(log),
            },
        };

        Ok(status)
    }
}

/// Whole elapsed minutes between clock-in and clock-out. Clock skew can make
/// the difference negative; that is clamped to zero and flagged.
pub(crate) fn elapsed_minutes(clock_in: DateTime<Utc>, clock_out: DateTime<Utc>) -> i32 {
    let minutes = (clock_out - clock_in).num_minutes();
    if minutes < 0 {
        log::warn!(
            "Clock skew produced a negative duration ({} min); clamping to zero",
            minutes
        );
        return 0;
    }
    minutes.min(i32::MAX as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 17, h, m, 0).unwrap()
    }

    #[test]
    fn duration_is_whole_minutes() {
        assert_eq!(elapsed_minutes(at(9, 0), at(17, 30)), 510);
        assert_eq!(elapsed_minutes(at(9, 0), at(9, 0)), 0);
    }

    #[test]
    fn sub_minute_remainders_are_dropped() {
        let clock_in = Utc.with_ymd_and_hms(2025, 11, 17, 9, 0, 0).unwrap();
        let clock_out = Utc.with_ymd_and_hms(2025, 11, 17, 9, 1, 59).unwrap();
        assert_eq!(elapsed_minutes(clock_in, clock_out), 1);
    }

    #[test]
    fn negative_durations_clamp_to_zero() {
        assert_eq!(elapsed_minutes(at(17, 0), at(9, 0)), 0);
    }
}
