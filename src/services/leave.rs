use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{LeaveRequest, LeaveRequestInput, LeaveStatus};
use crate::database::repositories::{BalanceRepository, LeaveRepository};
use crate::error::{AppError, ErrorCode};
use crate::services::auth::Claims;
use crate::services::notifier::{LeaveNotification, NotificationKind, Notifier};
use crate::services::policy_validator::{leave_days, PolicyValidator};

/// The request state machine: create -> PENDING -> APPROVED / REJECTED /
/// CANCELLED. Orchestrates the validator and the balance ledger and writes
/// an audit entry for every step.
#[derive(Clone)]
pub struct LeaveService {
    pool: PgPool,
    leaves: LeaveRepository,
    balances: BalanceRepository,
    validator: PolicyValidator,
    notifier: Notifier,
}

impl LeaveService {
    pub fn new(
        pool: PgPool,
        leaves: LeaveRepository,
        balances: BalanceRepository,
        validator: PolicyValidator,
        notifier: Notifier,
    ) -> Self {
        Self {
            pool,
            leaves,
            balances,
            validator,
            notifier,
        }
    }

    /// Validate and persist a new PENDING request. Nothing is written when
    /// validation fails.
    pub async fn create(
        &self,
        actor: &Claims,
        input: LeaveRequestInput,
    ) -> Result<LeaveRequest, AppError> {
        let validation = self
            .validator
            .validate(
                actor.sub,
                input.policy_id,
                input.start_date,
                input.end_date,
                input.half_day,
                None,
            )
            .await?;

        if !validation.valid {
            let code = validation.error_code.unwrap_or(ErrorCode::InternalError);
            return Err(AppError::validation(code, validation.errors.join(", ")));
        }

        let mut tx = self.pool.begin().await?;
        let request = self.leaves.create_request(&mut tx, actor.sub, &input).await?;
        self.leaves
            .create_audit(&mut tx, request.id, "CREATED", actor.sub, None)
            .await?;
        tx.commit().await?;

        log::info!("Leave request created: id={} user={}", request.id, actor.sub);

        self.notifier.dispatch(LeaveNotification {
            recipient: actor.email.clone(),
            subject: "Leave Request Submitted".to_string(),
            body: "Your leave request has been submitted and is pending approval.".to_string(),
            kind: NotificationKind::Requested,
        });

        Ok(request)
    }

    /// Move a pending request to a terminal status. For approvals, the
    /// status update, the audit entry, and the balance deduction commit as
    /// one transaction; a failed deduction leaves the request untouched.
    pub async fn transition(
        &self,
        request_id: Uuid,
        new_status: LeaveStatus,
        actor: &Claims,
        notes: Option<String>,
    ) -> Result<LeaveRequest, AppError> {
        if !new_status.is_terminal() {
            return Err(AppError::validation(ErrorCode::InvalidStatus, "Invalid status"));
        }

        let existing = self
            .leaves
            .get_request_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Leave request not found".to_string()))?;

        if existing.status != LeaveStatus::Pending {
            return Err(AppError::validation(
                ErrorCode::InvalidStatus,
                format!("Request is already {}", existing.status),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let Some(updated) = self
            .leaves
            .update_request_status(&mut tx, request_id, new_status, actor.sub)
            .await?
        else {
            // Another actor finalized the request between our read and the
            // guarded update.
            tx.rollback().await?;
            return Err(AppError::validation(
                ErrorCode::InvalidStatus,
                "Request is no longer pending",
            ));
        };

        self.leaves
            .create_audit(
                &mut tx,
                request_id,
                &new_status.to_string(),
                actor.sub,
                notes.as_deref(),
            )
            .await?;

        if new_status == LeaveStatus::Approved {
            let days = leave_days(existing.start_date, existing.end_date, existing.half_day);

            match self
                .balances
                .deduct(&mut tx, existing.user_id, existing.policy_id, &days)
                .await?
            {
                Some(new_balance) => {
                    log::info!(
                        "Balance deducted: user={} policy={} days={} remaining={}",
                        existing.user_id,
                        existing.policy_id,
                        days,
                        new_balance
                    );
                }
                None => {
                    tx.rollback().await?;
                    let code = if self
                        .balances
                        .get_balance(existing.user_id, existing.policy_id)
                        .await?
                        .is_some()
                    {
                        ErrorCode::InsufficientBalance
                    } else {
                        ErrorCode::BalanceNotFound
                    };
                    return Err(AppError::validation(
                        code,
                        format!("Unable to deduct {} days from leave balance", days),
                    ));
                }
            }
        }

        tx.commit().await?;

        log::info!(
            "Leave request updated: id={} status={} actor={}",
            request_id,
            new_status,
            actor.sub
        );

        let kind = match new_status {
            LeaveStatus::Approved => NotificationKind::Approved,
            LeaveStatus::Cancelled => NotificationKind::Cancelled,
            _ => NotificationKind::Rejected,
        };
        self.notifier.dispatch(LeaveNotification {
            recipient: None,
            subject: format!("Leave Request {}", new_status),
            body: notes.unwrap_or_else(|| {
                format!(
                    "Your leave request has been {}.",
                    new_status.to_string().to_lowercase()
                )
            }),
            kind,
        });

        Ok(updated)
    }
}
