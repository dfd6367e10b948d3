pub mod attendance;
pub mod idempotency;
pub mod leave;
pub(crate) mod macros;
pub mod policy;

pub use attendance::{AttendanceLog, ClockInInput, ClockSource, TodayState, TodayStatus};
pub use idempotency::IdempotencyRecord;
pub use leave::{
    BalanceWithPolicy, HalfDay, LeaveAudit, LeaveBalance, LeaveRequest, LeaveRequestInput,
    LeaveStatus, TransitionInput, ValidationResult,
};
pub use policy::{AccrualCadence, LeavePolicy, PolicyCategory};
