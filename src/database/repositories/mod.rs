pub mod attendance;
pub mod balance;
pub mod idempotency;
pub mod leave;
pub mod policy;

// Re-export all repositories for easy importing
pub use attendance::AttendanceRepository;
pub use balance::BalanceRepository;
pub use idempotency::IdempotencyRepository;
pub use leave::{LeaveRepository, LeaveSpan};
pub use policy::PolicyRepository;
