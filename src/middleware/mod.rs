pub mod idempotency;
pub mod request_id;

pub use idempotency::{IdempotencyGuard, IdempotencyGuardService};
pub use request_id::{CorrelationId, RequestId, RequestIdExt, RequestIdService};
