pub mod attendance;
pub mod auth;
pub mod geo;
pub mod leave;
pub mod notifier;
pub mod policy_validator;

pub use attendance::AttendanceService;
pub use auth::Claims;
pub use geo::{GeoCheck, GeoFence};
pub use leave::LeaveService;
pub use notifier::{LeaveNotification, NotificationKind, Notifier};
pub use policy_validator::PolicyValidator;
