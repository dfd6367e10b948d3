pub mod attendance;
pub mod leave;
pub mod policies;
pub mod reports;
pub mod shared;
