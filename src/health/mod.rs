// Private module declarations
mod core;
mod checker;

pub use self::core::{HealthCheck, HealthStatus};
pub use checker::HealthChecker;
