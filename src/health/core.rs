use async_trait::async_trait;
use std::time::Duration;

// ============================================================================
// Health Check Abstractions
// ============================================================================
//
// Any component that can report its own health (the order store today)
// implements `HealthCheck`; the checker aggregates the results.
//
// ============================================================================

/// Health status of a component
#[derive(Debug, Clone, PartialEq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, HealthStatus::Degraded(_))
    }

    pub fn is_unhealthy(&self) -> bool {
        matches!(self, HealthStatus::Unhealthy(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::Degraded(_) => "Degraded",
            HealthStatus::Unhealthy(_) => "Unhealthy",
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            HealthStatus::Healthy => None,
            HealthStatus::Degraded(msg) | HealthStatus::Unhealthy(msg) => Some(msg),
        }
    }
}

/// Health information for a component
#[derive(Debug, Clone)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    pub duration: Duration,
    pub tags: Vec<&'static str>,
}

impl ComponentHealth {
    pub fn new(name: impl Into<String>, status: HealthStatus) -> Self {
        Self {
            name: name.into(),
            status,
            duration: Duration::ZERO,
            tags: Vec::new(),
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_tags(mut self, tags: &[&'static str]) -> Self {
        self.tags = tags.to_vec();
        self
    }
}

/// Trait for components that can report their health status
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Get the component name
    fn component_name(&self) -> &str;

    /// Tags reported alongside the component entry
    fn tags(&self) -> &'static [&'static str] {
        &[]
    }

    /// Probe the component
    async fn check_health(&self) -> HealthStatus;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_predicates() {
        assert!(HealthStatus::Healthy.is_healthy());
        assert!(HealthStatus::Degraded("slow".into()).is_degraded());
        assert!(HealthStatus::Unhealthy("down".into()).is_unhealthy());
        assert!(!HealthStatus::Healthy.is_unhealthy());
    }

    #[test]
    fn test_status_label_and_description() {
        assert_eq!(HealthStatus::Healthy.label(), "Healthy");
        assert_eq!(HealthStatus::Healthy.description(), None);

        let down = HealthStatus::Unhealthy("Unable to connect the database.".into());
        assert_eq!(down.label(), "Unhealthy");
        assert_eq!(down.description(), Some("Unable to connect the database."));
    }

    #[test]
    fn test_component_health_builder() {
        let health = ComponentHealth::new("database", HealthStatus::Healthy)
            .with_duration(Duration::from_millis(3))
            .with_tags(&["Database"]);

        assert_eq!(health.name, "database");
        assert_eq!(health.duration, Duration::from_millis(3));
        assert_eq!(health.tags, vec!["Database"]);
    }
}
