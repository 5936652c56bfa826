use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::core::{ComponentHealth, HealthCheck, HealthStatus};

// ============================================================================
// Health Checker - Aggregates component health into one report
// ============================================================================
//
// Every registered check is probed on each report. The overall status is the
// worst component status: any Unhealthy component makes the system Unhealthy,
// otherwise any Degraded component makes it Degraded.
//
// ============================================================================

#[derive(Clone, Default)]
pub struct HealthChecker {
    checks: Vec<Arc<dyn HealthCheck>>,
}

#[derive(Debug, Clone)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub total_duration: Duration,
    pub checked_at: DateTime<Utc>,
    pub entries: Vec<ComponentHealth>,
}

impl HealthChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_check(mut self, check: Arc<dyn HealthCheck>) -> Self {
        self.checks.push(check);
        self
    }

    pub async fn report(&self) -> HealthReport {
        let started = Instant::now();
        let mut entries = Vec::with_capacity(self.checks.len());

        for check in &self.checks {
            let probe_started = Instant::now();
            let status = check.check_health().await;

            if !status.is_healthy() {
                tracing::warn!(
                    component = %check.component_name(),
                    status = %status.label(),
                    description = ?status.description(),
                    "Health check is not healthy"
                );
            }

            entries.push(
                ComponentHealth::new(check.component_name(), status)
                    .with_duration(probe_started.elapsed())
                    .with_tags(check.tags()),
            );
        }

        HealthReport {
            status: compute_overall_status(&entries),
            total_duration: started.elapsed(),
            checked_at: Utc::now(),
            entries,
        }
    }
}

fn compute_overall_status(entries: &[ComponentHealth]) -> HealthStatus {
    let mut has_degraded = false;
    let mut unhealthy_components = Vec::new();

    for health in entries {
        match &health.status {
            HealthStatus::Unhealthy(msg) => {
                unhealthy_components.push(format!("{}: {}", health.name, msg));
            }
            HealthStatus::Degraded(_) => {
                has_degraded = true;
            }
            HealthStatus::Healthy => {}
        }
    }

    if !unhealthy_components.is_empty() {
        HealthStatus::Unhealthy(unhealthy_components.join(", "))
    } else if has_degraded {
        HealthStatus::Degraded("Some components degraded".to_string())
    } else {
        HealthStatus::Healthy
    }
}

// ============================================================================
// JSON shape
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportBody<'a> {
    status: &'static str,
    total_duration_ms: f64,
    checked_at: DateTime<Utc>,
    entries: BTreeMap<&'a str, EntryBody<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EntryBody<'a> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    duration_ms: f64,
    tags: &'a [&'static str],
}

impl Serialize for HealthReport {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self
            .entries
            .iter()
            .map(|entry| {
                (
                    entry.name.as_str(),
                    EntryBody {
                        status: entry.status.label(),
                        description: entry.status.description(),
                        duration_ms: millis(entry.duration),
                        tags: &entry.tags,
                    },
                )
            })
            .collect();

        ReportBody {
            status: self.status.label(),
            total_duration_ms: millis(self.total_duration),
            checked_at: self.checked_at,
            entries,
        }
        .serialize(serializer)
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedCheck {
        name: &'static str,
        status: HealthStatus,
    }

    #[async_trait]
    impl HealthCheck for FixedCheck {
        fn component_name(&self) -> &str {
            self.name
        }

        fn tags(&self) -> &'static [&'static str] {
            &["Test"]
        }

        async fn check_health(&self) -> HealthStatus {
            self.status.clone()
        }
    }

    fn check(name: &'static str, status: HealthStatus) -> Arc<dyn HealthCheck> {
        Arc::new(FixedCheck { name, status })
    }

    #[tokio::test]
    async fn test_no_checks_is_healthy() {
        let report = HealthChecker::new().report().await;
        assert_eq!(report.status, HealthStatus::Healthy);
        assert!(report.entries.is_empty());
    }

    #[tokio::test]
    async fn test_degraded_component_degrades_system() {
        let report = HealthChecker::new()
            .with_check(check("database", HealthStatus::Healthy))
            .with_check(check("cache", HealthStatus::Degraded("slow".into())))
            .report()
            .await;

        assert!(report.status.is_degraded());
        assert_eq!(report.entries.len(), 2);
    }

    #[tokio::test]
    async fn test_unhealthy_component_wins() {
        let report = HealthChecker::new()
            .with_check(check("cache", HealthStatus::Degraded("slow".into())))
            .with_check(check("database", HealthStatus::Unhealthy("down".into())))
            .report()
            .await;

        assert_eq!(
            report.status,
            HealthStatus::Unhealthy("database: down".to_string())
        );
    }

    #[tokio::test]
    async fn test_report_json_shape() {
        let report = HealthChecker::new()
            .with_check(check("database", HealthStatus::Unhealthy("down".into())))
            .report()
            .await;

        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["status"], "Unhealthy");
        assert!(json["totalDurationMs"].is_number());
        assert!(json["checkedAt"].is_string());
        assert_eq!(json["entries"]["database"]["status"], "Unhealthy");
        assert_eq!(json["entries"]["database"]["description"], "down");
        assert_eq!(json["entries"]["database"]["tags"][0], "Test");
    }
}
