use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthCheckResult {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl HealthCheckResult {
    pub fn healthy_with_details(details: serde_json::Value) -> Self {
        Self {
            status: HealthStatus::Healthy,
            message: None,
            details: Some(details),
            duration_ms: None,
        }
    }

    pub fn unhealthy_with_details(message: String, details: serde_json::Value) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            message: Some(message),
            details: Some(details),
            duration_ms: None,
        }
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// A component that can report on its own health
#[async_trait]
pub trait HealthChecker: Send + Sync {
    fn name(&self) -> &str;

    async fn check(&self) -> HealthCheckResult;
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub service: String,
    pub version: String,
    pub timestamp: String,
    /// Keyed by checker name; empty unless checks were requested
    pub checks: BTreeMap<String, HealthCheckResult>,
}

/// Registry of component health checks
#[derive(Default)]
pub struct HealthService {
    checkers: RwLock<HashMap<String, Arc<dyn HealthChecker>>>,
}

impl HealthService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, checker: Arc<dyn HealthChecker>) {
        let name = checker.name().to_string();
        self.checkers.write().await.insert(name, checker);
    }

    pub async fn registered(&self) -> Vec<String> {
        let mut names: Vec<String> = self.checkers.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Run the checks selected by `filter`.
    ///
    /// `None` runs nothing and reports liveness only, `"all"` runs every
    /// registered check, any other value runs the check with that name.
    pub async fn check_health(&self, filter: Option<&str>) -> HealthResponse {
        let checkers = self.checkers.read().await;
        let mut checks = BTreeMap::new();

        for (name, checker) in checkers.iter() {
            let selected = match filter {
                Some("all") => true,
                Some(wanted) => name.as_str() == wanted,
                None => false,
            };
            if !selected {
                continue;
            }

            let start = Instant::now();
            let result = checker.check().await;
            let duration = start.elapsed().as_millis() as u64;
            checks.insert(name.clone(), result.with_duration(duration));
        }

        let status = if checks
            .values()
            .any(|result| result.status == HealthStatus::Unhealthy)
        {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Healthy
        };

        HealthResponse {
            status,
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            checks,
        }
    }
}
