//! Health check DTOs for API responses.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::repositories::StorageBackend;

/// Health check response structure.
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "status": "healthy",
    "version": "0.1.0",
    "timestamp": "2025-01-01T12:00:00Z",
    "storage": "memory",
    "checks": {
        "storage": {
            "status": "healthy",
            "message": "In-memory list",
            "response_time_ms": 0
        }
    }
}))]
pub struct HealthResponse {
    /// Overall health status
    #[schema(example = "healthy")]
    pub status: HealthStatus,
    /// Application version
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Timestamp of the health check (RFC 3339)
    #[schema(value_type = String, format = DateTime, example = "2025-01-01T12:00:00Z")]
    pub timestamp: String,
    /// Storage backend serving requests
    pub storage: StorageBackend,
    /// Detailed checks for various components
    pub checks: HashMap<String, ComponentHealth>,
}

/// Health status enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All systems operational
    Healthy,
    /// Storage probe failed
    Degraded,
}

/// Individual component health information.
#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentHealth {
    #[schema(example = "healthy")]
    pub status: HealthStatus,
    /// Optional message with details
    #[schema(example = "Connected")]
    pub message: Option<String>,
    /// Probe duration in milliseconds
    #[schema(example = 5)]
    pub response_time_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serialization() {
        assert_eq!(serde_json::to_string(&HealthStatus::Healthy).unwrap(), "\"healthy\"");
        assert_eq!(serde_json::to_string(&HealthStatus::Degraded).unwrap(), "\"degraded\"");
    }

    #[test]
    fn test_health_response_shape() {
        let mut checks = HashMap::new();
        checks.insert(
            "storage".to_string(),
            ComponentHealth {
                status: HealthStatus::Healthy,
                message: Some("Connected".to_string()),
                response_time_ms: Some(3),
            },
        );
        let response = HealthResponse {
            status: HealthStatus::Healthy,
            version: "0.1.0".to_string(),
            timestamp: "2025-01-01T12:00:00Z".to_string(),
            storage: StorageBackend::Postgres,
            checks,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["storage"], "postgres");
        assert_eq!(json["checks"]["storage"]["response_time_ms"], 3);
    }
}
