//! Health check functionality
//!
//! Backs `GET /health` on every mount so monitoring can verify the service is
//! up and see how many resources and tools the mount exposes.

use {
    crate::registry::Registry,
    serde::{Deserialize, Serialize},
    std::time::{SystemTime, UNIX_EPOCH},
};

/// Health check response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Always "healthy" if responding
    pub status: String,

    /// Seconds since Unix epoch
    pub timestamp: u64,

    pub version: String,

    pub server_name: String,

    pub uptime_seconds: u64,

    pub resource_count: usize,

    pub tool_count: usize,
}

/// Health check provider for one mounted server
#[derive(Debug, Clone)]
pub struct HealthChecker {
    start_time: SystemTime,
    version: String,
    server_name: String,
}

impl HealthChecker {
    pub fn new(server_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            start_time: SystemTime::now(),
            version: version.into(),
            server_name: server_name.into(),
        }
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Current status, with counts taken from `registry`
    pub fn get_status(&self, registry: &Registry) -> HealthStatus {
        let now = SystemTime::now();
        let timestamp = now.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
        let uptime_seconds = now
            .duration_since(self.start_time)
            .unwrap_or_default()
            .as_secs();

        HealthStatus {
            status: "healthy".to_string(),
            timestamp,
            version: self.version.clone(),
            server_name: self.server_name.clone(),
            uptime_seconds,
            resource_count: registry.resource_count(),
            tool_count: registry.tool_count(),
        }
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new("hostmcp", env!("CARGO_PKG_VERSION"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ResourceDescriptor;

    #[test]
    fn test_status_reports_registry_counts() {
        let mut builder = Registry::builder();
        builder.resource(ResourceDescriptor::new("airbnb://properties", "Properties"));
        let registry = builder.build();

        let status = HealthChecker::new("portfolio", "1.2.3").get_status(&registry);
        assert_eq!(status.status, "healthy");
        assert_eq!(status.version, "1.2.3");
        assert_eq!(status.resource_count, 1);
        assert_eq!(status.tool_count, 0);
    }
}
