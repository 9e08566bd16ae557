//! 压缩服务健康检查：`GET /api/health` → `{status, uptime, timestamp}`

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::transport::HttpTransport;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub uptime: String,
    /// RFC3339 时间戳
    #[serde(default)]
    pub timestamp: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "ok"
    }
}

pub async fn check_health(transport: &dyn HttpTransport, endpoint: &str) -> Result<HealthStatus, AppError> {
    let response = transport
        .get(endpoint)
        .await
        .map_err(|e| AppError::Network(e.to_string()))?;

    if !response.is_success() {
        return Err(AppError::Network(format!("health check returned HTTP {}", response.status)));
    }

    let status: HealthStatus = serde_json::from_slice(&response.body)
        .map_err(|e| AppError::Network(format!("malformed health response: {}", e)))?;
    log::info!("🩺 服务状态: {} (uptime {})", status.status, status.uptime);
    Ok(status)
}
