//! 压缩服务响应解释
//!
//! 成功响应：`{filename, size, mime, download_url, expires_in}`。
//! 失败判定：非 2xx 状态，或 2xx 响应体里带有 `error` 字段。
//! 错误文案优先取 `error`，其次 `message`，都没有时使用通用文案。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// 服务端未提供文案时的通用失败信息
pub const GENERIC_COMPRESSION_ERROR: &str = "Compression failed";

/// 一次成功压缩的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionResult {
    pub filename: String,
    #[serde(rename = "size")]
    pub size_bytes: u64,
    #[serde(rename = "mime")]
    pub mime_type: String,
    pub download_url: String,
    #[serde(rename = "expires_in", default)]
    pub expires_in_seconds: u64,
    #[serde(skip, default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

impl CompressionResult {
    /// 下载地址是否已过期
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let expires_at = i64::try_from(self.expires_in_seconds)
            .ok()
            .and_then(chrono::TimeDelta::try_seconds)
            .and_then(|lifetime| self.received_at.checked_add_signed(lifetime));
        match expires_at {
            Some(deadline) => now >= deadline,
            None => false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    fn error_text(&self) -> Option<&str> {
        self.error.as_deref().filter(|s| !s.trim().is_empty())
    }

    fn best_message(&self) -> String {
        self.error_text()
            .or_else(|| self.message.as_deref().filter(|s| !s.trim().is_empty()))
            .unwrap_or(GENERIC_COMPRESSION_ERROR)
            .to_string()
    }
}

/// 解释压缩接口的响应
pub fn interpret_response(
    status: u16,
    body: &[u8],
    received_at: DateTime<Utc>,
) -> Result<CompressionResult, AppError> {
    let error_body = ErrorBody::parse(body);

    if !(200..300).contains(&status) {
        let message = error_body.best_message();
        log::warn!("❌ 压缩服务返回失败状态 {}: {}", status, message);
        return Err(AppError::Compression(message));
    }

    if let Some(error) = error_body.error_text() {
        log::warn!("❌ 压缩服务返回错误字段: {}", error);
        return Err(AppError::Compression(error.to_string()));
    }

    let mut result: CompressionResult = serde_json::from_slice(body).map_err(|e| {
        log::warn!("❌ 无法解析压缩结果: {}", e);
        AppError::Compression(GENERIC_COMPRESSION_ERROR.to_string())
    })?;
    result.received_at = received_at;
    Ok(result)
}
