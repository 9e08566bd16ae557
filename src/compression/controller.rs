//! # 压缩请求控制器
//!
//! ## 状态流转
//!
//! ```text
//! submit(file, config)
//!    ├─ file 为空 ───────────→ Validation（不发任何请求）
//!    ├─ config 非法 ─────────→ Validation
//!    ↓
//! 构建 multipart 表单 → POST 一次（不重试）
//!    ├─ 传输失败 ────────────→ Network
//!    ├─ 非 2xx / error 字段 ─→ Compression（文案取自服务端）
//!    ↓
//! CompressionResult
//! ```
//!
//! 成功后由 [`CompressionRequestController::derive_comparison`] 生成结果对比数据：
//! 原图走本地对象句柄，压缩图走下载地址。

use std::sync::Arc;

use chrono::Utc;

use super::object_url::{ObjectUrl, ObjectUrlRegistry};
use super::request::{build_form, CompressionConfig, FileSelection};
use super::response::{interpret_response, CompressionResult};
use crate::comparison::ComparisonData;
use crate::error::AppError;
use crate::transport::HttpTransport;

/// 未选择文件时的提示
pub const NO_FILE_MESSAGE: &str = "Please choose a file to upload";

pub struct CompressionRequestController {
    transport: Arc<dyn HttpTransport>,
    endpoint: String,
    registry: ObjectUrlRegistry,
}

impl CompressionRequestController {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoint: impl Into<String>, registry: ObjectUrlRegistry) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            registry,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn registry(&self) -> &ObjectUrlRegistry {
        &self.registry
    }

    /// 提交一次压缩请求
    pub async fn submit(
        &self,
        file: Option<&FileSelection>,
        config: &CompressionConfig,
    ) -> Result<CompressionResult, AppError> {
        let Some(file) = file else {
            log::warn!("⚠️ 未选择文件，拒绝提交");
            return Err(AppError::Validation(NO_FILE_MESSAGE.to_string()));
        };
        config.validate()?;

        log::info!(
            "🚀 提交压缩请求 - 文件: {} ({} bytes) 目标: {} bytes 格式: {} 质量: {}",
            file.display_name,
            file.byte_size,
            config.max_size_bytes(),
            config.format(),
            config.quality()
        );

        let form = build_form(file, config);
        let response = self.transport.post_multipart(&self.endpoint, form).await.map_err(|e| {
            log::error!("❌ 压缩请求未能完成: {}", e);
            AppError::Network(e.to_string())
        })?;

        let result = interpret_response(response.status, &response.body, Utc::now())?;
        log::info!(
            "✅ 压缩完成 - {} ({} → {} bytes)",
            result.filename,
            file.byte_size,
            result.size_bytes
        );
        Ok(result)
    }

    /// 由原图与压缩结果生成对比数据
    ///
    /// 返回的 `ObjectUrl` 承载原图地址，调用方持有它的时间
    /// 就是对比数据中 `before_url` 有效的时间。
    pub fn derive_comparison(&self, file: &FileSelection, result: &CompressionResult) -> (ComparisonData, ObjectUrl) {
        let before = self.registry.create(file.data.clone());
        let data = ComparisonData::for_compression(
            before.as_str(),
            result.download_url.clone(),
            file.byte_size,
            result.size_bytes,
        );
        (data, before)
    }
}
