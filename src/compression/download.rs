//! 压缩结果下载
//!
//! `download_url` 作为不透明的二进制资源整体读取；非 2xx 即下载失败，
//! 文案为 `Download failed: HTTP <状态码>`。

use std::path::{Path, PathBuf};

use bytes::Bytes;

use super::request::sanitize_file_name;
use super::response::CompressionResult;
use crate::error::AppError;
use crate::transport::HttpTransport;

/// 下载压缩结果
pub async fn download_result(transport: &dyn HttpTransport, result: &CompressionResult) -> Result<Bytes, AppError> {
    log::info!("⬇️ 下载压缩结果: {}", result.download_url);

    let response = transport
        .get(&result.download_url)
        .await
        .map_err(|e| AppError::Download(e.to_string()))?;

    if !response.is_success() {
        log::warn!("❌ 下载失败 - HTTP {}", response.status);
        return Err(AppError::Download(format!("HTTP {}", response.status)));
    }

    log::info!("✅ 下载完成 - {} bytes", response.body.len());
    Ok(response.body)
}

/// 下载并保存到目录，文件名取结果中的（清洗后）文件名
pub async fn save_result(
    transport: &dyn HttpTransport,
    result: &CompressionResult,
    dir: &Path,
) -> Result<PathBuf, AppError> {
    let bytes = download_result(transport, result).await?;

    tokio::fs::create_dir_all(dir).await?;
    let name = Path::new(&sanitize_file_name(&result.filename))
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| super::request::DEFAULT_UPLOAD_NAME.to_string());
    let path = dir.join(name);
    tokio::fs::write(&path, &bytes).await?;

    log::info!("💾 已保存: {}", path.display());
    Ok(path)
}
