//! 每日图片来源
//!
//! 请求 `GET {source_url}?api_key={key}`，期望返回
//! `{"media_type": "image", "url": "...", "title": "..."}`。
//! `media_type` 不是 `image`（例如当天是视频）时视为不可用。

use std::time::Duration;

use chrono::FixedOffset;
use serde::Deserialize;

use super::clock::reference_offset;
use crate::settings::AppSettings;
use crate::transport::{HttpTransport, TransportError};

/// 演示对比数据源配置
#[derive(Debug, Clone)]
pub struct DemoSourceConfig {
    pub source_url: String,
    pub api_key: String,
    pub fallback_image_url: String,
    pub reference_offset: FixedOffset,
    pub cache_ttl: Duration,
}

impl DemoSourceConfig {
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self {
            source_url: settings.demo_source_url.clone(),
            api_key: settings.demo_api_key.clone(),
            fallback_image_url: settings.fallback_image_url.clone(),
            reference_offset: reference_offset(settings.reference_utc_offset_minutes),
            cache_ttl: settings.cache_ttl(),
        }
    }
}

impl Default for DemoSourceConfig {
    fn default() -> Self {
        Self::from_settings(&AppSettings::default())
    }
}

/// 拉取失败的原因（仅用于日志，最终都会进入兜底链路）
#[derive(Debug, thiserror::Error)]
pub(crate) enum DemoFetchError {
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("invalid source url: {0}")]
    InvalidUrl(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("media type '{0}' is not an image")]
    NotAnImage(String),
}

#[derive(Debug, Deserialize)]
struct DailyImageResponse {
    media_type: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: Option<String>,
}

/// 当日可用的演示图片
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DailyImage {
    pub(crate) url: String,
    pub(crate) title: Option<String>,
}

pub(crate) async fn fetch_daily_image(
    transport: &dyn HttpTransport,
    config: &DemoSourceConfig,
) -> Result<DailyImage, DemoFetchError> {
    let url = reqwest::Url::parse_with_params(&config.source_url, &[("api_key", config.api_key.as_str())])
        .map_err(|e| DemoFetchError::InvalidUrl(e.to_string()))?;

    let response = transport.get(url.as_str()).await?;
    if !response.is_success() {
        return Err(DemoFetchError::Status(response.status));
    }

    let parsed: DailyImageResponse = serde_json::from_slice(&response.body)
        .map_err(|e| DemoFetchError::Malformed(e.to_string()))?;

    if parsed.media_type != "image" {
        return Err(DemoFetchError::NotAnImage(parsed.media_type));
    }
    if parsed.url.trim().is_empty() {
        return Err(DemoFetchError::Malformed("missing image url".to_string()));
    }

    Ok(DailyImage {
        url: parsed.url,
        title: parsed.title,
    })
}
