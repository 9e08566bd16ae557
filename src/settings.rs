//! 应用设置模块
//!
//! # 设计思路
//!
//! 所有可调参数（服务地址、演示图源、缓存时效、超时）集中在 `AppSettings`，
//! 以 JSON 文件持久化，并允许通过环境变量覆盖少量部署相关字段。
//!
//! # 实现思路
//!
//! - 文件不存在时回退到 `Default`，不视为错误。
//! - 文件存在但无法解析时返回 `AppError::Storage`，避免静默使用错误配置。
//! - 环境变量只覆盖部署相关字段（服务地址、API Key、数据目录）。

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const ENV_API_BASE: &str = "GIT_FIT_API_BASE";
pub const ENV_DEMO_API_KEY: &str = "GIT_FIT_DEMO_API_KEY";
pub const ENV_DATA_DIR: &str = "GIT_FIT_DATA_DIR";

const SETTINGS_FILE_NAME: &str = "settings.json";
const CACHE_DB_FILE_NAME: &str = "cache.db";

/// 应用设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// 压缩服务根地址，`/api/compress` 等路径拼接在其后
    pub api_base_url: String,
    /// 每日图片接口地址
    pub demo_source_url: String,
    /// 每日图片接口的 API Key（默认公共演示 Key）
    pub demo_api_key: String,
    /// 网络与缓存都不可用时使用的固定占位图
    pub fallback_image_url: String,
    /// 计算缓存日期键时使用的固定参考时区（相对 UTC 的分钟数）
    pub reference_utc_offset_minutes: i32,
    /// 演示缓存的有效期（秒）
    pub cache_ttl_secs: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// 数据目录（存放 SQLite 缓存库）；为空时使用系统数据目录
    pub data_dir: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            demo_source_url: "https://api.nasa.gov/planetary/apod".to_string(),
            demo_api_key: "DEMO_KEY".to_string(),
            fallback_image_url: "https://picsum.photos/id/1015/1200/800".to_string(),
            reference_utc_offset_minutes: -5 * 60,
            cache_ttl_secs: 60 * 60,
            connect_timeout_secs: 8,
            request_timeout_secs: 60,
            data_dir: None,
        }
    }
}

impl AppSettings {
    /// 从指定文件加载设置，文件不存在时返回默认值。
    pub fn load_from_path(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            log::debug!("设置文件不存在，使用默认设置: {}", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        serde_json::from_str::<Self>(&content)
            .map_err(|e| AppError::Storage(format!("failed to parse settings file: {}", e)))
    }

    /// 将设置以格式化 JSON 写回文件，必要时创建父目录。
    pub fn save_to_path(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Storage(format!("failed to serialize settings: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// 应用环境变量覆盖。
    pub fn apply_env_overrides(mut self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok());
        self
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(base) = non_empty(ENV_API_BASE) {
            self.api_base_url = base;
        }
        if let Some(key) = non_empty(ENV_DEMO_API_KEY) {
            self.demo_api_key = key;
        }
        if let Some(dir) = non_empty(ENV_DATA_DIR) {
            self.data_dir = Some(dir);
        }
    }

    /// 压缩接口完整地址
    pub fn compress_endpoint(&self) -> String {
        format!("{}/api/compress", self.api_base_url.trim_end_matches('/'))
    }

    /// 健康检查接口完整地址
    pub fn health_endpoint(&self) -> String {
        format!("{}/api/health", self.api_base_url.trim_end_matches('/'))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// 解析数据目录：优先使用配置值，其次系统数据目录，最后退回当前目录。
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(dir) = self.data_dir.as_deref().filter(|d| !d.is_empty()) {
            return PathBuf::from(dir);
        }
        dirs::data_dir()
            .map(|d| d.join("git-fit"))
            .unwrap_or_else(|| PathBuf::from(".git-fit"))
    }

    pub fn cache_db_path(&self) -> PathBuf {
        self.resolve_data_dir().join(CACHE_DB_FILE_NAME)
    }
}

/// 默认设置文件路径（系统配置目录下）
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("git-fit"))
        .unwrap_or_else(|| PathBuf::from(".git-fit"))
        .join(SETTINGS_FILE_NAME)
}
