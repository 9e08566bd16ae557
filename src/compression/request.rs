//! 压缩请求的输入模型与表单构建
//!
//! # 实现思路
//!
//! - `FileSelection` 持有文件字节（`Bytes`，克隆只增加引用计数），提交时只读不改。
//! - `CompressionConfig` 通过 setter 维持“始终合法”：体积大于 0、质量在 1–100。
//! - 文件名去掉控制字符（0x00–0x1F、0x7F），清洗后为空时使用默认名。

use std::fmt;
use std::path::Path;

use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::transport::MultipartForm;

/// 清洗后为空时使用的文件名
pub const DEFAULT_UPLOAD_NAME: &str = "upload";

const FALLBACK_MIME: &str = "application/octet-stream";

pub const DEFAULT_MAX_SIZE_BYTES: u64 = 1_048_576;
pub const DEFAULT_QUALITY: u8 = 85;

/// multipart 字段名
pub const FIELD_FILE: &str = "avatar";
pub const FIELD_MAX_SIZE: &str = "maxsize";
pub const FIELD_FORMAT: &str = "format";
pub const FIELD_QUALITY: &str = "quality";

static CONTROL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x1F\x7F]").expect("control character pattern is valid"));

/// 去掉文件名中的控制字符
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned = CONTROL_CHARS.replace_all(name, "");
    if cleaned.is_empty() {
        DEFAULT_UPLOAD_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// 用户选择的文件
#[derive(Debug, Clone, PartialEq)]
pub struct FileSelection {
    pub data: Bytes,
    pub display_name: String,
    pub byte_size: u64,
    pub declared_mime: String,
}

impl FileSelection {
    /// 由内存字节构造；未声明 MIME 时按内容嗅探
    pub fn from_bytes(display_name: impl Into<String>, data: Bytes, declared_mime: Option<&str>) -> Self {
        let declared_mime = declared_mime
            .filter(|m| !m.trim().is_empty())
            .map(|m| m.to_string())
            .unwrap_or_else(|| sniff_mime(&data));
        Self {
            byte_size: data.len() as u64,
            display_name: display_name.into(),
            declared_mime,
            data,
        }
    }

    /// 从磁盘读取文件
    pub async fn from_path(path: &Path) -> Result<Self, AppError> {
        let data = tokio::fs::read(path).await?;
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_UPLOAD_NAME.to_string());

        let selection = Self::from_bytes(display_name, Bytes::from(data), None);
        log::info!(
            "📂 已选择文件: {} ({} bytes, {})",
            selection.display_name,
            selection.byte_size,
            selection.declared_mime
        );
        Ok(selection)
    }

    pub fn upload_name(&self) -> String {
        sanitize_file_name(&self.display_name)
    }
}

fn sniff_mime(data: &[u8]) -> String {
    infer::get(data)
        .map(|kind| kind.mime_type().to_string())
        .unwrap_or_else(|| FALLBACK_MIME.to_string())
}

/// 输出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
    Gif,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// 质量参数只对 JPEG 有意义
    pub fn uses_quality(self) -> bool {
        matches!(self, Self::Jpeg)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 压缩参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionConfig {
    max_size_bytes: u64,
    format: OutputFormat,
    quality: u8,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
            format: OutputFormat::Jpeg,
            quality: DEFAULT_QUALITY,
        }
    }
}

impl CompressionConfig {
    pub fn new(max_size_bytes: u64, format: OutputFormat, quality: u8) -> Result<Self, AppError> {
        let mut config = Self::default();
        config.set_max_size_bytes(max_size_bytes)?;
        config.set_format(format);
        config.set_quality(quality);
        Ok(config)
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn set_max_size_bytes(&mut self, bytes: u64) -> Result<(), AppError> {
        if bytes == 0 {
            return Err(AppError::Validation("Target size must be greater than zero".to_string()));
        }
        self.max_size_bytes = bytes;
        Ok(())
    }

    pub fn set_format(&mut self, format: OutputFormat) {
        self.format = format;
    }

    /// 质量收敛到 1–100
    pub fn set_quality(&mut self, quality: u8) {
        self.quality = quality.clamp(1, 100);
    }

    /// 反序列化得到的配置可能绕过 setter，提交前再确认一次
    pub fn validate(&self) -> Result<(), AppError> {
        if self.max_size_bytes == 0 {
            return Err(AppError::Validation("Target size must be greater than zero".to_string()));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(AppError::Validation(format!(
                "Quality must be between 1 and 100, got {}",
                self.quality
            )));
        }
        Ok(())
    }
}

/// 构建上传表单：`avatar` / `maxsize` / `format` / `quality`
pub fn build_form(file: &FileSelection, config: &CompressionConfig) -> MultipartForm {
    MultipartForm::new()
        .file(FIELD_FILE, file.upload_name(), file.declared_mime.clone(), file.data.clone())
        .text(FIELD_MAX_SIZE, config.max_size_bytes().to_string())
        .text(FIELD_FORMAT, config.format().as_str())
        .text(FIELD_QUALITY, config.quality().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MultipartField;

    const PNG_HEADER: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

    #[test]
    fn sanitize_strips_control_characters() {
        assert_eq!(sanitize_file_name("ph\u{0}oto\n.jpg"), "photo.jpg");
        assert_eq!(sanitize_file_name("a\u{7F}b.png"), "ab.png");
        assert_eq!(sanitize_file_name("日本語.png"), "日本語.png");
    }

    #[test]
    fn sanitize_keeps_surrounding_whitespace() {
        assert_eq!(sanitize_file_name(" my photo.jpg "), " my photo.jpg ");
        assert_eq!(sanitize_file_name("\n report.png\t"), " report.png");
    }

    #[test]
    fn sanitize_substitutes_default_for_empty_names() {
        assert_eq!(sanitize_file_name(""), DEFAULT_UPLOAD_NAME);
        assert_eq!(sanitize_file_name("\u{1}\u{2}\t"), DEFAULT_UPLOAD_NAME);
    }

    #[test]
    fn defaults_match_form_defaults() {
        let config = CompressionConfig::default();
        assert_eq!(config.max_size_bytes(), 1_048_576);
        assert_eq!(config.format(), OutputFormat::Jpeg);
        assert_eq!(config.quality(), 85);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn quality_is_clamped_and_zero_size_rejected() {
        let mut config = CompressionConfig::default();
        config.set_quality(0);
        assert_eq!(config.quality(), 1);
        config.set_quality(250);
        assert_eq!(config.quality(), 100);

        assert!(matches!(config.set_max_size_bytes(0), Err(AppError::Validation(_))));
        assert_eq!(config.max_size_bytes(), 1_048_576);
    }

    #[test]
    fn deserialized_config_is_revalidated() {
        let config: CompressionConfig =
            serde_json::from_str(r#"{"max_size_bytes":1024,"format":"png","quality":0}"#).expect("parse");
        assert_eq!(config.format(), OutputFormat::Png);
        assert!(matches!(config.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn from_bytes_sniffs_mime_when_undeclared() {
        let png = FileSelection::from_bytes("a.png", Bytes::from_static(PNG_HEADER), None);
        assert_eq!(png.declared_mime, "image/png");
        assert_eq!(png.byte_size, PNG_HEADER.len() as u64);

        let unknown = FileSelection::from_bytes("a.bin", Bytes::from_static(b"hello"), None);
        assert_eq!(unknown.declared_mime, FALLBACK_MIME);

        let declared = FileSelection::from_bytes("a.bin", Bytes::from_static(b"hello"), Some("image/gif"));
        assert_eq!(declared.declared_mime, "image/gif");
    }

    #[tokio::test]
    async fn from_path_reads_name_and_bytes() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("cat.png");
        std::fs::write(&path, PNG_HEADER).expect("write file");

        let selection = FileSelection::from_path(&path).await.expect("read selection");
        assert_eq!(selection.display_name, "cat.png");
        assert_eq!(selection.declared_mime, "image/png");

        let missing = FileSelection::from_path(&dir.path().join("missing.png")).await;
        assert!(matches!(missing, Err(AppError::Io(_))));
    }

    #[test]
    fn form_carries_all_four_fields() {
        let file = FileSelection::from_bytes("my\u{0}pic.jpg", Bytes::from_static(b"jpg"), Some("image/jpeg"));
        let config = CompressionConfig::new(204_800, OutputFormat::Png, 70).expect("config");
        let form = build_form(&file, &config);

        match &form.fields[0] {
            MultipartField::File {
                name,
                file_name,
                mime_type,
                bytes,
            } => {
                assert_eq!(name, FIELD_FILE);
                assert_eq!(file_name, "mypic.jpg");
                assert_eq!(mime_type, "image/jpeg");
                assert_eq!(bytes.as_ref(), b"jpg");
            }
            other => panic!("unexpected first field: {:?}", other),
        }
        assert_eq!(form.text_value(FIELD_MAX_SIZE), Some("204800"));
        assert_eq!(form.text_value(FIELD_FORMAT), Some("png"));
        assert_eq!(form.text_value(FIELD_QUALITY), Some("70"));
    }
}
