//! # 压缩模块（compression）
//!
//! ## 设计思路
//!
//! 负责一次压缩请求的完整生命周期：输入校验 → 构建表单 → 单次提交 →
//! 解释响应 → 生成结果对比数据，以及结果下载与服务健康检查。
//!
//! ## 文件结构
//!
//! ```text
//! compression/
//!   ├─ request.rs     FileSelection / CompressionConfig / 表单构建
//!   ├─ response.rs    CompressionResult / 响应解释
//!   ├─ format.rs      human_size
//!   ├─ object_url.rs  本地对象句柄（RAII 撤销）
//!   ├─ controller.rs  CompressionRequestController
//!   ├─ download.rs    结果下载 / 保存
//!   └─ health.rs      健康检查
//! ```

mod controller;
mod download;
mod format;
mod health;
mod object_url;
mod request;
mod response;

pub use controller::{CompressionRequestController, NO_FILE_MESSAGE};
pub use download::{download_result, save_result};
pub use format::human_size;
pub use health::{check_health, HealthStatus};
pub use object_url::{ObjectUrl, ObjectUrlRegistry};
pub use request::{
    build_form, sanitize_file_name, CompressionConfig, FileSelection, OutputFormat, DEFAULT_MAX_SIZE_BYTES,
    DEFAULT_QUALITY, DEFAULT_UPLOAD_NAME, FIELD_FILE, FIELD_FORMAT, FIELD_MAX_SIZE, FIELD_QUALITY,
};
pub use response::{interpret_response, CompressionResult, GENERIC_COMPRESSION_ERROR};
