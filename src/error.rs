//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，覆盖压缩请求生命周期中的全部失败来源：
//! 表单校验、服务端拒绝、网络中断、结果下载、剪贴板与本地存储。
//!
//! 所有对外的可失败操作统一返回 `Result<T, AppError>`，
//! 会话层通过 [`AppError::user_message`] 得到唯一一条可展示的错误文案。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - `Compression` 原样透传服务端返回的文案，不做任何包装。
//! - `Clipboard` 仅用于诊断日志，永远不会写入会话的错误状态。
//! - 实现 `Serialize` 将错误序列化为字符串，便于前端/CLI 以 JSON 输出。

use serde::Serialize;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 表单校验失败（未选择文件、请求进行中等），不会产生任何网络请求
    #[error("{0}")]
    Validation(String),

    /// 压缩服务返回失败状态码或错误字段，文案取自服务端
    #[error("{0}")]
    Compression(String),

    /// 请求无法完成（连接失败、超时、响应体读取中断）
    #[error("Network error: {0}")]
    Network(String),

    /// 压缩结果下载失败
    #[error("Download failed: {0}")]
    Download(String),

    /// 剪贴板写入失败（只记录日志，不向用户展示）
    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),

    /// 缓存库 / 设置文件等本地存储不可用
    #[error("Storage error: {0}")]
    Storage(String),

    /// 文件系统 I/O 错误
    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// 是否应当展示给用户。
    ///
    /// 剪贴板属于非关键能力，失败时静默降级。
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, AppError::Clipboard(_))
    }

    /// 返回可直接展示的错误文案；不可见的错误返回 `None`。
    pub fn user_message(&self) -> Option<String> {
        self.is_user_visible().then(|| self.to_string())
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
