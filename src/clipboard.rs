//! # 剪贴板发布模块
//!
//! ## 设计思路
//!
//! 复制结果地址是非关键能力：成功时给出一个短暂的“已复制”反馈，
//! 失败时只记录诊断日志，不打扰用户。
//!
//! ## 实现思路
//!
//! - 剪贴板写入通过 `ClipboardBackend` 注入，默认实现基于 `arboard`，
//!   在阻塞线程中执行，避免阻塞 async 运行时。
//! - “已复制”标志放在 `tokio::sync::watch` 中，界面层订阅变化即可。
//! - 每次成功复制递增一个代数，2 秒后的复位任务只在代数未变时生效，
//!   连续复制时以最后一次为准重新计时。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::AppError;

/// “已复制”标志自动复位的延迟
pub const COPIED_RESET_DELAY: Duration = Duration::from_secs(2);

// ============================================================================
// 剪贴板后端
// ============================================================================

#[async_trait]
pub trait ClipboardBackend: Send + Sync {
    async fn set_text(&self, text: &str) -> Result<(), AppError>;
}

/// 基于 arboard 的系统剪贴板
#[derive(Debug, Default, Clone, Copy)]
pub struct ArboardBackend;

#[async_trait]
impl ClipboardBackend for ArboardBackend {
    async fn set_text(&self, text: &str) -> Result<(), AppError> {
        let text = text.to_string();
        tokio::task::spawn_blocking(move || {
            let mut clipboard = arboard::Clipboard::new().map_err(|e| AppError::Clipboard(e.to_string()))?;
            clipboard
                .set_text(text)
                .map_err(|e| AppError::Clipboard(e.to_string()))
        })
        .await
        .map_err(|e| AppError::Clipboard(format!("clipboard task failed: {}", e)))?
    }
}

// ============================================================================
// ClipboardPublisher
// ============================================================================

pub struct ClipboardPublisher {
    backend: Arc<dyn ClipboardBackend>,
    copied: Arc<watch::Sender<bool>>,
    generation: Arc<AtomicU64>,
    reset_delay: Duration,
}

impl ClipboardPublisher {
    pub fn new(backend: Arc<dyn ClipboardBackend>) -> Self {
        Self::with_reset_delay(backend, COPIED_RESET_DELAY)
    }

    pub fn with_reset_delay(backend: Arc<dyn ClipboardBackend>, reset_delay: Duration) -> Self {
        let (copied, _) = watch::channel(false);
        Self {
            backend,
            copied: Arc::new(copied),
            generation: Arc::new(AtomicU64::new(0)),
            reset_delay,
        }
    }

    /// 复制地址；失败只记录日志
    pub async fn copy(&self, url: &str) {
        if let Err(err) = self.backend.set_text(url).await {
            log::warn!("⚠️ 复制到剪贴板失败: {}", err);
            return;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.copied.send_replace(true);
        log::debug!("📋 已复制到剪贴板: {}", url);

        let copied = Arc::clone(&self.copied);
        let current = Arc::clone(&self.generation);
        let delay = self.reset_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if current.load(Ordering::SeqCst) == generation {
                copied.send_replace(false);
            }
        });
    }

    pub fn is_copied(&self) -> bool {
        *self.copied.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.copied.subscribe()
    }
}
