//! 本地对象句柄
//!
//! # 设计思路
//!
//! 预览图和对比图“原图”一侧都需要一个指向内存文件字节的本地地址。
//! 每个地址都持有一份字节引用，被替换或视图销毁时必须显式释放，
//! 否则内存会随着反复选择文件无限增长。
//!
//! # 实现思路
//!
//! - `ObjectUrlRegistry` 维护 `地址 → Bytes` 映射，地址形如 `blob:git-fit/<序号>`。
//! - `ObjectUrl` 是 RAII 守卫：`Drop` 时自动从注册表撤销，不依赖调用方记得释放。
//! - 注册表本身可克隆（内部 `Arc`），在会话与控制器之间共享同一份。

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;

const URL_PREFIX: &str = "blob:git-fit/";

#[derive(Debug, Default)]
struct Registry {
    entries: Mutex<HashMap<String, Bytes>>,
    next_id: AtomicU64,
}

/// 对象句柄注册表
#[derive(Debug, Clone, Default)]
pub struct ObjectUrlRegistry {
    inner: Arc<Registry>,
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为一段字节创建本地地址
    pub fn create(&self, data: Bytes) -> ObjectUrl {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let url = format!("{}{}", URL_PREFIX, id);
        let size = data.len();

        match self.inner.entries.lock() {
            Ok(mut entries) => {
                entries.insert(url.clone(), data);
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(url.clone(), data);
            }
        }
        log::debug!("🔗 创建对象句柄 {} ({} bytes)", url, size);

        ObjectUrl {
            url,
            registry: Arc::clone(&self.inner),
        }
    }

    /// 按地址取回字节；已撤销的地址返回 `None`
    pub fn resolve(&self, url: &str) -> Option<Bytes> {
        self.inner.entries.lock().ok()?.get(url).cloned()
    }

    /// 当前存活的句柄数量
    pub fn live_count(&self) -> usize {
        self.inner.entries.lock().map(|e| e.len()).unwrap_or(0)
    }
}

/// 本地对象地址守卫，`Drop` 时撤销
#[derive(Debug)]
pub struct ObjectUrl {
    url: String,
    registry: Arc<Registry>,
}

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        let removed = match self.registry.entries.lock() {
            Ok(mut entries) => entries.remove(&self.url),
            Err(poisoned) => poisoned.into_inner().remove(&self.url),
        };
        if removed.is_some() {
            log::debug!("🗑️ 撤销对象句柄 {}", self.url);
        }
    }
}
