//! # 演示对比数据提供者
//!
//! ## 状态流转
//!
//! ```text
//! 计算今日日期键
//!    ↓
//! 缓存新鲜？（同一天 且 未超过 TTL）──是──→ 直接返回缓存
//!    ↓ 否
//! 拉取每日图片 ──成功──→ 构造演示数据 → 覆盖写缓存 → 返回
//!    ↓ 失败（网络 / 格式 / 非图片）
//! 存在任意旧缓存？──是──→ 返回旧缓存（不论日期与时效）
//!    ↓ 否
//! 返回固定占位图
//! ```
//!
//! 无论哪条路径，`load_demo_comparison` 都一定产出一个值。

use std::sync::Arc;

use super::cache::{CacheEntry, CacheStore};
use super::clock::{date_key, Clock};
use super::source::{fetch_daily_image, DemoSourceConfig};
use super::ComparisonData;
use crate::transport::HttpTransport;

pub struct ComparisonDataProvider {
    store: Arc<dyn CacheStore>,
    transport: Arc<dyn HttpTransport>,
    clock: Arc<dyn Clock>,
    config: DemoSourceConfig,
}

impl ComparisonDataProvider {
    pub fn new(
        store: Arc<dyn CacheStore>,
        transport: Arc<dyn HttpTransport>,
        clock: Arc<dyn Clock>,
        config: DemoSourceConfig,
    ) -> Self {
        Self {
            store,
            transport,
            clock,
            config,
        }
    }

    /// 读取缓存；存储层或负载异常都按“无缓存”处理
    fn read_cache(&self) -> Option<CacheEntry> {
        match CacheEntry::read(self.store.as_ref()) {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("⚠️ 读取演示缓存失败，按无缓存处理: {}", err);
                None
            }
        }
    }

    /// 加载演示对比数据（会话开始时调用一次）
    pub async fn load_demo_comparison(&self) -> ComparisonData {
        let now = self.clock.now();
        let today = date_key(now, self.config.reference_offset);
        let now_millis = now.timestamp_millis();

        let cached = self.read_cache();
        if let Some(entry) = cached.as_ref() {
            if entry.is_fresh(&today, now_millis, self.config.cache_ttl) {
                log::info!("♻️ 命中演示缓存 - 日期: {}", entry.date_key);
                return entry.payload.clone();
            }
            log::debug!(
                "演示缓存已过期 - 缓存日期: {} 今日: {} 已存在: {} ms",
                entry.date_key,
                today,
                now_millis.saturating_sub(entry.timestamp_millis)
            );
        }

        match fetch_daily_image(self.transport.as_ref(), &self.config).await {
            Ok(image) => {
                log::info!(
                    "🌌 已获取每日图片{}",
                    image.title.as_deref().map(|t| format!(" - {}", t)).unwrap_or_default()
                );
                let payload = ComparisonData::demo(image.url);
                let entry = CacheEntry {
                    date_key: today,
                    timestamp_millis: now_millis,
                    payload: payload.clone(),
                };
                if let Err(err) = entry.write(self.store.as_ref()) {
                    log::warn!("⚠️ 写入演示缓存失败: {}", err);
                }
                payload
            }
            Err(err) => {
                log::warn!("⚠️ 每日图片获取失败: {}", err);
                match cached {
                    Some(entry) => {
                        log::info!("使用旧的演示缓存兜底 - 日期: {}", entry.date_key);
                        entry.payload
                    }
                    None => {
                        log::info!("无可用缓存，使用固定占位图");
                        ComparisonData::demo(self.config.fallback_image_url.clone())
                    }
                }
            }
        }
    }
}
