//! # 对比数据模块（comparison）
//!
//! ## 设计思路
//!
//! 前后对比滑块需要一组 `(before, after, labels)`。压缩之前展示“演示对比”，
//! 来源是外部“每日图片”接口，并带有按日 + 按小时失效的本地缓存与多级兜底。
//!
//! - `data`：`ComparisonData` 模型与标签生成
//! - `cache`：`CacheStore` 键值接口、内存 / SQLite 实现、`CacheEntry` 新鲜度判定
//! - `clock`：可注入时钟与固定参考时区下的日期键
//! - `source`：每日图片接口的请求与响应解释
//! - `provider`：组合以上部分的状态机，保证一定产出结果
//!
//! ## 新同事快速上手
//!
//! ```text
//! ComparisonDataProvider::load_demo_comparison
//!    ├─ cache.rs（新鲜缓存直接返回）
//!    ├─ source.rs（拉取每日图片）
//!    └─ 失败：旧缓存 → 固定占位图
//! ```

pub mod cache;
pub mod clock;
mod data;
mod provider;
mod source;

pub use cache::{CacheEntry, CacheStore, MemoryCacheStore, SqliteCacheStore, CACHE_DATE_KEY, CACHE_PAYLOAD_KEY};
pub use clock::{date_key, reference_offset, Clock, ManualClock, SystemClock};
pub use data::{ComparisonData, DEMO_AFTER_LABEL, DEMO_BEFORE_LABEL};
pub use provider::ComparisonDataProvider;
pub use source::DemoSourceConfig;
