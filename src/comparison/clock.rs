//! 时钟抽象
//!
//! 缓存新鲜度依赖“当前时间”，通过注入 `Clock` 让判定逻辑可在测试中精确控制。

use std::sync::Mutex;

use chrono::{DateTime, Duration, FixedOffset, Offset, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 系统时钟
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 手动拨动的时钟，用于测试与回放
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// 固定参考时区下的日历日期键（`YYYY-MM-DD`）
pub fn date_key(now: DateTime<Utc>, reference: FixedOffset) -> String {
    now.with_timezone(&reference).format("%Y-%m-%d").to_string()
}

/// 由分钟偏移构造参考时区，非法偏移回退到 UTC
pub fn reference_offset(minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(minutes.saturating_mul(60)).unwrap_or_else(|| {
        log::warn!("⚠️ 参考时区偏移非法（{} 分钟），回退为 UTC", minutes);
        Utc.fix()
    })
}
