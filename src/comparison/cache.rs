//! 演示对比缓存
//!
//! # 设计思路
//!
//! 缓存只通过很窄的 `CacheStore`（get / set / clear）访问，由调用方注入，
//! 不作为全局状态存在。持久化实现基于 SQLite，跨进程重启保留；
//! 内存实现用于测试与无磁盘场景。
//!
//! # 存储格式
//!
//! 两个固定键：
//! - [`CACHE_PAYLOAD_KEY`]：`{"timestamp": <毫秒>, "data": ComparisonData}`
//! - [`CACHE_DATE_KEY`]：参考时区下的日期键 `YYYY-MM-DD`
//!
//! 只有日期键等于今天且写入时间距今不足 TTL 的条目才算新鲜；
//! 其余条目只能在网络失败时作为最后兜底。

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::ComparisonData;
use crate::error::AppError;

pub const CACHE_PAYLOAD_KEY: &str = "git-fit.demo-comparison";
pub const CACHE_DATE_KEY: &str = "git-fit.demo-comparison-date";

/// 键值缓存存储
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;

    fn clear(&self) -> Result<(), AppError>;
}

/// 内存实现
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, AppError> {
        self.entries
            .lock()
            .map_err(|_| AppError::Storage("memory cache lock poisoned".to_string()))
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        self.lock()?.clear();
        Ok(())
    }
}

/// SQLite 持久化实现
pub struct SqliteCacheStore {
    conn: Mutex<Connection>,
}

impl SqliteCacheStore {
    /// 打开（或创建）缓存库，必要时创建父目录
    pub fn open(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::Storage(format!("failed to create cache directory: {}", e)))?;
        }
        log::info!("缓存库路径: {}", path.display());

        let conn = Connection::open(path)
            .map_err(|e| AppError::Storage(format!("failed to open cache database: {}", e)))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;").ok();
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Storage(format!("failed to open in-memory cache: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, AppError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
        .map_err(|e| AppError::Storage(format!("failed to initialize cache schema: {}", e)))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T>(&self, op: impl FnOnce(&Connection) -> Result<T, AppError>) -> Result<T, AppError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| AppError::Storage(format!("failed to lock cache database: {}", e)))?;
        op(&conn)
    }
}

impl CacheStore for SqliteCacheStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT value FROM kv_store WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
            .map_err(|e| AppError::Storage(format!("failed to read cache key '{}': {}", key, e)))
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map(|_| ())
            .map_err(|e| AppError::Storage(format!("failed to write cache key '{}': {}", key, e)))
        })
    }

    fn clear(&self) -> Result<(), AppError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM kv_store", [])
                .map(|_| ())
                .map_err(|e| AppError::Storage(format!("failed to clear cache: {}", e)))
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredPayload {
    timestamp: i64,
    data: ComparisonData,
}

/// 一条演示对比缓存
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub date_key: String,
    pub timestamp_millis: i64,
    pub payload: ComparisonData,
}

impl CacheEntry {
    /// 是否可以直接复用（不发网络请求）
    pub fn is_fresh(&self, today_key: &str, now_millis: i64, ttl: Duration) -> bool {
        let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        self.date_key == today_key && now_millis.saturating_sub(self.timestamp_millis) < ttl_millis
    }

    /// 读取缓存条目；没有负载时返回 `None`，负载损坏时返回错误
    pub fn read(store: &dyn CacheStore) -> Result<Option<Self>, AppError> {
        let Some(raw) = store.get(CACHE_PAYLOAD_KEY)? else {
            return Ok(None);
        };
        let stored: StoredPayload = serde_json::from_str(&raw)
            .map_err(|e| AppError::Storage(format!("corrupt cached comparison: {}", e)))?;
        let date_key = store.get(CACHE_DATE_KEY)?.unwrap_or_default();

        Ok(Some(Self {
            date_key,
            timestamp_millis: stored.timestamp,
            payload: stored.data,
        }))
    }

    /// 覆盖写入（后写者胜）
    pub fn write(&self, store: &dyn CacheStore) -> Result<(), AppError> {
        let stored = StoredPayload {
            timestamp: self.timestamp_millis,
            data: self.payload.clone(),
        };
        let raw = serde_json::to_string(&stored)
            .map_err(|e| AppError::Storage(format!("failed to serialize comparison: {}", e)))?;
        store.set(CACHE_PAYLOAD_KEY, &raw)?;
        store.set(CACHE_DATE_KEY, &self.date_key)?;
        Ok(())
    }
}
