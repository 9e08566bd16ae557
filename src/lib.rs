//! # git-fit — 图片压缩客户端库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │              界面层（CLI / 任意前端，订阅状态）            │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ watch::Receiver<FormState> / Result<T, AppError>
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕             核心 (Rust)                          │
//! │                                                          │
//! │  session ─────── FormState + reduce（纯状态转移）        │
//! │   ├─ compression ── 提交 · 响应解释 · 结果对比 · 下载    │
//! │   │    └─ transport   HttpTransport（reqwest）           │
//! │   ├─ comparison ─── 演示对比：缓存 → 拉取 → 兜底         │
//! │   │    └─ cache       SQLite / 内存 键值存储             │
//! │   └─ clipboard ──── 复制结果地址 + 2 秒“已复制”反馈      │
//! │                                                          │
//! │  size_unit ───── KB/MB 输入换算 · 收敛 · 按住步进        │
//! │  geometry ────── 对比滑块坐标 → 百分比 · 拖拽会话        │
//! │  settings ────── JSON 设置文件 + 环境变量覆盖            │
//! │  error ───────── AppError（统一错误类型）                │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，所有可失败操作的返回类型 |
//! | [`settings`] | 服务地址、演示图源、缓存时效等设置的加载与保存 |
//! | [`transport`] | HTTP 传输接口与 reqwest 实现 |
//! | [`size_unit`] | 目标体积输入：规范字节数、边界收敛、单位切换、连续步进 |
//! | [`geometry`] | 前后对比滑块的位置计算与拖拽状态机 |
//! | [`comparison`] | 对比数据模型、演示缓存、每日图片来源与多级兜底 |
//! | [`compression`] | 压缩请求生命周期、结果下载、健康检查 |
//! | [`clipboard`] | 复制结果地址并提供短暂的“已复制”状态 |
//! | [`session`] | 表单状态记录、纯状态转移与资源释放 |

pub mod error;
pub mod settings;
pub mod transport;
pub mod size_unit;
pub mod geometry;
pub mod comparison;
pub mod compression;
pub mod clipboard;
pub mod session;
