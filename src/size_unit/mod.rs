//! # 目标体积输入模块（size_unit）
//!
//! 用户以 “数值 + 单位（KB / MB）” 的形式输入目标体积，本模块负责：
//!
//! - `converter`：数值/单位状态、规范字节数换算、边界收敛与单位切换
//! - `stepper`：按住步进按钮时的连续调整（松开即停）
//!
//! ```text
//! 输入框 / 单位选择 / 步进按钮
//!    ↓
//! SizeInput（纯逻辑，可直接测试）
//!    ↓ to_canonical_bytes()
//! CompressionConfig.max_size_bytes
//! ```

mod converter;
mod stepper;

pub use converter::{SizeInput, SizeUnit, StepDirection};
pub use stepper::{HoldGuard, SizeStepper, REPEAT_INTERVAL};
