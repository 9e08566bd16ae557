//! 数值/单位换算与边界收敛
//!
//! # 规则
//!
//! | 单位 | 下限 | 上限 | 步长 | 倍率 |
//! |------|------|------|------|------|
//! | MB   | 0.1  | 1    | 0.1  | 1024 × 1024 |
//! | KB   | 10   | 1024 | 10   | 1024 |
//!
//! - 规范字节数 = `floor(数值 × 倍率)`。
//! - 失焦或切换单位时收敛：越界取最近边界，非数字取该单位上限。
//! - 切换单位只做收敛，不做数值换算（KB 2000 → MB 1）。
//! - 范围内的输入保持用户原文不变，因此收敛是幂等的。

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeUnit {
    #[serde(rename = "KB")]
    Kb,
    #[serde(rename = "MB")]
    Mb,
}

impl SizeUnit {
    /// 每单位对应的字节数
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Kb => 1024.0,
            Self::Mb => 1024.0 * 1024.0,
        }
    }

    pub fn min(self) -> f64 {
        match self {
            Self::Kb => 10.0,
            Self::Mb => 0.1,
        }
    }

    pub fn max(self) -> f64 {
        match self {
            Self::Kb => 1024.0,
            Self::Mb => 1.0,
        }
    }

    pub fn step(self) -> f64 {
        match self {
            Self::Kb => 10.0,
            Self::Mb => 0.1,
        }
    }

    /// 步进结果保留的小数位数，用于消除 0.1 累加的浮点误差
    fn step_decimals(self) -> i32 {
        match self {
            Self::Kb => 0,
            Self::Mb => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kb => "KB",
            Self::Mb => "MB",
        }
    }

    pub fn parse(unit: &str) -> Option<Self> {
        match unit.trim().to_ascii_uppercase().as_str() {
            "KB" => Some(Self::Kb),
            "MB" => Some(Self::Mb),
            _ => None,
        }
    }
}

impl fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Up,
    Down,
}

/// 目标体积输入状态：用户看到的文本 + 单位
#[derive(Debug, Clone, PartialEq)]
pub struct SizeInput {
    value: String,
    unit: SizeUnit,
}

impl Default for SizeInput {
    /// 默认 1 MB，与压缩配置默认值 1_048_576 字节一致
    fn default() -> Self {
        Self::new("1", SizeUnit::Mb)
    }
}

impl SizeInput {
    pub fn new(value: impl Into<String>, unit: SizeUnit) -> Self {
        Self {
            value: value.into(),
            unit,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn unit(&self) -> SizeUnit {
        self.unit
    }

    /// 用户编辑输入框时调用；此时不收敛，允许中间态（如空串、"0."）。
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    fn parsed(&self) -> Option<f64> {
        self.value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// 当前数值收敛到边界后的结果（不修改状态）
    fn clamped_number(&self) -> f64 {
        match self.parsed() {
            Some(v) => v.clamp(self.unit.min(), self.unit.max()),
            None => self.unit.max(),
        }
    }

    /// 换算为规范字节数。
    ///
    /// 尚未收敛的非数字输入按单位上限计算，与失焦后的显示保持一致。
    pub fn to_canonical_bytes(&self) -> u64 {
        let value = self.parsed().unwrap_or_else(|| self.unit.max()).max(0.0);
        (value * self.unit.multiplier()).floor() as u64
    }

    /// 失焦时的边界收敛。范围内的值保持原文。
    pub fn clamp(&mut self) {
        match self.parsed() {
            Some(v) if v >= self.unit.min() && v <= self.unit.max() => {}
            _ => self.value = format_number(self.clamped_number()),
        }
    }

    /// 切换单位并按新单位的边界收敛
    pub fn switch_unit(&mut self, unit: SizeUnit) {
        if self.unit == unit {
            return;
        }
        self.unit = unit;
        self.clamp();
    }

    /// 应用一次步进并重新收敛
    pub fn step(&mut self, direction: StepDirection) {
        let current = self.clamped_number();
        let delta = match direction {
            StepDirection::Up => self.unit.step(),
            StepDirection::Down => -self.unit.step(),
        };
        let next = round_to(current + delta, self.unit.step_decimals())
            .clamp(self.unit.min(), self.unit.max());
        self.value = format_number(next);
    }

    pub fn step_up(&mut self) {
        self.step(StepDirection::Up);
    }

    pub fn step_down(&mut self) {
        self.step(StepDirection::Down);
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// 去掉多余的尾随 0：`1.0 -> "1"`、`0.1 -> "0.1"`
fn format_number(value: f64) -> String {
    let text = format!("{:.6}", value);
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
