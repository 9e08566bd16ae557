//! 对比滑块位置计算模块
//!
//! 将指针横坐标映射为容器宽度上的百分比位置，并做边界收敛。
//!
//! # 设计思路
//!
//! - 算法纯函数化：输入为指针坐标与容器矩形，输出唯一百分比，便于测试。
//! - 先算理想位置，再做边界收敛。
//! - 允许滑块把手半径范围内的轻微越界（`knob_offset_percent`），
//!   让把手在 0% / 100% 处仍能完整显示。
//! - 对异常输入（零宽度、非有限坐标）回退到中点，避免上层出现 NaN。

use serde::{Deserialize, Serialize};

/// 滑块把手半径（像素）
pub const KNOB_RADIUS_PX: f64 = 28.0;

/// 初始位置 / 回退位置（百分比）
pub const DEFAULT_POSITION_PERCENT: f64 = 50.0;

/// 容器在视口中的矩形（与 `getBoundingClientRect` 语义一致）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerRect {
    pub left: f64,
    pub width: f64,
}

impl ContainerRect {
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }

    fn is_usable(&self) -> bool {
        self.left.is_finite() && self.width.is_finite() && self.width > 0.0
    }
}

/// 把手半径换算成的百分比越界余量
///
/// 宽度不可用时返回 0。
pub fn knob_offset_percent(width: f64) -> f64 {
    if !width.is_finite() || width <= 0.0 {
        return 0.0;
    }
    (KNOB_RADIUS_PX / width) * 100.0
}

/// 百分比位置的允许范围 `[-offset, 100 + offset]`
pub fn position_bounds(width: f64) -> (f64, f64) {
    let offset = knob_offset_percent(width);
    (-offset, 100.0 + offset)
}

/// 根据指针横坐标计算滑块位置（百分比）
///
/// # 后置条件
/// - 容器可用时：`-offset <= result <= 100 + offset`
/// - 容器不可用或坐标非有限：`result == DEFAULT_POSITION_PERCENT`
///
/// # 示例
/// ```
/// use git_fit::geometry::{calculate_slider_position, ContainerRect};
///
/// let rect = ContainerRect::new(100.0, 400.0);
/// assert_eq!(calculate_slider_position(300.0, rect), 50.0);
/// ```
pub fn calculate_slider_position(client_x: f64, rect: ContainerRect) -> f64 {
    if !rect.is_usable() || !client_x.is_finite() {
        log::warn!(
            "Unusable slider geometry (client_x={}, left={}, width={}), falling back to center",
            client_x,
            rect.left,
            rect.width
        );
        return DEFAULT_POSITION_PERCENT;
    }

    let position = ((client_x - rect.left) / rect.width) * 100.0;
    let (min, max) = position_bounds(rect.width);
    position.clamp(min, max)
}
