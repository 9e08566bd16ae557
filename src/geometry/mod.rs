//! 前后对比滑块几何模块
//!
//! - `calculation`：指针坐标 → 百分比位置的纯函数与边界
//! - `slider`：拖拽会话状态机与窗口级监听的获取/释放
//!
//! # 坐标约定
//!
//! 所有坐标都是视口坐标（CSS 像素），容器矩形只需要左边界与宽度。

pub mod calculation;
pub mod slider;

pub use calculation::{
    calculate_slider_position, knob_offset_percent, position_bounds, ContainerRect,
    DEFAULT_POSITION_PERCENT, KNOB_RADIUS_PX,
};
pub use slider::{ComparisonSlider, DragState, PointerInput, WindowListenerGuard, WindowListeners};
