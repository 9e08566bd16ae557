//! 对比滑块拖拽会话
//!
//! # 设计思路
//!
//! - 拖拽从容器内按下开始（鼠标与触摸一致处理），按下时立即计算一次位置。
//! - 拖拽期间的移动/抬起事件来自窗口级监听，指针离开容器后仍持续跟踪，
//!   在任意位置抬起都会结束拖拽。
//! - 窗口级监听只在拖拽期间存在：按下时获取 `WindowListenerGuard`，
//!   抬起或滑块销毁时 guard 被 drop，监听随之释放（RAII）。
//! - 视口尺寸变化时刷新容器宽度；前后图片变化时额外把位置重置为 50%。

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

use super::calculation::{calculate_slider_position, ContainerRect, DEFAULT_POSITION_PERCENT};

/// 拖拽状态
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DragState {
    pub position_percent: f64,
    pub is_dragging: bool,
}

impl Default for DragState {
    fn default() -> Self {
        Self {
            position_percent: DEFAULT_POSITION_PERCENT,
            is_dragging: false,
        }
    }
}

/// 指针输入（鼠标或触摸）
#[derive(Debug, Clone, PartialEq)]
pub enum PointerInput {
    Mouse { client_x: f64 },
    /// 当前所有触点的横坐标，取第一个触点
    Touch { touches: Vec<f64> },
}

impl PointerInput {
    pub fn client_x(&self) -> Option<f64> {
        match self {
            Self::Mouse { client_x } => Some(*client_x),
            Self::Touch { touches } => touches.first().copied(),
        }
    }
}

/// 窗口级指针监听的注册表
///
/// 只记录当前存活的订阅数，供宿主决定是否需要真正挂载监听，也便于测试释放纪律。
#[derive(Debug, Clone, Default)]
pub struct WindowListeners {
    active: Arc<AtomicUsize>,
}

impl WindowListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    fn acquire(&self) -> WindowListenerGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        log::debug!("🖱️ 已挂载窗口级指针监听");
        WindowListenerGuard {
            active: Arc::clone(&self.active),
        }
    }
}

/// 窗口级监听守卫：drop 时释放监听
#[derive(Debug)]
pub struct WindowListenerGuard {
    active: Arc<AtomicUsize>,
}

impl Drop for WindowListenerGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
        log::debug!("🖱️ 已释放窗口级指针监听");
    }
}

/// 前后对比滑块
#[derive(Debug)]
pub struct ComparisonSlider {
    state: DragState,
    container_width: f64,
    images: Option<(String, String)>,
    listeners: WindowListeners,
    capture: Option<WindowListenerGuard>,
}

impl ComparisonSlider {
    pub fn new(listeners: WindowListeners, rect: ContainerRect) -> Self {
        Self {
            state: DragState::default(),
            container_width: rect.width.max(0.0),
            images: None,
            listeners,
            capture: None,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// 前景（before）图片应渲染的像素宽度，保持与容器等宽以免被裁剪变形
    pub fn container_width(&self) -> f64 {
        self.container_width
    }

    /// 容器内按下：开始拖拽并立即定位
    pub fn pointer_down(&mut self, input: &PointerInput, rect: ContainerRect) -> DragState {
        self.state.is_dragging = true;
        if self.capture.is_none() {
            self.capture = Some(self.listeners.acquire());
        }
        self.apply_pointer(input, rect);
        self.state
    }

    /// 窗口级移动事件；未在拖拽时忽略
    pub fn window_pointer_move(&mut self, input: &PointerInput, rect: ContainerRect) -> DragState {
        if self.state.is_dragging {
            self.apply_pointer(input, rect);
        }
        self.state
    }

    /// 窗口级抬起事件：任意位置抬起都结束拖拽
    pub fn window_pointer_up(&mut self) -> DragState {
        self.state.is_dragging = false;
        self.capture = None;
        self.state
    }

    /// 视口尺寸变化
    pub fn resize(&mut self, rect: ContainerRect) {
        self.container_width = rect.width.max(0.0);
    }

    /// 前后图片变化：重置到中点并刷新容器宽度
    pub fn images_changed(&mut self, before_url: &str, after_url: &str, rect: ContainerRect) {
        let next = (before_url.to_string(), after_url.to_string());
        if self.images.as_ref() != Some(&next) {
            self.state.position_percent = DEFAULT_POSITION_PERCENT;
            self.images = Some(next);
        }
        self.resize(rect);
    }

    fn apply_pointer(&mut self, input: &PointerInput, rect: ContainerRect) {
        let Some(client_x) = input.client_x() else {
            return;
        };
        self.state.position_percent = calculate_slider_position(client_x, rect);
        self.container_width = rect.width.max(0.0);
    }
}
