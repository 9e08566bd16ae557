//! 按住步进按钮的连续调整
//!
//! 按下时立即步进一次，之后每隔 [`REPEAT_INTERVAL`] 再步进一次，
//! 松开（`HoldGuard::release` 或 guard 被 drop）立即停止。
//! 每一步都通过 `SizeInput::step` 重新收敛到边界。

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

use super::{SizeInput, StepDirection};
use crate::error::AppError;

pub const REPEAT_INTERVAL: Duration = Duration::from_millis(100);

/// 共享的目标体积输入 + 连续步进控制
#[derive(Clone)]
pub struct SizeStepper {
    input: Arc<Mutex<SizeInput>>,
    interval: Duration,
}

impl SizeStepper {
    pub fn new(input: SizeInput) -> Self {
        Self::with_interval(input, REPEAT_INTERVAL)
    }

    pub fn with_interval(input: SizeInput, interval: Duration) -> Self {
        Self {
            input: Arc::new(Mutex::new(input)),
            interval,
        }
    }

    /// 当前输入快照
    pub fn snapshot(&self) -> Result<SizeInput, AppError> {
        self.input
            .lock()
            .map(|input| input.clone())
            .map_err(|_| AppError::Storage("size input lock poisoned".to_string()))
    }

    /// 在锁内修改输入（编辑文本、失焦收敛、切换单位）
    pub fn update(&self, op: impl FnOnce(&mut SizeInput)) -> Result<(), AppError> {
        let mut input = self
            .input
            .lock()
            .map_err(|_| AppError::Storage("size input lock poisoned".to_string()))?;
        op(&mut input);
        Ok(())
    }

    /// 按下步进按钮。
    ///
    /// 必须在 tokio 运行时内调用；返回的 guard 存活期间持续步进。
    pub fn press(&self, direction: StepDirection) -> Result<HoldGuard, AppError> {
        self.update(|input| input.step(direction))?;

        let input = Arc::clone(&self.input);
        let period = self.interval;
        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                match input.lock() {
                    Ok(mut guard) => guard.step(direction),
                    Err(_) => {
                        log::warn!("⚠️ 目标体积输入锁已中毒，停止连续步进");
                        break;
                    }
                }
            }
        });

        Ok(HoldGuard { task: Some(task) })
    }
}

/// 按住状态守卫：释放或 drop 时立即停止连续步进
pub struct HoldGuard {
    task: Option<JoinHandle<()>>,
}

impl HoldGuard {
    pub fn release(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for HoldGuard {
    fn drop(&mut self) {
        self.stop();
    }
}
