//! # 表单会话模块
//!
//! ## 设计思路
//!
//! 表单的全部可观察状态（文件、参数、结果、错误、对比数据）集中在一个
//! `FormState` 记录中，只能通过纯函数 [`reduce`] 由 `FormEvent` 推进。
//! 界面层通过 `watch` 通道订阅状态变化，核心逻辑不关心渲染。
//!
//! ## 实现思路
//!
//! - `FormSession` 持有文件字节、预览句柄、结果对比句柄等资源，
//!   状态记录里只放可克隆的摘要（名称、大小、预览地址）。
//! - 替换或移除文件、得到新的压缩结果、会话销毁时，对应的对象句柄随之释放。
//! - 同一时刻最多一个进行中的提交：重复提交直接以校验错误拒绝，不改动现有状态。
//! - 每次选择或移除文件都会递增选择代数；请求返回时代数已变化，则结果作废，
//!   只清除提交中标记，不写结果、不写错误、不保留对比句柄。
//! - 每次完成的提交只会设置结果或错误其中之一，开始下一次提交时两者都被清空。
//!
//! ## 事件与状态
//!
//! ```text
//! FileSelected  → file 替换，result / error / 结果对比 清空
//! FileRemoved   → 同上，file 置空
//! SubmitStarted → submitting = true，result / error 清空
//! SubmitSucceeded → result + 结果对比，submitting = false
//! SubmitFailed  → error，submitting = false
//! SubmitAbandoned → 仅 submitting = false（文件已被替换或移除）
//! ErrorRaised   → 仅替换 error（未选文件、下载失败）
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use tokio::sync::watch;

use crate::clipboard::{ArboardBackend, ClipboardPublisher};
use crate::comparison::{
    CacheStore, ComparisonData, ComparisonDataProvider, DemoSourceConfig, MemoryCacheStore, SqliteCacheStore,
    SystemClock,
};
use crate::compression::{
    self, CompressionConfig, CompressionRequestController, CompressionResult, FileSelection, ObjectUrl,
    ObjectUrlRegistry,
};
use crate::error::AppError;
use crate::settings::AppSettings;
use crate::size_unit::SizeInput;
use crate::transport::{HttpTransport, ReqwestTransport};

/// 重复提交时的提示
pub const SUBMIT_IN_PROGRESS_MESSAGE: &str = "A compression request is already in progress";
pub const NO_RESULT_MESSAGE: &str = "No compression result available";
/// 请求返回前文件已被替换或移除
pub const SELECTION_CHANGED_MESSAGE: &str = "The selected file changed before compression finished";

/// 已选文件的摘要
#[derive(Debug, Clone, PartialEq)]
pub struct FileSummary {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub preview_url: String,
}

/// 表单状态
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormState {
    pub file: Option<FileSummary>,
    pub config: CompressionConfig,
    pub is_submitting: bool,
    pub result: Option<CompressionResult>,
    pub error: Option<String>,
    pub demo_comparison: Option<ComparisonData>,
    pub result_comparison: Option<ComparisonData>,
}

impl FormState {
    /// 当前应展示的对比数据：有结果时用结果，否则用演示
    pub fn comparison(&self) -> Option<&ComparisonData> {
        self.result_comparison.as_ref().or(self.demo_comparison.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    FileSelected(FileSummary),
    FileRemoved,
    ConfigChanged(CompressionConfig),
    DemoLoaded(ComparisonData),
    SubmitStarted,
    SubmitSucceeded {
        result: CompressionResult,
        comparison: ComparisonData,
    },
    SubmitFailed(String),
    SubmitAbandoned,
    ErrorRaised(String),
}

/// 纯状态转移
pub fn reduce(state: &FormState, event: FormEvent) -> FormState {
    let mut next = state.clone();
    match event {
        FormEvent::FileSelected(summary) => {
            next.file = Some(summary);
            next.result = None;
            next.error = None;
            next.result_comparison = None;
        }
        FormEvent::FileRemoved => {
            next.file = None;
            next.result = None;
            next.error = None;
            next.result_comparison = None;
        }
        FormEvent::ConfigChanged(config) => {
            next.config = config;
        }
        FormEvent::DemoLoaded(data) => {
            next.demo_comparison = Some(data);
        }
        FormEvent::SubmitStarted => {
            next.is_submitting = true;
            next.result = None;
            next.error = None;
        }
        FormEvent::SubmitSucceeded { result, comparison } => {
            next.is_submitting = false;
            next.result = Some(result);
            next.error = None;
            next.result_comparison = Some(comparison);
        }
        FormEvent::SubmitFailed(message) => {
            next.is_submitting = false;
            next.result = None;
            next.error = Some(message);
        }
        FormEvent::SubmitAbandoned => {
            next.is_submitting = false;
        }
        FormEvent::ErrorRaised(message) => {
            next.error = Some(message);
        }
    }
    next
}

/// 进行中提交的 RAII 标记，离开作用域时自动清除
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct Resources {
    selection: Option<FileSelection>,
    preview: Option<ObjectUrl>,
    result_before: Option<ObjectUrl>,
    generation: u64,
}

impl Resources {
    fn replace_selection(&mut self, selection: Option<FileSelection>, preview: Option<ObjectUrl>) {
        self.selection = selection;
        self.preview = preview;
        self.result_before = None;
        self.generation = self.generation.wrapping_add(1);
    }
}

pub struct FormSession {
    controller: CompressionRequestController,
    provider: ComparisonDataProvider,
    transport: Arc<dyn HttpTransport>,
    clipboard: ClipboardPublisher,
    state: watch::Sender<FormState>,
    resources: Mutex<Resources>,
    in_flight: AtomicBool,
}

impl FormSession {
    pub fn new(
        controller: CompressionRequestController,
        provider: ComparisonDataProvider,
        transport: Arc<dyn HttpTransport>,
        clipboard: ClipboardPublisher,
    ) -> Self {
        let (state, _) = watch::channel(FormState::default());
        Self {
            controller,
            provider,
            transport,
            clipboard,
            state,
            resources: Mutex::new(Resources::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// 按设置装配默认实现：reqwest 传输、SQLite 缓存、系统时钟、arboard 剪贴板
    pub fn from_settings(settings: &AppSettings) -> Result<Self, AppError> {
        let transport: Arc<dyn HttpTransport> = Arc::new(
            ReqwestTransport::new(
                std::time::Duration::from_secs(settings.connect_timeout_secs),
                std::time::Duration::from_secs(settings.request_timeout_secs),
            )
            .map_err(|e| AppError::Network(e.to_string()))?,
        );
        let db_path = settings.cache_db_path();
        let store: Arc<dyn CacheStore> = match SqliteCacheStore::open(&db_path) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                log::warn!("⚠️ 无法打开缓存数据库 {:?}，改用内存缓存: {}", db_path, e);
                Arc::new(MemoryCacheStore::new())
            }
        };

        let controller = CompressionRequestController::new(
            Arc::clone(&transport),
            settings.compress_endpoint(),
            ObjectUrlRegistry::new(),
        );
        let provider = ComparisonDataProvider::new(
            store,
            Arc::clone(&transport),
            Arc::new(SystemClock),
            DemoSourceConfig::from_settings(settings),
        );
        let clipboard = ClipboardPublisher::new(Arc::new(ArboardBackend));

        Ok(Self::new(controller, provider, transport, clipboard))
    }

    fn dispatch(&self, event: FormEvent) {
        self.state.send_modify(|state| *state = reduce(state, event));
    }

    fn resources(&self) -> Result<std::sync::MutexGuard<'_, Resources>, AppError> {
        self.resources
            .lock()
            .map_err(|_| AppError::Storage("session resources lock poisoned".to_string()))
    }

    pub fn state(&self) -> FormState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FormState> {
        self.state.subscribe()
    }

    pub fn clipboard(&self) -> &ClipboardPublisher {
        &self.clipboard
    }

    /// 选择文件：替换旧文件并释放旧的预览与结果句柄
    pub fn select_file(&self, file: FileSelection) -> Result<(), AppError> {
        let preview = self.controller.registry().create(file.data.clone());
        let summary = FileSummary {
            name: file.display_name.clone(),
            size_bytes: file.byte_size,
            mime_type: file.declared_mime.clone(),
            preview_url: preview.as_str().to_string(),
        };

        self.resources()?.replace_selection(Some(file), Some(preview));
        self.dispatch(FormEvent::FileSelected(summary));
        Ok(())
    }

    pub fn remove_file(&self) -> Result<(), AppError> {
        self.resources()?.replace_selection(None, None);
        self.dispatch(FormEvent::FileRemoved);
        Ok(())
    }

    pub fn set_config(&self, config: CompressionConfig) -> Result<(), AppError> {
        config.validate()?;
        self.dispatch(FormEvent::ConfigChanged(config));
        Ok(())
    }

    /// 将目标体积输入换算为规范字节数写入参数
    pub fn apply_size_input(&self, input: &SizeInput) -> Result<(), AppError> {
        let mut clamped = input.clone();
        clamped.clamp();
        let mut config = self.state.borrow().config;
        config.set_max_size_bytes(clamped.to_canonical_bytes())?;
        self.dispatch(FormEvent::ConfigChanged(config));
        Ok(())
    }

    pub async fn load_demo(&self) -> ComparisonData {
        let data = self.provider.load_demo_comparison().await;
        self.dispatch(FormEvent::DemoLoaded(data.clone()));
        data
    }

    /// 提交当前文件
    pub async fn submit(&self) -> Result<CompressionResult, AppError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            log::warn!("⚠️ 已有进行中的压缩请求，忽略重复提交");
            return Err(AppError::Validation(SUBMIT_IN_PROGRESS_MESSAGE.to_string()));
        };

        let (selection, generation) = {
            let res = self.resources()?;
            (res.selection.clone(), res.generation)
        };
        let config = self.state.borrow().config;

        if selection.is_some() {
            self.dispatch(FormEvent::SubmitStarted);
        }

        let outcome = self.controller.submit(selection.as_ref(), &config).await;

        // 状态更新在资源锁内完成，避免与并发的选择/移除交错
        let mut res = self.resources()?;
        if selection.is_some() && res.generation != generation {
            log::info!("🗑️ 文件在请求期间已变更，丢弃本次压缩结果");
            self.dispatch(FormEvent::SubmitAbandoned);
            return Err(AppError::Validation(SELECTION_CHANGED_MESSAGE.to_string()));
        }

        match (outcome, selection) {
            (Ok(result), Some(file)) => {
                let (comparison, before) = self.controller.derive_comparison(&file, &result);
                res.result_before = Some(before);
                self.dispatch(FormEvent::SubmitSucceeded {
                    result: result.clone(),
                    comparison,
                });
                Ok(result)
            }
            (Ok(_), None) => Err(AppError::Validation(compression::NO_FILE_MESSAGE.to_string())),
            (Err(err), file) => {
                if let Some(message) = err.user_message() {
                    if file.is_some() {
                        self.dispatch(FormEvent::SubmitFailed(message));
                    } else {
                        self.dispatch(FormEvent::ErrorRaised(message));
                    }
                }
                Err(err)
            }
        }
    }

    fn current_result(&self) -> Result<CompressionResult, AppError> {
        self.state
            .borrow()
            .result
            .clone()
            .ok_or_else(|| AppError::Validation(NO_RESULT_MESSAGE.to_string()))
    }

    fn record_error(&self, err: AppError) -> AppError {
        if let Some(message) = err.user_message() {
            self.dispatch(FormEvent::ErrorRaised(message));
        }
        err
    }

    /// 下载当前结果
    pub async fn download_result(&self) -> Result<Bytes, AppError> {
        let result = self.current_result()?;
        compression::download_result(self.transport.as_ref(), &result)
            .await
            .map_err(|e| self.record_error(e))
    }

    /// 下载当前结果并保存到目录
    pub async fn save_result_to(&self, dir: &Path) -> Result<PathBuf, AppError> {
        let result = self.current_result()?;
        compression::save_result(self.transport.as_ref(), &result, dir)
            .await
            .map_err(|e| self.record_error(e))
    }

    /// 复制当前结果的下载地址
    pub async fn copy_result_url(&self) {
        let url = self.state.borrow().result.as_ref().map(|r| r.download_url.clone());
        match url {
            Some(url) => self.clipboard.copy(&url).await,
            None => log::debug!("没有可复制的结果地址"),
        }
    }
}
