// Shared fakes for integration tests
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Notify;

use git_fit::clipboard::{ClipboardBackend, ClipboardPublisher};
use git_fit::comparison::{ComparisonDataProvider, DemoSourceConfig, ManualClock, MemoryCacheStore};
use git_fit::compression::{CompressionRequestController, ObjectUrlRegistry};
use git_fit::error::AppError;
use git_fit::session::FormSession;
use git_fit::transport::{HttpResponse, HttpTransport, MultipartForm, TransportError};

pub const ENDPOINT: &str = "http://localhost:8080/api/compress";

pub fn json(status: u16, body: &str) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status,
        content_type: Some("application/json".to_string()),
        body: Bytes::from(body.to_string()),
    })
}

pub fn binary(status: u16, body: &'static [u8]) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status,
        content_type: Some("image/jpeg".to_string()),
        body: Bytes::from_static(body),
    })
}

/// Records every request and replays scripted responses in order.
#[derive(Default)]
pub struct RecordingTransport {
    post_responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    get_responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    pub posts: Mutex<Vec<(String, MultipartForm)>>,
    pub gets: Mutex<Vec<String>>,
    /// When set, POST waits until notified.
    pub gate: Option<Arc<Notify>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gate(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn push_post(&self, response: Result<HttpResponse, TransportError>) {
        self.post_responses.lock().expect("lock").push_back(response);
    }

    pub fn push_get(&self, response: Result<HttpResponse, TransportError>) {
        self.get_responses.lock().expect("lock").push_back(response);
    }

    pub fn post_count(&self) -> usize {
        self.posts.lock().expect("lock").len()
    }

    pub fn get_count(&self) -> usize {
        self.gets.lock().expect("lock").len()
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn post_multipart(&self, url: &str, form: MultipartForm) -> Result<HttpResponse, TransportError> {
        self.posts.lock().expect("lock").push((url.to_string(), form));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.post_responses
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connect("no scripted POST response".to_string())))
    }

    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.gets.lock().expect("lock").push(url.to_string());
        self.get_responses
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connect("no scripted GET response".to_string())))
    }
}

#[derive(Default)]
pub struct MemoryClipboard {
    pub texts: Mutex<Vec<String>>,
}

#[async_trait]
impl ClipboardBackend for MemoryClipboard {
    async fn set_text(&self, text: &str) -> Result<(), AppError> {
        self.texts.lock().expect("lock").push(text.to_string());
        Ok(())
    }
}

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 17, 0, 0).single().expect("valid time")
}

pub struct Harness {
    pub transport: Arc<RecordingTransport>,
    pub store: Arc<MemoryCacheStore>,
    pub clock: Arc<ManualClock>,
    pub clipboard: Arc<MemoryClipboard>,
    pub registry: ObjectUrlRegistry,
}

impl Harness {
    pub fn new(transport: RecordingTransport) -> Self {
        Self {
            transport: Arc::new(transport),
            store: Arc::new(MemoryCacheStore::new()),
            clock: Arc::new(ManualClock::new(fixed_now())),
            clipboard: Arc::new(MemoryClipboard::default()),
            registry: ObjectUrlRegistry::new(),
        }
    }

    pub fn provider(&self) -> ComparisonDataProvider {
        ComparisonDataProvider::new(
            self.store.clone(),
            self.transport.clone(),
            self.clock.clone(),
            DemoSourceConfig::default(),
        )
    }

    pub fn session(&self) -> FormSession {
        let controller = CompressionRequestController::new(self.transport.clone(), ENDPOINT, self.registry.clone());
        FormSession::new(
            controller,
            self.provider(),
            self.transport.clone(),
            ClipboardPublisher::new(self.clipboard.clone()),
        )
    }
}
