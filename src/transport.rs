//! # HTTP 传输层
//!
//! ## 设计思路
//!
//! 压缩提交、每日图片拉取、结果下载三条链路都只依赖一个很窄的 `HttpTransport` 接口：
//! - `post_multipart`：提交 multipart 表单
//! - `get`：普通 GET，返回完整响应体
//!
//! 上层模块通过 `Arc<dyn HttpTransport>` 注入，测试可替换为记录调用的假实现，
//! 从而验证“未发出请求”“只发出一次 POST”等行为。
//!
//! ## 实现思路
//!
//! - `ReqwestTransport` 复用单个 `reqwest::Client`，统一连接/请求超时。
//! - 响应体按块读取后合并为 `Bytes`，状态码与 Content-Type 原样交给调用方解释。
//! - 不做任何自动重试：每次调用只对应一次真实请求。

use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};

/// 传输层错误：请求未能完成（与“服务端返回失败状态”区分）。
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request could not be sent: {0}")]
    Connect(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// multipart 表单字段
#[derive(Debug, Clone, PartialEq)]
pub enum MultipartField {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        mime_type: String,
        bytes: Bytes,
    },
}

/// 与具体 HTTP 库无关的 multipart 表单描述
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    pub fields: Vec<MultipartField>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(MultipartField::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Bytes,
    ) -> Self {
        self.fields.push(MultipartField::File {
            name: name.into(),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        });
        self
    }

    /// 按字段名查找文本字段的值
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|field| match field {
            MultipartField::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }
}

/// 已完整读取的 HTTP 响应
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post_multipart(&self, url: &str, form: MultipartForm) -> Result<HttpResponse, TransportError>;

    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

/// 基于 reqwest 的默认实现
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(connect_timeout: Duration, request_timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| TransportError::InvalidRequest(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    fn build_form(form: MultipartForm) -> Result<reqwest::multipart::Form, TransportError> {
        let mut out = reqwest::multipart::Form::new();
        for field in form.fields {
            out = match field {
                MultipartField::Text { name, value } => out.text(name, value),
                MultipartField::File {
                    name,
                    file_name,
                    mime_type,
                    bytes,
                } => {
                    let part = reqwest::multipart::Part::bytes(bytes.to_vec())
                        .file_name(file_name)
                        .mime_str(&mime_type)
                        .map_err(|e| TransportError::InvalidRequest(format!("invalid MIME type: {}", e)))?;
                    out.part(name, part)
                }
            };
        }
        Ok(out)
    }

    fn map_send_error(err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else {
            TransportError::Connect(err.to_string())
        }
    }

    async fn read_response(mut response: reqwest::Response) -> Result<HttpResponse, TransportError> {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        let mut buffer = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(e.to_string())
            } else {
                TransportError::Body(e.to_string())
            }
        })? {
            buffer.extend_from_slice(&chunk);
        }

        log::debug!("📥 响应读取完成 - 状态: {} 大小: {} bytes", status, buffer.len());

        Ok(HttpResponse {
            status,
            content_type,
            body: buffer.freeze(),
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_multipart(&self, url: &str, form: MultipartForm) -> Result<HttpResponse, TransportError> {
        let form = Self::build_form(form)?;
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(Self::map_send_error)?;
        Self::read_response(response).await
    }

    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(Self::map_send_error)?;
        Self::read_response(response).await
    }
}
