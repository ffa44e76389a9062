//! HTTP 客户端：POST {base_url}/chat、GET {base_url}/health
//!
//! 超时由配置决定；传输错误、超时、非 2xx、响应体无法解析都映射为 ApiError，调用方统一处理。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::api::AgentApi;
use crate::core::{Answer, ApiError};

/// 本地开发默认地址
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    question: &'a str,
}

/// 基于 reqwest 的政策后端客户端
#[derive(Debug, Clone)]
pub struct HttpAgentClient {
    client: Client,
    base_url: String,
}

impl HttpAgentClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("refunds-chat/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl AgentApi for HttpAgentClient {
    async fn ask_agent(&self, question: &str) -> Result<Answer, ApiError> {
        let url = self.endpoint("chat");
        tracing::debug!(%url, "POST chat");
        let resp = self
            .client
            .post(&url)
            .json(&ChatRequest { question })
            .send()
            .await?
            .error_for_status()?;
        let answer = resp.json::<Answer>().await?;
        Ok(answer)
    }

    async fn health(&self) -> Result<(), ApiError> {
        self.client
            .get(self.endpoint("health"))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
