//! 政策后端客户端抽象
//!
//! 所有实现（HTTP / Mock）实现 AgentApi：ask_agent 发送一个问题，health 探测后端可达性。
//! 不重试、不缓存，每次调用都是独立请求；trim 由编排器负责。

use async_trait::async_trait;

use crate::core::{Answer, ApiError};

#[async_trait]
pub trait AgentApi: Send + Sync {
    /// 向后端提问，返回结构化答案
    async fn ask_agent(&self, question: &str) -> Result<Answer, ApiError>;

    /// 后端健康检查，默认视为可达
    async fn health(&self) -> Result<(), ApiError> {
        Ok(())
    }
}
