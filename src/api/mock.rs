//! Mock 客户端（测试与离线模式，无需后端）
//!
//! 按队列依次返回预设结果并记录收到的问题；队列为空时返回离线 fallback 答案。
//! 可选「闸门」让请求保持在途，直到测试放行。

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::api::AgentApi;
use crate::core::{Answer, ApiError};

/// 离线模式下的回答
pub const OFFLINE_ANSWER: &str =
    "Backend indisponível (modo offline). Consulte a política vigente antes de decidir.";

#[derive(Debug, Default)]
pub struct MockAgentClient {
    replies: Mutex<VecDeque<Result<Answer, ApiError>>>,
    calls: Mutex<Vec<String>>,
    gate: Option<Arc<Semaphore>>,
}

impl MockAgentClient {
    /// 离线客户端：每个问题都得到 fallback 答案
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn scripted(replies: impl IntoIterator<Item = Result<Answer, ApiError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        }
    }

    /// 每个请求需从闸门拿到一个许可才会返回；返回的 Semaphore 用 add_permits 放行
    pub fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(gate.clone());
        (self, gate)
    }

    /// 已收到的问题（按调用顺序）
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn offline_answer() -> Answer {
        Answer {
            answer: OFFLINE_ANSWER.to_string(),
            is_fallback: true,
            sources: Vec::new(),
            similarity_scores: None,
        }
    }
}

#[async_trait]
impl AgentApi for MockAgentClient {
    async fn ask_agent(&self, question: &str) -> Result<Answer, ApiError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(question.to_string());
        }
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| ApiError::Transport(e.to_string()))?
                .forget();
        }
        let next = self.replies.lock().ok().and_then(|mut r| r.pop_front());
        next.unwrap_or_else(|| Ok(Self::offline_answer()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_replies_in_order() {
        let mock = MockAgentClient::scripted(vec![
            Err(ApiError::Timeout),
            Ok(Answer {
                answer: "segunda".to_string(),
                is_fallback: false,
                sources: vec![],
                similarity_scores: None,
            }),
        ]);
        assert_eq!(mock.ask_agent("a").await, Err(ApiError::Timeout));
        assert_eq!(mock.ask_agent("b").await.unwrap().answer, "segunda");
        assert_eq!(mock.calls(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_offline_answers_with_fallback() {
        let mock = MockAgentClient::offline();
        let answer = mock.ask_agent("qualquer").await.unwrap();
        assert!(answer.is_fallback);
        assert!(answer.sources.is_empty());
        assert!(mock.health().await.is_ok());
    }

    #[tokio::test]
    async fn test_gate_holds_request() {
        let (mock, gate) = MockAgentClient::offline().gated();
        let mock = Arc::new(mock);
        let task = {
            let mock = mock.clone();
            tokio::spawn(async move { mock.ask_agent("q").await })
        };
        tokio::task::yield_now().await;
        assert!(!task.is_finished());

        gate.add_permits(1);
        assert!(task.await.unwrap().is_ok());
    }
}
