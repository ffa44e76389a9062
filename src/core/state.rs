//! 状态定义：对话条目、后端答案与 ChatState 投影
//!
//! UI 只持有 ChatState 快照（条目、输入、阶段、错误）；「当前来源」永远由最新一条 Agent 条目推导，不单独存储。

use serde::{Deserialize, Serialize};

/// 条目来源
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    User,
    Agent,
}

/// 政策片段（后端引用的依据）
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    /// 出处，如「Política 3.2」
    pub fonte: String,
    pub categoria: String,
    /// 场景描述
    pub pergunta: String,
    /// 规定的处理动作
    pub resposta: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScore {
    pub source_id: String,
    pub score: f64,
}

/// POST /chat 的成功响应
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    /// true 表示后端无法以政策为依据，只给出了受限的安全回答
    pub is_fallback: bool,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_scores: Option<Vec<SimilarityScore>>,
}

/// 对话中的一条记录；is_fallback 与 sources 仅对 Agent 条目有意义
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConversationEntry {
    pub origin: Origin,
    pub content: String,
    pub is_fallback: Option<bool>,
    pub sources: Option<Vec<Source>>,
}

impl ConversationEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            origin: Origin::User,
            content: content.into(),
            is_fallback: None,
            sources: None,
        }
    }

    /// 由后端答案构造 Agent 条目
    pub fn agent(answer: Answer) -> Self {
        Self {
            origin: Origin::Agent,
            content: answer.answer,
            is_fallback: Some(answer.is_fallback),
            sources: Some(answer.sources),
        }
    }

    /// 仅 Agent 条目且 is_fallback 为 true 时显示「受限回答」标记
    pub fn shows_fallback(&self) -> bool {
        self.origin == Origin::Agent && self.is_fallback == Some(true)
    }
}

/// 从末尾向前找第一条 Agent 条目，返回其来源；没有则为空
pub fn latest_sources(entries: &[ConversationEntry]) -> &[Source] {
    entries
        .iter()
        .rev()
        .find(|e| e.origin == Origin::Agent)
        .and_then(|e| e.sources.as_deref())
        .unwrap_or(&[])
}

/// 会话阶段：Idle → Submitting → Idle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
}

/// UI 看到的「投影」状态，每次状态变化时由 Orchestrator 发布
#[derive(Clone, Debug, Default, Serialize)]
pub struct ChatState {
    pub session_id: u64,
    pub entries: Vec<ConversationEntry>,
    /// 待提交的输入
    pub input: String,
    pub phase: Phase,
    pub error: Option<String>,
}

impl ChatState {
    pub fn in_flight(&self) -> bool {
        self.phase == Phase::Submitting
    }

    pub fn latest_sources(&self) -> &[Source] {
        latest_sources(&self.entries)
    }
}
