//! 对话编排器：会话状态机
//!
//! 持有对话条目、待提交输入、在途请求票据与最近错误；每次状态变化通过 watch 通道发布 ChatState 快照。
//! submit 拆成 begin_submit（同步校验 + 追加用户条目 + 发票据）与 resolve（按票据落地结果）两半，
//! 中间的异步调用由 session 驱动。票据不匹配的结果一律丢弃。

use tokio::sync::watch;

use crate::core::error::{ApiError, SubmitRejected, REQUEST_FAILED_MESSAGE};
use crate::core::state::{latest_sources, Answer, ChatState, ConversationEntry, Phase, Source};

/// 在途请求的标签：所属会话 + 请求代数
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestTicket {
    pub session_id: u64,
    pub generation: u64,
}

/// begin_submit 成功后交给调用方的待发请求
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingRequest {
    pub ticket: RequestTicket,
    /// 已 trim 的问题文本
    pub question: String,
}

/// 输入框编辑操作
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEdit {
    Insert(char),
    Backspace,
    Clear,
    Replace(String),
}

/// 会话级编排器：显式构造、显式关闭，不做全局单例
pub struct Orchestrator {
    session_id: u64,
    entries: Vec<ConversationEntry>,
    input: String,
    in_flight: Option<RequestTicket>,
    generation: u64,
    error: Option<String>,
    closed: bool,
    state_tx: watch::Sender<ChatState>,
}

impl Orchestrator {
    /// 创建新会话并立即发布空状态
    pub fn new(session_id: u64, state_tx: watch::Sender<ChatState>) -> Self {
        let orchestrator = Self {
            session_id,
            entries: Vec::new(),
            input: String::new(),
            in_flight: None,
            generation: 0,
            error: None,
            closed: false,
            state_tx,
        };
        orchestrator.publish();
        orchestrator
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn phase(&self) -> Phase {
        if self.in_flight.is_some() {
            Phase::Submitting
        } else {
            Phase::Idle
        }
    }

    /// 最近一条 Agent 回答的来源
    pub fn latest_sources(&self) -> &[Source] {
        latest_sources(&self.entries)
    }

    pub fn snapshot(&self) -> ChatState {
        ChatState {
            session_id: self.session_id,
            entries: self.entries.clone(),
            input: self.input.clone(),
            phase: self.phase(),
            error: self.error.clone(),
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.snapshot());
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.publish();
    }

    /// 在途期间也允许编辑输入，只拦截提交
    pub fn edit_input(&mut self, edit: InputEdit) {
        match edit {
            InputEdit::Insert(c) => self.input.push(c),
            InputEdit::Backspace => {
                self.input.pop();
            }
            InputEdit::Clear => self.input.clear(),
            InputEdit::Replace(text) => self.input = text,
        }
        self.publish();
    }

    /// 提交当前输入框内容
    pub fn submit_input(&mut self) -> Result<PendingRequest, SubmitRejected> {
        let raw = self.input.clone();
        self.begin_submit(&raw)
    }

    /// 校验并登记一次提交：清错误 → 追加用户条目 → 标记在途 → 清空输入 → 返回待发请求
    pub fn begin_submit(&mut self, raw_text: &str) -> Result<PendingRequest, SubmitRejected> {
        if self.closed {
            return Err(SubmitRejected::Closed);
        }
        let question = raw_text.trim();
        if question.is_empty() {
            return Err(SubmitRejected::Empty);
        }
        if self.in_flight.is_some() {
            tracing::debug!(session = self.session_id, "Submit rejected: request in flight");
            return Err(SubmitRejected::Busy);
        }

        self.error = None;
        self.entries.push(ConversationEntry::user(question));
        self.generation += 1;
        let ticket = RequestTicket {
            session_id: self.session_id,
            generation: self.generation,
        };
        self.in_flight = Some(ticket);
        self.input.clear();
        self.publish();

        tracing::info!(
            session = self.session_id,
            generation = ticket.generation,
            "Question submitted"
        );
        Ok(PendingRequest {
            ticket,
            question: question.to_string(),
        })
    }

    /// 落地一次请求结果；票据过期（新请求、其它会话、会话已关闭）时忽略并返回 false
    pub fn resolve(&mut self, ticket: RequestTicket, result: Result<Answer, ApiError>) -> bool {
        if self.closed || self.in_flight != Some(ticket) {
            tracing::debug!(
                session = self.session_id,
                ticket_session = ticket.session_id,
                generation = ticket.generation,
                "Ignoring stale response"
            );
            return false;
        }

        match result {
            Ok(answer) => {
                tracing::info!(
                    generation = ticket.generation,
                    is_fallback = answer.is_fallback,
                    sources = answer.sources.len(),
                    "Answer received"
                );
                self.entries.push(ConversationEntry::agent(answer));
            }
            Err(e) => {
                tracing::warn!(generation = ticket.generation, "Request failed: {}", e);
                self.error = Some(REQUEST_FAILED_MESSAGE.to_string());
            }
        }
        self.in_flight = None;
        self.publish();
        true
    }

    /// 结束会话：之后的结果全部丢弃，提交被拒
    pub fn close(&mut self) {
        self.closed = true;
        self.in_flight = None;
        self.publish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::Origin;

    fn new_orchestrator() -> (Orchestrator, watch::Receiver<ChatState>) {
        let (tx, rx) = watch::channel(ChatState::default());
        (Orchestrator::new(1, tx), rx)
    }

    fn scenario_a_answer() -> Answer {
        Answer {
            answer: "Resposta baseada em política simulada".to_string(),
            is_fallback: false,
            sources: vec![Source {
                id: "1".to_string(),
                fonte: "Política 3.2".to_string(),
                categoria: "reembolso".to_string(),
                pergunta: "Quando o cliente tem direito?".to_string(),
                resposta: "Sempre que falha do restaurante".to_string(),
                score: None,
            }],
            similarity_scores: None,
        }
    }

    #[test]
    fn test_whitespace_submit_is_noop() {
        let (mut orch, mut rx) = new_orchestrator();
        rx.borrow_and_update();
        for raw in ["", "   ", "\n\t  "] {
            assert_eq!(orch.begin_submit(raw), Err(SubmitRejected::Empty));
        }
        assert!(orch.entries().is_empty());
        assert!(!orch.in_flight());
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_submit_appends_trimmed_user_entry_before_resolution() {
        let (mut orch, rx) = new_orchestrator();
        orch.set_input("  Cliente quer reembolso  ");
        let pending = orch.submit_input().unwrap();

        assert_eq!(pending.question, "Cliente quer reembolso");
        assert_eq!(orch.entries().len(), 1);
        assert_eq!(orch.entries()[0].origin, Origin::User);
        assert_eq!(orch.entries()[0].content, "Cliente quer reembolso");
        assert!(orch.in_flight());
        assert_eq!(orch.input(), "");

        let state = rx.borrow();
        assert_eq!(state.phase, Phase::Submitting);
        assert_eq!(state.entries.len(), 1);
    }

    #[test]
    fn test_submit_clears_previous_error() {
        let (mut orch, _rx) = new_orchestrator();
        let p = orch.begin_submit("primeira").unwrap();
        orch.resolve(p.ticket, Err(ApiError::Timeout));
        assert!(orch.error().is_some());

        orch.begin_submit("segunda").unwrap();
        assert!(orch.error().is_none());
    }

    #[test]
    fn test_second_submit_rejected_while_in_flight() {
        let (mut orch, _rx) = new_orchestrator();
        orch.begin_submit("primeira").unwrap();
        orch.set_input("segunda");
        assert_eq!(orch.submit_input(), Err(SubmitRejected::Busy));
        assert_eq!(orch.begin_submit("terceira"), Err(SubmitRejected::Busy));
        assert_eq!(orch.entries().len(), 1);
        assert_eq!(orch.input(), "segunda");
    }

    #[test]
    fn test_success_appends_agent_entry() {
        let (mut orch, rx) = new_orchestrator();
        let p = orch.begin_submit("Cliente quer reembolso").unwrap();
        assert!(orch.resolve(p.ticket, Ok(scenario_a_answer())));

        assert_eq!(orch.entries().len(), 2);
        let agent = &orch.entries()[1];
        assert_eq!(agent.origin, Origin::Agent);
        assert_eq!(agent.content, "Resposta baseada em política simulada");
        assert_eq!(agent.is_fallback, Some(false));
        assert_eq!(orch.latest_sources(), agent.sources.as_deref().unwrap());
        assert!(orch.error().is_none());
        assert!(!orch.in_flight());
        assert_eq!(rx.borrow().phase, Phase::Idle);
    }

    #[test]
    fn test_failure_keeps_user_entry_and_records_error() {
        let (mut orch, rx) = new_orchestrator();
        let p = orch.begin_submit("Pergunta").unwrap();
        assert!(orch.resolve(p.ticket, Err(ApiError::Status { status: 500 })));

        assert_eq!(orch.entries().len(), 1);
        assert_eq!(orch.error(), Some(REQUEST_FAILED_MESSAGE));
        assert!(!orch.in_flight());
        assert_eq!(rx.borrow().error.as_deref(), Some(REQUEST_FAILED_MESSAGE));
    }

    #[test]
    fn test_stale_ticket_is_ignored() {
        let (mut orch, _rx) = new_orchestrator();
        let first = orch.begin_submit("um").unwrap();
        assert!(orch.resolve(first.ticket, Err(ApiError::Timeout)));
        let second = orch.begin_submit("dois").unwrap();

        // 第一个请求的迟到结果
        assert!(!orch.resolve(first.ticket, Ok(scenario_a_answer())));
        assert_eq!(orch.entries().len(), 2);
        assert!(orch.in_flight());

        assert!(orch.resolve(second.ticket, Ok(scenario_a_answer())));
        assert_eq!(orch.entries().len(), 3);
    }

    #[test]
    fn test_ticket_from_other_session_is_ignored() {
        let (mut orch, _rx) = new_orchestrator();
        let p = orch.begin_submit("um").unwrap();
        let foreign = RequestTicket {
            session_id: 99,
            generation: p.ticket.generation,
        };
        assert!(!orch.resolve(foreign, Ok(scenario_a_answer())));
        assert!(orch.in_flight());
    }

    #[test]
    fn test_closed_session_ignores_results_and_submits() {
        let (mut orch, _rx) = new_orchestrator();
        let p = orch.begin_submit("um").unwrap();
        orch.close();
        assert!(!orch.resolve(p.ticket, Ok(scenario_a_answer())));
        assert_eq!(orch.entries().len(), 1);
        assert_eq!(orch.begin_submit("dois"), Err(SubmitRejected::Closed));
    }

    #[test]
    fn test_edit_input_allowed_while_in_flight() {
        let (mut orch, _rx) = new_orchestrator();
        orch.begin_submit("um").unwrap();
        orch.edit_input(InputEdit::Insert('o'));
        orch.edit_input(InputEdit::Insert('i'));
        orch.edit_input(InputEdit::Insert('!'));
        orch.edit_input(InputEdit::Backspace);
        assert_eq!(orch.input(), "oi");
        orch.edit_input(InputEdit::Replace("nova".to_string()));
        assert_eq!(orch.input(), "nova");
        orch.edit_input(InputEdit::Clear);
        assert_eq!(orch.input(), "");
    }

    #[test]
    fn test_each_change_notifies_observer() {
        let (mut orch, mut rx) = new_orchestrator();
        rx.borrow_and_update();

        let p = orch.begin_submit("um").unwrap();
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        orch.resolve(p.ticket, Ok(scenario_a_answer()));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().entries.len(), 2);
    }
}
