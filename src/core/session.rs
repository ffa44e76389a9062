//! 会话驱动：后台任务持有 Orchestrator，消费 UI 命令与请求结果
//!
//! 两通道：UI -> Core 命令（mpsc）；Core -> UI 状态快照（watch）。
//! 后端调用在独立任务中执行，结果带票据回送；会话结束后回送失败或票据过期，结果被丢弃。

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::AgentApi;
use crate::core::orchestrator::{InputEdit, Orchestrator, PendingRequest, RequestTicket};
use crate::core::{Answer, ApiError, ChatState, SubmitRejected};

/// 从 UI 发往会话驱动的命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 编辑输入框
    Edit(InputEdit),
    /// 提交当前输入框内容（Enter）
    Submit,
    /// 直接提交一段文本（等价于 submit(raw_text)）
    Ask(String),
    /// 丢弃当前会话，开始新会话（Ctrl+L）
    NewSession,
    /// 退出
    Quit,
}

type Resolution = (RequestTicket, Result<Answer, ApiError>);

/// 在输入框中提交即结束会话的指令
const EXIT_WORDS: &[&str] = &["/sair", "/exit", "/quit"];

/// 输入是否为退出指令（忽略首尾空白与大小写）
fn is_exit_word(input: &str) -> bool {
    EXIT_WORDS.contains(&input.trim().to_lowercase().as_str())
}

/// 运行中的会话句柄
pub struct ChatSession {
    cmd_tx: mpsc::UnboundedSender<Command>,
    state_rx: watch::Receiver<ChatState>,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

impl ChatSession {
    /// 启动会话驱动任务（需在 tokio 运行时内调用）
    pub fn spawn(api: Arc<dyn AgentApi>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<Command>();
        let (state_tx, state_rx) = watch::channel(ChatState::default());
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(drive(api, cmd_rx, state_tx, shutdown.clone()));
        Self {
            cmd_tx,
            state_rx,
            shutdown,
            task,
        }
    }

    pub fn commands(&self) -> mpsc::UnboundedSender<Command> {
        self.cmd_tx.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        self.state_rx.clone()
    }

    pub fn send(&self, cmd: Command) {
        let _ = self.cmd_tx.send(cmd);
    }

    /// 结束会话并等待驱动任务退出；在途请求被放弃
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(e) = self.task.await {
            tracing::warn!("Session task ended abnormally: {}", e);
        }
    }
}

async fn drive(
    api: Arc<dyn AgentApi>,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    state_tx: watch::Sender<ChatState>,
    shutdown: CancellationToken,
) {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Resolution>();
    let mut session_id = 1u64;
    let mut orchestrator = Orchestrator::new(session_id, state_tx.clone());
    tracing::info!(session = session_id, "Session started");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            Some((ticket, result)) = done_rx.recv() => {
                orchestrator.resolve(ticket, result);
            }
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(Command::Edit(edit)) => orchestrator.edit_input(edit),
                    // 按驱动内的输入判断，不依赖 UI 手里可能过期的副本
                    Some(Command::Submit) if is_exit_word(orchestrator.input()) => break,
                    Some(Command::Submit) => {
                        let submitted = orchestrator.submit_input();
                        dispatch(&api, &done_tx, submitted);
                    }
                    Some(Command::Ask(text)) => {
                        let submitted = orchestrator.begin_submit(&text);
                        dispatch(&api, &done_tx, submitted);
                    }
                    Some(Command::NewSession) => {
                        orchestrator.close();
                        session_id += 1;
                        orchestrator = Orchestrator::new(session_id, state_tx.clone());
                        tracing::info!(session = session_id, "Session started");
                    }
                    Some(Command::Quit) | None => break,
                }
            }
        }
    }

    orchestrator.close();
    tracing::info!(session = session_id, "Session ended");
}

/// 为已登记的提交启动后端调用；被拒的提交只记日志
fn dispatch(
    api: &Arc<dyn AgentApi>,
    done_tx: &mpsc::UnboundedSender<Resolution>,
    submitted: Result<PendingRequest, SubmitRejected>,
) {
    match submitted {
        Ok(pending) => {
            let api = api.clone();
            let done_tx = done_tx.clone();
            tokio::spawn(async move {
                let result = api.ask_agent(&pending.question).await;
                // 驱动已退出时发送失败，结果随之丢弃
                let _ = done_tx.send((pending.ticket, result));
            });
        }
        Err(SubmitRejected::Empty) => {}
        Err(reason) => tracing::debug!("Submit ignored: {}", reason),
    }
}

/// 不启动驱动任务，直接完成一次问答（单次命令行模式）
pub async fn ask_once(api: &dyn AgentApi, question: &str) -> Result<ChatState, SubmitRejected> {
    let (state_tx, _state_rx) = watch::channel(ChatState::default());
    let mut orchestrator = Orchestrator::new(1, state_tx);
    let pending = orchestrator.begin_submit(question)?;
    let result = api.ask_agent(&pending.question).await;
    orchestrator.resolve(pending.ticket, result);
    Ok(orchestrator.snapshot())
}
