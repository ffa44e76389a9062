//! 事件处理
//!
//! 轮询 crossterm 键盘事件：Esc / Ctrl+C / Ctrl+Q 退出，Ctrl+L 开新会话，
//! 其余按键交给 run_app 转成输入编辑、提交或滚动。

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use crate::core::Command;

/// 应用事件：退出、已转发的命令，或原始 KeyEvent
#[derive(Debug, Clone)]
pub enum AppEvent {
    Quit,
    Command(Command),
    Key(KeyEvent),
}

/// 事件处理器：持有 cmd_tx，poll 时读键盘并返回 AppEvent
pub struct EventHandler {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl EventHandler {
    pub fn new(cmd_tx: mpsc::UnboundedSender<Command>) -> Self {
        Self { cmd_tx }
    }

    pub fn poll(&self) -> anyhow::Result<Option<AppEvent>> {
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(Some(self.handle_key(key)));
                }
            }
        }
        Ok(None)
    }

    pub fn handle_key(&self, key: KeyEvent) -> AppEvent {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => AppEvent::Quit,
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => AppEvent::Quit,
            KeyCode::Char('l') if ctrl => {
                self.send(Command::NewSession);
                AppEvent::Command(Command::NewSession)
            }
            _ => AppEvent::Key(key),
        }
    }

    pub fn send(&self, cmd: Command) {
        let _ = self.cmd_tx.send(cmd);
    }
}
