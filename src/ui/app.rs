//! TUI 应用主循环
//!
//! 进入全屏/原始模式，轮询 state_rx 与键盘事件，将按键转为 Command 发送给会话驱动，
//! 每帧用 draw 渲染 ChatState。输入框内容也在会话状态里，UI 不另存缓冲。

use std::io::{self, Stdout};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::{mpsc, watch};

use crate::core::{ChatState, Command, InputEdit};
use crate::ui::event::{AppEvent, EventHandler};
use crate::ui::render::{draw, Chrome};

/// 单个按键的处理结果
#[derive(Debug, PartialEq, Eq)]
enum KeyOutcome {
    Send(Command),
    Handled,
}

fn handle_key(key: KeyEvent, scroll: &mut usize) -> KeyOutcome {
    match key.code {
        // 在途拦截与退出指令都由会话驱动判断
        KeyCode::Enter => KeyOutcome::Send(Command::Submit),
        KeyCode::Backspace => KeyOutcome::Send(Command::Edit(InputEdit::Backspace)),
        // 未绑定的 Ctrl/Alt 组合键不输入字符
        KeyCode::Char(_) if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            KeyOutcome::Handled
        }
        KeyCode::Char(c) => KeyOutcome::Send(Command::Edit(InputEdit::Insert(c))),
        KeyCode::Up => {
            *scroll = scroll.saturating_sub(1);
            KeyOutcome::Handled
        }
        KeyCode::Down => {
            *scroll = scroll.saturating_add(1);
            KeyOutcome::Handled
        }
        KeyCode::PageUp => {
            *scroll = scroll.saturating_sub(10);
            KeyOutcome::Handled
        }
        KeyCode::PageDown => {
            *scroll = scroll.saturating_add(10);
            KeyOutcome::Handled
        }
        KeyCode::Home => {
            *scroll = 0;
            KeyOutcome::Handled
        }
        KeyCode::End => {
            *scroll = usize::MAX;
            KeyOutcome::Handled
        }
        _ => KeyOutcome::Handled,
    }
}

/// 运行 TUI：启用原始模式与全屏，循环 poll 事件 + 渲染，退出时恢复终端
pub async fn run_app(
    state_rx: watch::Receiver<ChatState>,
    cmd_tx: mpsc::UnboundedSender<Command>,
    chrome: Chrome,
) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, state_rx, cmd_tx, &chrome).await;

    restore_terminal(&mut terminal)?;
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state_rx: watch::Receiver<ChatState>,
    cmd_tx: mpsc::UnboundedSender<Command>,
    chrome: &Chrome,
) -> anyhow::Result<()> {
    let event_handler = EventHandler::new(cmd_tx);
    let mut conversation_scroll = 0usize;
    let mut last_len = 0usize;
    let mut last_session = 0u64;

    loop {
        if let Some(ev) = event_handler.poll()? {
            match ev {
                AppEvent::Quit => {
                    event_handler.send(Command::Quit);
                    break;
                }
                AppEvent::Command(_) => {}
                AppEvent::Key(key) => match handle_key(key, &mut conversation_scroll) {
                    KeyOutcome::Send(cmd) => event_handler.send(cmd),
                    KeyOutcome::Handled => {}
                },
            }
        }

        // 让会话驱动先处理刚发出的命令，再取快照绘制
        tokio::task::yield_now().await;
        // 会话驱动已结束（如提交了 /sair）
        if state_rx.has_changed().is_err() {
            break;
        }
        let state = state_rx.borrow().clone();

        // 新消息或新会话：滚到底部
        let len = state.entries.len() + usize::from(state.in_flight()) + usize::from(state.error.is_some());
        if len != last_len || state.session_id != last_session {
            last_len = len;
            last_session = state.session_id;
            conversation_scroll = usize::MAX;
        }

        let mut scroll_info = (0usize, 0usize);
        terminal.draw(|f| {
            draw(f, &state, chrome, conversation_scroll, &mut scroll_info);
        })?;
        let (total_lines, viewport_height) = scroll_info;
        let max_scroll = total_lines.saturating_sub(viewport_height);
        conversation_scroll = conversation_scroll.min(max_scroll);
    }

    Ok(())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_and_enter_become_commands() {
        let mut scroll = 0;
        assert_eq!(
            handle_key(key(KeyCode::Char('a')), &mut scroll),
            KeyOutcome::Send(Command::Edit(InputEdit::Insert('a')))
        );
        assert_eq!(
            handle_key(key(KeyCode::Backspace), &mut scroll),
            KeyOutcome::Send(Command::Edit(InputEdit::Backspace))
        );
        assert_eq!(
            handle_key(key(KeyCode::Enter), &mut scroll),
            KeyOutcome::Send(Command::Submit)
        );
    }

    #[test]
    fn test_ctrl_and_alt_letters_are_not_typed() {
        let mut scroll = 0;
        for modifiers in [KeyModifiers::CONTROL, KeyModifiers::ALT] {
            assert_eq!(
                handle_key(KeyEvent::new(KeyCode::Char('a'), modifiers), &mut scroll),
                KeyOutcome::Handled
            );
        }
        assert_eq!(
            handle_key(KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT), &mut scroll),
            KeyOutcome::Send(Command::Edit(InputEdit::Insert('A')))
        );
    }

    #[test]
    fn test_scroll_keys() {
        let mut scroll = 5;
        handle_key(key(KeyCode::Up), &mut scroll);
        assert_eq!(scroll, 4);
        handle_key(key(KeyCode::PageUp), &mut scroll);
        assert_eq!(scroll, 0);
        handle_key(key(KeyCode::End), &mut scroll);
        assert_eq!(scroll, usize::MAX);
        handle_key(key(KeyCode::Down), &mut scroll);
        assert_eq!(scroll, usize::MAX);
    }
}
