//! 界面渲染
//!
//! 根据 ChatState 绘制：标题栏（应用名、后端状态、阶段），左侧对话区（消息 + 查询中提示 + 错误），
//! 右侧「Fontes aplicadas」面板，底部输入框与快捷键提示。

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame,
};

use crate::config::UiSection;
use crate::core::{ChatState, Phase};
use crate::ui::message::message_lines;
use crate::ui::sources::sources_panel_lines;

/// 请求在途时对话区底部的提示
pub const LOADING: &str = "Consultando políticas…";

/// 启动时探测到的后端状态
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendStatus {
    Online,
    Unreachable,
    /// 离线模式，使用本地 Mock
    Offline,
}

impl BackendStatus {
    fn label(self) -> (&'static str, Color) {
        match self {
            BackendStatus::Online => ("backend ok", Color::Green),
            BackendStatus::Unreachable => ("backend indisponível", Color::Red),
            BackendStatus::Offline => ("modo offline", Color::Yellow),
        }
    }
}

/// 与会话状态无关、启动时确定的界面信息
#[derive(Clone, Debug)]
pub struct Chrome {
    pub app_name: String,
    pub labels: UiSection,
    pub backend: BackendStatus,
}

/// 对话区全部行：消息之间空一行，在途时追加查询提示，出错时追加红色错误
pub fn conversation_lines(state: &ChatState, labels: &UiSection, width: usize) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    for (idx, entry) in state.entries.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::from(""));
        }
        lines.extend(message_lines(entry, labels, width));
    }
    if state.in_flight() {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            LOADING,
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }
    if let Some(err) = &state.error {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }
    lines
}

/// 单行输入框的可见部分：超宽时只显示末尾，光标留在最后一列之后；返回 (可见文本, 光标列)
pub fn visible_input(input: &str, width: usize) -> (String, u16) {
    if width == 0 {
        return (String::new(), 0);
    }
    let len = input.chars().count();
    // 留一列给光标
    let skip = (len + 1).saturating_sub(width);
    let visible: String = input.chars().skip(skip).collect();
    let cursor = visible.chars().count().min(width - 1);
    (visible, cursor as u16)
}

/// 绘制一帧；将 (总行数, 可视高度) 写入 out 供外部 clamp 滚动
pub fn draw(
    f: &mut Frame,
    state: &ChatState,
    chrome: &Chrome,
    conversation_scroll: usize,
    out: &mut (usize, usize),
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(f.area());

    // 标题栏
    let (backend_str, backend_color) = chrome.backend.label();
    let phase_str = match state.phase {
        Phase::Idle => "pronto",
        Phase::Submitting => "consultando…",
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            chrome.app_name.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  │ "),
        Span::styled(backend_str, Style::default().fg(backend_color)),
        Span::raw(" │ "),
        Span::raw(phase_str),
    ]))
    .block(
        Block::default()
            .title(" Reembolsos · cancelamentos · cobrança ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    f.render_widget(header, rows[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(rows[1]);

    // 对话区
    let conv_area = body[0];
    let content_width = conv_area.width.saturating_sub(2).saturating_sub(1) as usize; // 边框 + 滚动条
    let text_lines = conversation_lines(state, &chrome.labels, content_width);

    let content_height = conv_area.height.saturating_sub(2) as usize;
    let total_lines = text_lines.len();
    let max_scroll = total_lines.saturating_sub(content_height);
    let scroll_offset = conversation_scroll.min(max_scroll);

    let conv_block = Block::default()
        .title(" Conversa ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = conv_block.inner(conv_area);
    let conversation = Paragraph::new(Text::from(text_lines))
        .block(conv_block)
        .scroll((scroll_offset as u16, 0));
    f.render_widget(conversation, conv_area);

    if total_lines > content_height {
        let mut scrollbar_state = ScrollbarState::new(total_lines)
            .position(scroll_offset)
            .viewport_content_length(content_height);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .thumb_symbol("█")
            .track_symbol(Some("░"));
        f.render_stateful_widget(scrollbar, inner, &mut scrollbar_state);
    }

    // 来源面板
    let sources_area = body[1];
    let sources_width = sources_area.width.saturating_sub(2) as usize;
    let sources = Paragraph::new(Text::from(sources_panel_lines(state, sources_width)))
        .block(
            Block::default()
                .title(" Fontes aplicadas ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Magenta)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(sources, sources_area);

    // 输入区
    let (input_title, border_color) = if state.error.is_some() {
        (" Pergunta · erro ", Color::Red)
    } else if state.in_flight() {
        (" Pergunta · aguardando resposta… ", Color::DarkGray)
    } else {
        (" Pergunta ", Color::Blue)
    };
    let hint = " Enter perguntar │ ↑↓ PgUp/PgDn rolar │ Ctrl+L nova sessão │ Esc/Ctrl+Q sair ";
    let input_block = Block::default()
        .title(input_title)
        .title_bottom(Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let input_inner = input_block.inner(rows[2]);
    let (visible, cursor_col) = visible_input(&state.input, input_inner.width as usize);
    let input = if state.input.is_empty() {
        Paragraph::new(Span::styled(
            "Digite a pergunta do cliente",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Paragraph::new(visible)
    };
    f.render_widget(input.block(input_block), rows[2]);
    if input_inner.width > 0 && input_inner.height > 0 {
        f.set_cursor_position((input_inner.x + cursor_col, input_inner.y));
    }

    out.0 = total_lines;
    out.1 = content_height;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Answer, ConversationEntry, REQUEST_FAILED_MESSAGE};
    use crate::ui::text::lines_to_plain;
    use ratatui::{backend::TestBackend, Terminal};

    fn chrome() -> Chrome {
        Chrome {
            app_name: "iFood GenAI Refunds Agent".to_string(),
            labels: UiSection::default(),
            backend: BackendStatus::Online,
        }
    }

    #[test]
    fn test_conversation_shows_loading_while_in_flight() {
        let state = ChatState {
            entries: vec![ConversationEntry::user("oi")],
            phase: Phase::Submitting,
            ..ChatState::default()
        };
        let text = lines_to_plain(&conversation_lines(&state, &UiSection::default(), 60));
        assert!(text.ends_with(LOADING));
    }

    #[test]
    fn test_conversation_shows_error() {
        let state = ChatState {
            entries: vec![ConversationEntry::user("oi")],
            error: Some(REQUEST_FAILED_MESSAGE.to_string()),
            ..ChatState::default()
        };
        let text = lines_to_plain(&conversation_lines(&state, &UiSection::default(), 60));
        assert!(text.contains("Você"));
        assert!(text.ends_with(REQUEST_FAILED_MESSAGE));
        assert!(!text.contains(LOADING));
    }

    #[test]
    fn test_visible_input_keeps_tail() {
        assert_eq!(visible_input("oi", 10), ("oi".to_string(), 2));
        assert_eq!(visible_input("abcdef", 4), ("def".to_string(), 3));
        assert_eq!(visible_input("ação", 3), ("ão".to_string(), 2));
        assert_eq!(visible_input("x", 0), (String::new(), 0));
    }

    #[test]
    fn test_long_question_shows_its_end() {
        let input = format!("{}FIMDAPERGUNTA", "Cliente pediu reembolso do pedido ".repeat(4));
        assert!(input.chars().count() > 80);
        let state = ChatState {
            input: input.clone(),
            ..ChatState::default()
        };
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        let mut out = (0usize, 0usize);
        terminal
            .draw(|f| draw(f, &state, &chrome(), 0, &mut out))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let screen: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(screen.contains("FIMDAPERGUNTA"));

        // 输入框第一行文字位于倒数第二行（边框内）
        let cursor = terminal.get_cursor_position().unwrap();
        assert_eq!(cursor.y, 18);
        assert_eq!(cursor.x, 1 + 77);
    }

    #[test]
    fn test_draw_full_frame() {
        let state = ChatState {
            entries: vec![
                ConversationEntry::user("Cliente quer reembolso"),
                ConversationEntry::agent(Answer {
                    answer: "Resposta".to_string(),
                    is_fallback: true,
                    sources: vec![],
                    similarity_scores: None,
                }),
            ],
            ..ChatState::default()
        };
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let mut out = (0usize, 0usize);
        terminal
            .draw(|f| draw(f, &state, &chrome(), 0, &mut out))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let screen: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(screen.contains("Resposta limitada"));
        assert!(screen.contains("Nenhuma fonte aplicada."));
        assert!(screen.contains("Fontes aplicadas"));
        assert!(out.0 >= 4);
        assert_eq!(out.1, 30 - 3 - 3 - 2);
    }
}
