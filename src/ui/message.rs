//! 单条对话渲染（纯函数，无状态）
//!
//! 首行为显示名；Agent 的 fallback 回答在显示名后追加「Resposta limitada」标记；正文按宽度换行并缩进。

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::config::UiSection;
use crate::core::{ConversationEntry, Origin};
use crate::ui::text::wrap_text;

/// 受限回答标记
pub const FALLBACK_BADGE: &str = "Resposta limitada";

const INDENT: &str = "  ";

pub fn message_lines(entry: &ConversationEntry, labels: &UiSection, width: usize) -> Vec<Line<'static>> {
    let (label, color) = match entry.origin {
        Origin::User => (labels.user_label.clone(), Color::Cyan),
        Origin::Agent => (labels.agent_label.clone(), Color::Green),
    };

    let mut header = vec![Span::styled(
        label,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )];
    if entry.shows_fallback() {
        header.push(Span::raw(" "));
        header.push(Span::styled(
            format!(" {} ", FALLBACK_BADGE),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let mut lines = vec![Line::from(header)];
    let body_width = width.saturating_sub(INDENT.len()).max(1);
    for text in wrap_text(&entry.content, body_width) {
        lines.push(Line::from(vec![Span::raw(INDENT), Span::raw(text)]));
    }
    lines
}
