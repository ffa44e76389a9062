//! 来源面板渲染（纯函数，无状态）
//!
//! 按后端给出的顺序逐条显示：出处 · 类别 [· score]，场景，处理动作；空列表显示占位提示。

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::core::{ChatState, Source};
use crate::ui::text::wrap_text;

pub const NO_SOURCES: &str = "Nenhuma fonte aplicada.";
/// 尚无任何对话时的提示
pub const SOURCES_INTRO: &str = "Envie uma pergunta para ver as políticas usadas.";

fn placeholder(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    ))
}

/// 带标签的一段文字，超宽时续行缩进
fn labeled(label: &str, value: &str, width: usize) -> Vec<Line<'static>> {
    let label_width = label.chars().count() + 1;
    let wrapped = wrap_text(value, width.saturating_sub(label_width).max(1));
    wrapped
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let head = if i == 0 {
                Span::styled(
                    format!("{} ", label),
                    Style::default().add_modifier(Modifier::BOLD),
                )
            } else {
                Span::raw(" ".repeat(label_width))
            };
            Line::from(vec![head, Span::raw(text)])
        })
        .collect()
}

pub fn source_lines(sources: &[Source], width: usize) -> Vec<Line<'static>> {
    if sources.is_empty() {
        return vec![placeholder(NO_SOURCES)];
    }

    let mut lines = Vec::new();
    for (idx, source) in sources.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::from(""));
        }
        let mut meta = vec![
            Span::styled(
                source.fonte.clone(),
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" · {}", source.categoria)),
        ];
        if let Some(score) = source.score {
            meta.push(Span::styled(
                format!(" · score {:.2}", score),
                Style::default().fg(Color::DarkGray),
            ));
        }
        lines.push(Line::from(meta));
        lines.extend(labeled("Cenário:", &source.pergunta, width));
        lines.extend(labeled("Ação:", &source.resposta, width));
    }
    lines
}

/// 右侧面板内容：没有任何对话时显示引导语，否则显示最近一条回答的来源
pub fn sources_panel_lines(state: &ChatState, width: usize) -> Vec<Line<'static>> {
    if state.entries.is_empty() {
        return vec![placeholder(SOURCES_INTRO)];
    }
    source_lines(state.latest_sources(), width)
}
