//! TUI 层：Ratatui + crossterm，主循环（app）、事件（event）、整帧渲染（render），
//! 以及两个纯渲染器：单条消息（message）与来源面板（sources）

pub mod app;
pub mod event;
pub mod message;
pub mod render;
pub mod sources;
pub mod text;

pub use app::run_app;
pub use event::EventHandler;
pub use message::message_lines;
pub use render::{draw, BackendStatus, Chrome};
pub use sources::{source_lines, sources_panel_lines};
pub use text::lines_to_plain;
