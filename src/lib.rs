//! refunds-chat - 退款/取消/计费政策问答终端
//!
//! 模块划分：
//! - **api**: 政策后端客户端抽象与实现（HTTP / Mock）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 对话状态、编排器状态机、会话驱动
//! - **observability**: tracing 日志初始化
//! - **ui**: Ratatui TUI 界面与消息/来源渲染

pub mod api;
pub mod config;
pub mod core;
pub mod observability;
pub mod ui;

pub use crate::core::{ChatSession, ChatState, Command, Orchestrator};
