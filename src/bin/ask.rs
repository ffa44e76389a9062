//! refunds-ask - 单次提问：refunds-ask "pergunta do cliente"
//!
//! 不进入 TUI，直接输出回答与来源的纯文本；请求失败时退出码为 1。

use std::path::PathBuf;

use anyhow::Context;
use refunds_chat::{
    api::create_api_from_config,
    config::{load_config, AppConfig},
    core::ask_once,
    observability,
    ui::{lines_to_plain, message_lines, source_lines},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let question = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if question.trim().is_empty() {
        eprintln!("Uso: refunds-ask \"pergunta do cliente\"");
        std::process::exit(2);
    }

    let config_path = std::env::var("REFUNDS_CONFIG").ok().map(PathBuf::from);
    let cfg = load_config(config_path).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });
    let api = create_api_from_config(&cfg.api).context("Failed to create API client")?;

    let state = ask_once(api.as_ref(), &question)
        .await
        .context("Question rejected")?;

    const WIDTH: usize = 100;
    for entry in &state.entries {
        println!("{}\n", lines_to_plain(&message_lines(entry, &cfg.ui, WIDTH)));
    }
    if let Some(err) = &state.error {
        eprintln!("{}", err);
        std::process::exit(1);
    }
    println!("Fontes aplicadas:");
    println!("{}", lines_to_plain(&source_lines(state.latest_sources(), WIDTH)));
    Ok(())
}
