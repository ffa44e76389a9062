//! refunds-chat - 政策问答 TUI
//!
//! 入口：加载配置、初始化日志（写文件）、创建后端客户端并探测健康、启动会话驱动与 TUI 主循环。

use std::path::PathBuf;

use anyhow::Context;
use refunds_chat::{
    api::{create_api_from_config, check_health, HEALTH_TIMEOUT},
    config::{load_config, AppConfig},
    observability,
    ui::{run_app, BackendStatus, Chrome},
    ChatSession,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var("REFUNDS_CONFIG").ok().map(PathBuf::from);
    let cfg = load_config(config_path);

    // 日志先于 TUI 初始化；配置加载失败时仍用默认日志文件
    let log_file = cfg
        .as_ref()
        .map(|c| c.log.file.clone())
        .unwrap_or_else(|_| AppConfig::default().log.file);
    observability::init_file(&log_file)?;

    let cfg = cfg.unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });

    let api = create_api_from_config(&cfg.api).context("Failed to create API client")?;
    let backend = if cfg.api.offline {
        BackendStatus::Offline
    } else {
        match check_health(api.as_ref(), HEALTH_TIMEOUT).await {
            Ok(()) => BackendStatus::Online,
            Err(e) => {
                tracing::warn!("Backend health check failed: {}", e);
                BackendStatus::Unreachable
            }
        }
    };

    let session = ChatSession::spawn(api);
    let chrome = Chrome {
        app_name: cfg.app.name.clone(),
        labels: cfg.ui.clone(),
        backend,
    };

    let result = run_app(session.subscribe(), session.commands(), chrome)
        .await
        .context("App run failed");
    session.shutdown().await;
    result
}
