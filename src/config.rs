//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `REFUNDS__*` 覆盖（双下划线表示嵌套，如 `REFUNDS__API__TIMEOUT_SECS=10`），
//! 最后 `REFUNDS_API_URL` 单独覆盖后端地址（部署时最常改的一项）。

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::api::DEFAULT_BASE_URL;

/// 后端地址的快捷环境变量
pub const API_URL_ENV: &str = "REFUNDS_API_URL";

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub api: ApiSection,
    pub ui: UiSection,
    pub log: LogSection,
}

/// [app] 段
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: "iFood GenAI Refunds Agent".to_string(),
        }
    }
}

/// [api] 段：后端地址、请求超时、离线模式
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    pub base_url: String,
    /// 单次请求超时（秒）
    pub timeout_secs: u64,
    /// true 时不连后端，所有问题得到 fallback 答案
    pub offline: bool,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            offline: false,
        }
    }
}

impl ApiSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// [ui] 段：对话中的显示名
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSection {
    pub user_label: String,
    pub agent_label: String,
}

impl Default for UiSection {
    fn default() -> Self {
        Self {
            user_label: "Você".to_string(),
            agent_label: "Agente iFood".to_string(),
        }
    }
}

/// [log] 段：TUI 运行时日志写入文件，避免破坏全屏界面
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSection {
    pub file: PathBuf,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            file: PathBuf::from("refunds-chat.log"),
        }
    }
}

/// 从 config 目录加载配置，环境变量可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 叠加环境变量 REFUNDS__*（双下划线表示嵌套键）
/// 4. REFUNDS_API_URL 覆盖 api.base_url
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        } else {
            tracing::warn!("Config file {} not found, ignored", path.display());
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("REFUNDS")
            .separator("__")
            .try_parsing(true),
    );

    builder = builder.set_override_option("api.base_url", std::env::var(API_URL_ENV).ok())?;

    let c = builder.build()?;
    c.try_deserialize()
}
