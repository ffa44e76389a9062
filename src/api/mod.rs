//! API 层：政策后端客户端抽象与实现（HTTP / Mock）

pub mod http;
pub mod mock;
pub mod traits;

use std::sync::Arc;
use std::time::Duration;

pub use http::{HttpAgentClient, DEFAULT_BASE_URL};
pub use mock::MockAgentClient;
pub use traits::AgentApi;

use crate::config::ApiSection;
use crate::core::ApiError;

/// 启动时健康检查的上限，与请求超时无关
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(2);

/// 根据配置选择客户端：offline 时用 Mock，否则连 HTTP 后端
pub fn create_api_from_config(cfg: &ApiSection) -> Result<Arc<dyn AgentApi>, ApiError> {
    if cfg.offline {
        tracing::warn!("Offline mode, answers come from the local mock");
        return Ok(Arc::new(MockAgentClient::offline()));
    }
    tracing::info!("Using policy backend at {}", cfg.base_url);
    Ok(Arc::new(HttpAgentClient::new(&cfg.base_url, cfg.timeout())?))
}

/// 带上限的健康检查：后端接受连接却不响应时，最多等 limit 就返回 Timeout
pub async fn check_health(api: &dyn AgentApi, limit: Duration) -> Result<(), ApiError> {
    match tokio::time::timeout(limit, api.health()).await {
        Ok(result) => result,
        Err(_) => Err(ApiError::Timeout),
    }
}
