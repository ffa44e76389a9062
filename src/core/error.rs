//! 错误类型：后端调用失败与提交被拒
//!
//! ApiError 的具体原因只写日志；对用户一律显示同一条通用提示（见 REQUEST_FAILED_MESSAGE）。

use thiserror::Error;

/// 请求失败时展示给用户的通用提示
pub const REQUEST_FAILED_MESSAGE: &str = "Não foi possível obter resposta. Tente novamente.";

/// 调用政策后端可能出现的错误（网络、超时、非 2xx、响应体无法解析）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Network timeout")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Backend returned status {status}")]
    Status { status: u16 },

    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if let Some(status) = e.status() {
            ApiError::Status {
                status: status.as_u16(),
            }
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

/// submit 被拒绝的原因
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    /// 去除首尾空白后为空，静默忽略
    #[error("Empty question")]
    Empty,

    /// 已有请求在途，同一时刻最多一个
    #[error("A request is already in flight")]
    Busy,

    /// 会话已关闭
    #[error("Session closed")]
    Closed,
}
