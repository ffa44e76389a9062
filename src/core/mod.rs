//! 核心编排层：错误、状态投影、对话编排器、会话驱动

pub mod error;
pub mod orchestrator;
pub mod session;
pub mod state;

pub use error::{ApiError, SubmitRejected, REQUEST_FAILED_MESSAGE};
pub use orchestrator::{InputEdit, Orchestrator, PendingRequest, RequestTicket};
pub use session::{ask_once, ChatSession, Command};
pub use state::{
    latest_sources, Answer, ChatState, ConversationEntry, Origin, Phase, SimilarityScore, Source,
};
