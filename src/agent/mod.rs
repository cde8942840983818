//! Agent platform access and the per-conversation session.

pub mod http;
pub mod platform;
pub mod session;
pub mod types;

pub use http::HttpAgentPlatform;
pub use platform::AgentPlatform;
pub use session::{AgentSessionManager, SessionHandle, NO_RESPONSE};
pub use types::{
    AgentDefinition, AgentInfo, FunctionCall, MessageContent, MessageRole, RequiredAction,
    RequiredToolCall, Run, RunError, RunStatus, SubmitToolOutputs, ThreadInfo, ThreadMessage,
    ToolOutput,
};
