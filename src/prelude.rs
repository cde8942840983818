//! Convenience re-exports for common use.

pub use crate::agent::{AgentPlatform, AgentSessionManager, HttpAgentPlatform, SessionHandle};
pub use crate::bridge::ChatBridge;
pub use crate::config::BridgeConfig;
pub use crate::error::{BridgeError, Result};
pub use crate::genie::{GenieApi, GenieClient, HttpGenieApi, QueryOutcome};
pub use crate::result::{normalize, NormalizedAnswer, QueryResult, TabularResult};
pub use crate::runtime::BackgroundExecutor;
pub use crate::tools::{database_questions_tool, Tool, ToolSet, DATABASE_TOOL_NAME};
pub use crate::util::poll::PollPolicy;
