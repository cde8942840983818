//! Remote surface of the hosted agent platform.

use std::path::Path;

use async_trait::async_trait;

use super::types::{AgentDefinition, AgentInfo, MessageRole, Run, ThreadInfo, ThreadMessage};
use crate::error::BridgeError;
use crate::tools::ToolSet;

/// Operations the session manager needs from the agent platform.
#[async_trait]
pub trait AgentPlatform: Send + Sync {
    /// Look up an agent. `Ok(None)` when the platform does not know the id.
    async fn get_agent(&self, agent_id: &str) -> Result<Option<AgentInfo>, BridgeError>;

    async fn create_agent(&self, definition: &AgentDefinition) -> Result<AgentInfo, BridgeError>;

    async fn create_thread(&self) -> Result<ThreadInfo, BridgeError>;

    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage, BridgeError>;

    /// Start a run and drive it to a terminal status, answering every tool
    /// call the agent makes with `tools`.
    async fn run_and_wait(
        &self,
        thread_id: &str,
        agent_id: &str,
        tools: &ToolSet,
    ) -> Result<Run, BridgeError>;

    /// Recent thread messages, oldest first.
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, BridgeError>;

    /// Download a platform file to `path`, creating parent directories.
    async fn save_file(&self, file_id: &str, path: &Path) -> Result<(), BridgeError>;
}
