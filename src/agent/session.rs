//! Agent session management: one agent, one thread, one reply per turn.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::platform::AgentPlatform;
use super::types::{AgentDefinition, MessageRole, RunStatus, ThreadMessage};
use crate::config::AgentSettings;
use crate::error::BridgeError;
use crate::result::NormalizedAnswer;
use crate::tools::{default_instructions, ToolSet, DEFAULT_TOPICS};

/// Reply used when the thread holds no assistant turn.
pub const NO_RESPONSE: &str = "No response from the assistant.";

/// Agent and thread a conversation runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    pub agent_id: String,
    pub thread_id: String,
}

/// Owns the agent platform connection and the tools the agent may call.
///
/// The session is opened once by [`initialize`](Self::initialize); every
/// later call returns the same handle.
pub struct AgentSessionManager {
    platform: Arc<dyn AgentPlatform>,
    tools: Arc<ToolSet>,
    settings: AgentSettings,
    instructions: String,
    files_dir: PathBuf,
    session: OnceCell<SessionHandle>,
}

impl AgentSessionManager {
    pub fn new(platform: Arc<dyn AgentPlatform>, tools: ToolSet, settings: AgentSettings) -> Self {
        Self {
            platform,
            tools: Arc::new(tools),
            settings,
            instructions: default_instructions(DEFAULT_TOPICS),
            files_dir: PathBuf::from("files"),
            session: OnceCell::new(),
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Directory that receives images attached to replies.
    pub fn with_files_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.files_dir = dir.into();
        self
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    pub fn session(&self) -> Option<&SessionHandle> {
        self.session.get()
    }

    /// Resolve the agent and thread. Idempotent: concurrent and repeated
    /// calls share one result, and a failure leaves the manager uninitialized.
    pub async fn initialize(&self) -> Result<SessionHandle, BridgeError> {
        self.session
            .get_or_try_init(|| self.open_session())
            .await
            .cloned()
    }

    async fn open_session(&self) -> Result<SessionHandle, BridgeError> {
        let agent_id = self.resolve_agent().await?;

        let thread_id = match &self.settings.thread_id {
            Some(thread_id) => {
                info!(thread_id = %thread_id, "Reusing configured thread");
                thread_id.clone()
            }
            None => {
                let thread = self.platform.create_thread().await?;
                info!(thread_id = %thread.id, "Created thread");
                thread.id
            }
        };

        Ok(SessionHandle {
            agent_id,
            thread_id,
        })
    }

    async fn resolve_agent(&self) -> Result<String, BridgeError> {
        if let Some(agent_id) = &self.settings.agent_id {
            match self.platform.get_agent(agent_id).await {
                Ok(Some(agent)) => {
                    info!(agent_id = %agent.id, "Using existing agent");
                    return Ok(agent.id);
                }
                Ok(None) => info!(agent_id = %agent_id, "Agent not found, creating a new one"),
                Err(e) => {
                    warn!(agent_id = %agent_id, error = %e, "Agent lookup failed, creating a new one")
                }
            }
        }

        if self.settings.model.is_empty() {
            return Err(BridgeError::Configuration(
                "MODEL_DEPLOYMENT_NAME is required to create an agent".into(),
            ));
        }

        let definition = AgentDefinition::builder()
            .model(self.settings.model.clone())
            .name(self.settings.name.clone())
            .instructions(self.instructions.clone())
            .tools(self.tools.definitions())
            .build();
        let agent = self.platform.create_agent(&definition).await?;
        info!(agent_id = %agent.id, name = %definition.name, "Created agent");
        Ok(agent.id)
    }

    /// Post `text` as a user turn, run the agent and read its reply.
    ///
    /// Never fails: run failures and platform errors come back as
    /// `Error: ...` text.
    pub async fn ask(&self, session: &SessionHandle, text: &str) -> NormalizedAnswer {
        match self.try_ask(session, text).await {
            Ok(answer) => answer,
            Err(BridgeError::NoResponse) => NormalizedAnswer::text(NO_RESPONSE),
            Err(e) => {
                warn!(thread_id = %session.thread_id, error = %e, "Turn failed");
                NormalizedAnswer::text(e.to_reply())
            }
        }
    }

    async fn try_ask(
        &self,
        session: &SessionHandle,
        text: &str,
    ) -> Result<NormalizedAnswer, BridgeError> {
        let posted = self
            .platform
            .create_message(&session.thread_id, MessageRole::User, text)
            .await?;

        let run = self
            .platform
            .run_and_wait(&session.thread_id, &session.agent_id, &self.tools)
            .await?;
        if run.status == RunStatus::Failed {
            return Err(BridgeError::RunFailed {
                last_error: run.error_text(),
            });
        }

        let messages = self.platform.list_messages(&session.thread_id).await?;
        let reply = latest_reply(&messages, &posted.id).ok_or(BridgeError::NoResponse)?;
        self.read_reply(reply).await
    }

    /// Keep the last text segment; save every image and keep the last path.
    async fn read_reply(&self, message: &ThreadMessage) -> Result<NormalizedAnswer, BridgeError> {
        let mut image_path = None;
        for file_id in message.image_file_ids() {
            let path = self.files_dir.join(format!("{file_id}_image_file.png"));
            self.platform.save_file(file_id, &path).await?;
            info!(file_id, path = %path.display(), "Saved image");
            image_path = Some(path);
        }

        let markdown_text = message
            .text_segments()
            .last()
            .map(str::to_string)
            .unwrap_or_default();

        Ok(NormalizedAnswer {
            markdown_text,
            image_path,
        })
    }
}

impl std::fmt::Debug for AgentSessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentSessionManager")
            .field("tools", &self.tools)
            .field("settings", &self.settings)
            .field("files_dir", &self.files_dir)
            .field("session", &self.session.get())
            .finish()
    }
}

/// Most recent assistant turn after the user turn `posted_id`. Falls back to
/// the most recent assistant turn when `posted_id` is outside the page.
fn latest_reply<'a>(messages: &'a [ThreadMessage], posted_id: &str) -> Option<&'a ThreadMessage> {
    let start = messages
        .iter()
        .position(|m| m.id == posted_id)
        .map_or(0, |i| i + 1);
    messages[start..]
        .iter()
        .rev()
        .find(|m| m.role == MessageRole::Assistant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::types::MessageContent;

    fn msg(id: &str, role: MessageRole, text: &str) -> ThreadMessage {
        ThreadMessage::new(id, role, vec![MessageContent::text(text)])
    }

    #[test]
    fn reply_is_last_assistant_turn_after_question() {
        let messages = vec![
            msg("m1", MessageRole::User, "first"),
            msg("m2", MessageRole::Assistant, "old answer"),
            msg("m3", MessageRole::User, "second"),
            msg("m4", MessageRole::Assistant, "partial"),
            msg("m5", MessageRole::Assistant, "new answer"),
        ];
        assert_eq!(latest_reply(&messages, "m3").map(|m| m.id.as_str()), Some("m5"));
    }

    #[test]
    fn stale_answer_is_not_a_reply() {
        let messages = vec![
            msg("m1", MessageRole::User, "first"),
            msg("m2", MessageRole::Assistant, "old answer"),
            msg("m3", MessageRole::User, "second"),
        ];
        assert!(latest_reply(&messages, "m3").is_none());
    }

    #[test]
    fn question_outside_page_falls_back_to_latest_assistant() {
        let messages = vec![
            msg("m8", MessageRole::Assistant, "older"),
            msg("m9", MessageRole::Assistant, "latest"),
        ];
        assert_eq!(latest_reply(&messages, "m1").map(|m| m.id.as_str()), Some("m9"));
        assert!(latest_reply(&[], "m1").is_none());
    }
}
