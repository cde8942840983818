//! Synchronous front door: one question in, one [`NormalizedAnswer`] out.

use std::sync::Arc;

use tracing::info;

use crate::agent::{AgentSessionManager, HttpAgentPlatform, SessionHandle};
use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::genie::{GenieClient, HttpGenieApi};
use crate::result::NormalizedAnswer;
use crate::runtime::BackgroundExecutor;
use crate::tools::{database_questions_tool, ToolSet, DEFAULT_TOPICS};

/// Connects a presentation layer to the agent.
///
/// All async work runs on a [`BackgroundExecutor`], so `submit` can be called
/// from plain threads and from inside other runtimes alike.
#[derive(Debug)]
pub struct ChatBridge {
    executor: BackgroundExecutor,
    manager: Arc<AgentSessionManager>,
    session: SessionHandle,
}

impl ChatBridge {
    /// Build every component from `config` and open the agent session.
    pub fn connect(config: BridgeConfig) -> Result<Self, BridgeError> {
        config.validate()?;
        let manager = build_session_manager(&config)?;
        Self::from_parts(BackgroundExecutor::new()?, Arc::new(manager))
    }

    /// Open the session of an already assembled manager.
    pub fn from_parts(
        executor: BackgroundExecutor,
        manager: Arc<AgentSessionManager>,
    ) -> Result<Self, BridgeError> {
        let session = {
            let manager = Arc::clone(&manager);
            executor.block_on(async move { manager.initialize().await })??
        };
        info!(agent_id = %session.agent_id, thread_id = %session.thread_id, "Bridge connected");

        Ok(Self {
            executor,
            manager,
            session,
        })
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Ask the agent one question and wait for its reply.
    ///
    /// Blank input yields an empty answer without contacting the platform.
    /// Never fails: errors are rendered into the answer text.
    pub fn submit(&self, question: &str) -> NormalizedAnswer {
        if question.trim().is_empty() {
            return NormalizedAnswer::default();
        }

        let manager = Arc::clone(&self.manager);
        let session = self.session.clone();
        let question = question.to_string();
        self.executor
            .block_on(async move { manager.ask(&session, &question).await })
            .unwrap_or_else(|e| NormalizedAnswer::text(e.to_reply()))
    }
}

/// Backend client for the configured space.
pub fn build_genie_client(config: &BridgeConfig) -> Result<GenieClient, BridgeError> {
    config.validate_genie()?;
    let api = HttpGenieApi::from_settings(&config.genie);
    Ok(GenieClient::new(Arc::new(api), config.genie.space_id.clone())
        .with_poll_policy(config.poll.clone()))
}

/// Tool set holding the database question tool.
pub fn build_tools(config: &BridgeConfig) -> Result<ToolSet, BridgeError> {
    let client = Arc::new(build_genie_client(config)?);
    ToolSet::new().with_tool(Arc::new(database_questions_tool(client, DEFAULT_TOPICS)))
}

/// Session manager wired to the HTTP agent platform.
pub fn build_session_manager(config: &BridgeConfig) -> Result<AgentSessionManager, BridgeError> {
    let platform = HttpAgentPlatform::from_settings(&config.platform)
        .with_poll_policy(config.poll.clone());
    let tools = build_tools(config)?;
    Ok(
        AgentSessionManager::new(Arc::new(platform), tools, config.agent.clone())
            .with_files_dir(config.files_dir.clone()),
    )
}
