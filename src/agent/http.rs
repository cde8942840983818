//! REST implementation of [`AgentPlatform`] for assistants-style agent APIs.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::platform::AgentPlatform;
use super::types::{
    AgentDefinition, AgentInfo, MessageRole, Run, RunStatus, ThreadInfo, ThreadMessage,
    ToolOutput,
};
use crate::config::PlatformSettings;
use crate::error::BridgeError;
use crate::http::{bearer_headers, check_response, read_json, shared_client};
use crate::tools::{ToolExecutionContext, ToolSet};
use crate::util::poll::PollPolicy;

/// Most recent messages fetched when reading a reply.
const MESSAGE_PAGE_LIMIT: &str = "20";

#[derive(Debug, Deserialize)]
struct MessageList {
    #[serde(default)]
    data: Vec<ThreadMessage>,
}

/// Agent platform client over HTTP with a bearer token.
#[derive(Clone)]
pub struct HttpAgentPlatform {
    endpoint: String,
    token: String,
    api_version: String,
    poll: PollPolicy,
}

impl HttpAgentPlatform {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        let endpoint: String = endpoint.into();
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: token.into(),
            api_version: PlatformSettings::default().api_version,
            poll: PollPolicy::default(),
        }
    }

    pub fn from_settings(settings: &PlatformSettings) -> Self {
        Self::new(settings.endpoint.clone(), settings.api_token.clone())
            .with_api_version(settings.api_version.clone())
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.endpoint)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, BridgeError> {
        let resp = shared_client()
            .get(self.url(path))
            .headers(bearer_headers(&self.token))
            .query(&[("api-version", self.api_version.as_str())])
            .query(query)
            .send()
            .await?;
        read_json(resp).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, BridgeError> {
        let resp = shared_client()
            .post(self.url(path))
            .headers(bearer_headers(&self.token))
            .query(&[("api-version", self.api_version.as_str())])
            .json(&body)
            .send()
            .await?;
        read_json(resp).await
    }

    /// Execute the tool calls a run is blocked on and submit their outputs.
    ///
    /// Calls listed in `answered` are skipped, so a poll that still reports
    /// an already answered call does not run the tool again. Returns the run
    /// as reported by the submit, or `None` when nothing was left to submit.
    async fn answer_tool_calls(
        &self,
        thread_id: &str,
        run: &Run,
        tools: &ToolSet,
        answered: &Mutex<HashSet<String>>,
    ) -> Result<Option<Run>, BridgeError> {
        let calls = run.pending_tool_calls();
        if calls.is_empty() {
            return Err(BridgeError::RunFailed {
                last_error: "run requires action but lists no tool calls".into(),
            });
        }

        let fresh: Vec<_> = {
            let done = answered.lock().unwrap_or_else(PoisonError::into_inner);
            calls.iter().filter(|c| !done.contains(&c.id)).collect()
        };
        if fresh.is_empty() {
            debug!(thread_id, run_id = %run.id, "Tool outputs already submitted");
            return Ok(None);
        }

        let mut outputs = Vec::with_capacity(fresh.len());
        for call in fresh {
            let ctx = ToolExecutionContext {
                thread_id: Some(thread_id.to_string()),
                run_id: Some(run.id.clone()),
                call_id: Some(call.id.clone()),
            };
            let output = tools
                .call(&call.function.name, &call.function.arguments, &ctx)
                .await;
            outputs.push(ToolOutput {
                tool_call_id: call.id.clone(),
                output,
            });
        }

        debug!(thread_id, run_id = %run.id, count = outputs.len(), "Submitting tool outputs");
        let submitted: Run = self
            .post(
                &format!("threads/{thread_id}/runs/{}/submit_tool_outputs", run.id),
                json!({ "tool_outputs": outputs }),
            )
            .await?;

        answered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(outputs.into_iter().map(|o| o.tool_call_id));
        Ok(Some(submitted))
    }
}

impl std::fmt::Debug for HttpAgentPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAgentPlatform")
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .finish()
    }
}

#[async_trait]
impl AgentPlatform for HttpAgentPlatform {
    async fn get_agent(&self, agent_id: &str) -> Result<Option<AgentInfo>, BridgeError> {
        match self.get(&format!("assistants/{agent_id}"), &[]).await {
            Ok(agent) => Ok(Some(agent)),
            Err(BridgeError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_agent(&self, definition: &AgentDefinition) -> Result<AgentInfo, BridgeError> {
        let tools: Vec<_> = definition
            .tools
            .iter()
            .map(|t| t.to_function_json())
            .collect();
        self.post(
            "assistants",
            json!({
                "model": definition.model,
                "name": definition.name,
                "instructions": definition.instructions,
                "tools": tools,
            }),
        )
        .await
    }

    async fn create_thread(&self) -> Result<ThreadInfo, BridgeError> {
        self.post("threads", json!({})).await
    }

    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage, BridgeError> {
        self.post(
            &format!("threads/{thread_id}/messages"),
            json!({ "role": role, "content": content }),
        )
        .await
    }

    async fn run_and_wait(
        &self,
        thread_id: &str,
        agent_id: &str,
        tools: &ToolSet,
    ) -> Result<Run, BridgeError> {
        let run: Run = self
            .post(
                &format!("threads/{thread_id}/runs"),
                json!({ "assistant_id": agent_id }),
            )
            .await?;
        info!(thread_id, run_id = %run.id, "Run started");

        let this = self;
        let run_id = run.id.as_str();
        let answered = &Mutex::new(HashSet::new());
        let run = self
            .poll
            .wait_until(move || async move {
                let run: Run = this
                    .get(&format!("threads/{thread_id}/runs/{run_id}"), &[])
                    .await?;
                match run.status {
                    RunStatus::RequiresAction => {
                        let submitted = this
                            .answer_tool_calls(thread_id, &run, tools, answered)
                            .await?;
                        Ok(submitted.filter(|r| r.status.is_terminal()))
                    }
                    status if status.is_terminal() => Ok(Some(run)),
                    _ => Ok(None),
                }
            })
            .await?;

        info!(thread_id, run_id = %run.id, status = %run.status, "Run finished");
        Ok(run)
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, BridgeError> {
        let page: MessageList = self
            .get(
                &format!("threads/{thread_id}/messages"),
                &[("order", "desc"), ("limit", MESSAGE_PAGE_LIMIT)],
            )
            .await?;
        let mut messages = page.data;
        messages.reverse();
        Ok(messages)
    }

    async fn save_file(&self, file_id: &str, path: &Path) -> Result<(), BridgeError> {
        let resp = shared_client()
            .get(self.url(&format!("files/{file_id}/content")))
            .headers(bearer_headers(&self.token))
            .query(&[("api-version", self.api_version.as_str())])
            .send()
            .await?;
        let bytes = check_response(resp).await?.bytes().await?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, &bytes).await?;
        debug!(file_id, path = %path.display(), bytes = bytes.len(), "Saved file");
        Ok(())
    }
}
