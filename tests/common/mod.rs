//! Shared test helpers: scripted in-memory backend and agent platform.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use genie_bridge::agent::{
    AgentDefinition, AgentInfo, AgentPlatform, FunctionCall, MessageContent, MessageRole,
    RequiredToolCall, Run, RunStatus, ThreadInfo, ThreadMessage, ToolOutput,
};
use genie_bridge::error::BridgeError;
use genie_bridge::genie::types::{GenieMessageStatus, MessageQueryResultRef};
use genie_bridge::genie::{
    GenieApi, GenieAttachment, GenieMessage, GenieQuery, MessageQueryResult,
    StartConversationResponse, StatementResponse,
};
use genie_bridge::tools::{ToolExecutionContext, ToolSet};
use genie_bridge::util::poll::PollPolicy;

/// Poll policy that keeps tests fast.
pub fn fast_poll() -> PollPolicy {
    PollPolicy::fixed(Duration::from_millis(1))
}

// ---------------------------------------------------------------------------
// Data backend
// ---------------------------------------------------------------------------

pub fn message(id: &str, status: GenieMessageStatus) -> GenieMessage {
    GenieMessage {
        id: id.to_string(),
        status: Some(status),
        ..Default::default()
    }
}

/// Completed message carrying an executed query.
pub fn completed_with_query(id: &str, description: &str, sql: &str) -> GenieMessage {
    GenieMessage {
        attachments: vec![GenieAttachment {
            attachment_id: Some("att-1".into()),
            query: Some(GenieQuery {
                query: sql.to_string(),
                description: Some(description.to_string()),
                title: None,
            }),
            text: None,
        }],
        query_result: Some(MessageQueryResultRef {
            statement_id: Some("stmt-1".into()),
            row_count: None,
        }),
        ..message(id, GenieMessageStatus::Completed)
    }
}

/// Completed message answered with prose.
pub fn completed_with_text(id: &str, text: &str) -> GenieMessage {
    GenieMessage {
        attachments: vec![GenieAttachment {
            attachment_id: Some("att-1".into()),
            query: None,
            text: Some(genie_bridge::genie::types::TextAttachment {
                content: text.to_string(),
            }),
        }],
        ..message(id, GenieMessageStatus::Completed)
    }
}

pub fn statement(state: &str, columns: &[(&str, &str)], rows: Value) -> StatementResponse {
    let columns: Vec<Value> = columns
        .iter()
        .enumerate()
        .map(|(i, (name, type_name))| json!({"name": name, "type_name": type_name, "position": i}))
        .collect();
    serde_json::from_value(json!({
        "statement_id": "stmt-1",
        "status": {"state": state},
        "manifest": {"schema": {"columns": columns}},
        "result": {"data_array": rows}
    }))
    .expect("statement fixture")
}

/// Scripted [`GenieApi`]. `get_message` walks the queued messages and then
/// keeps returning the last one; statements work the same way.
pub struct MockGenieApi {
    conversation_id: String,
    messages: Mutex<VecDeque<GenieMessage>>,
    statements: Mutex<VecDeque<StatementResponse>>,
    poll_failure: Option<(u16, String)>,
    calls: Mutex<Vec<String>>,
}

impl MockGenieApi {
    pub fn new(conversation_id: &str) -> Self {
        Self {
            conversation_id: conversation_id.to_string(),
            messages: Mutex::new(VecDeque::new()),
            statements: Mutex::new(VecDeque::new()),
            poll_failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_message(self, message: GenieMessage) -> Self {
        self.messages.lock().unwrap().push_back(message);
        self
    }

    pub fn with_statement(self, statement: StatementResponse) -> Self {
        self.statements.lock().unwrap().push_back(statement);
        self
    }

    /// Make every `get_message` call fail with `status`.
    pub fn failing_polls(mut self, status: u16, body: &str) -> Self {
        self.poll_failure = Some((status, body.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn next_scripted<T: Clone>(queue: &Mutex<VecDeque<T>>) -> Option<T> {
    let mut queue = queue.lock().unwrap();
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

#[async_trait]
impl GenieApi for MockGenieApi {
    async fn start_conversation(
        &self,
        _space_id: &str,
        content: &str,
    ) -> Result<StartConversationResponse, BridgeError> {
        self.record(format!("start:{content}"));
        Ok(StartConversationResponse {
            conversation_id: self.conversation_id.clone(),
            message_id: "msg-1".into(),
            message: Some(message("msg-1", GenieMessageStatus::Submitted)),
        })
    }

    async fn create_message(
        &self,
        _space_id: &str,
        conversation_id: &str,
        content: &str,
    ) -> Result<GenieMessage, BridgeError> {
        self.record(format!("append:{conversation_id}:{content}"));
        Ok(message("msg-1", GenieMessageStatus::Submitted))
    }

    async fn get_message(
        &self,
        _space_id: &str,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<GenieMessage, BridgeError> {
        self.record(format!("get_message:{conversation_id}:{message_id}"));
        if let Some((status, body)) = &self.poll_failure {
            return Err(BridgeError::from_status(*status, body));
        }
        next_scripted(&self.messages)
            .ok_or_else(|| BridgeError::NotFound(format!("message {message_id}")))
    }

    async fn get_message_query_result(
        &self,
        _space_id: &str,
        _conversation_id: &str,
        message_id: &str,
    ) -> Result<MessageQueryResult, BridgeError> {
        self.record(format!("query_result:{message_id}"));
        Ok(MessageQueryResult {
            statement_response: Some(StatementResponse {
                statement_id: "stmt-1".into(),
                ..Default::default()
            }),
        })
    }

    async fn get_statement(&self, statement_id: &str) -> Result<StatementResponse, BridgeError> {
        self.record(format!("statement:{statement_id}"));
        next_scripted(&self.statements)
            .ok_or_else(|| BridgeError::NotFound(format!("statement {statement_id}")))
    }
}

// ---------------------------------------------------------------------------
// Agent platform
// ---------------------------------------------------------------------------

/// Scripted [`AgentPlatform`].
///
/// A run executes the queued tool calls against the supplied tool set, then
/// appends the configured assistant reply (or the last tool output when
/// relaying) and finishes with the configured run.
pub struct MockAgentPlatform {
    existing_agent: Option<String>,
    lookup_fails: bool,
    run: Run,
    reply: Option<Vec<MessageContent>>,
    relay_tool_output: bool,
    tool_calls: Vec<RequiredToolCall>,
    messages: Mutex<Vec<ThreadMessage>>,
    created_agents: Mutex<Vec<AgentDefinition>>,
    threads_created: AtomicUsize,
    lookups: AtomicUsize,
    tool_outputs: Mutex<Vec<ToolOutput>>,
    saved_files: Mutex<Vec<(String, PathBuf)>>,
}

impl Default for MockAgentPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAgentPlatform {
    pub fn new() -> Self {
        Self {
            existing_agent: None,
            lookup_fails: false,
            run: Run::new("run-1", RunStatus::Completed),
            reply: None,
            relay_tool_output: false,
            tool_calls: Vec::new(),
            messages: Mutex::new(Vec::new()),
            created_agents: Mutex::new(Vec::new()),
            threads_created: AtomicUsize::new(0),
            lookups: AtomicUsize::new(0),
            tool_outputs: Mutex::new(Vec::new()),
            saved_files: Mutex::new(Vec::new()),
        }
    }

    pub fn with_existing_agent(mut self, agent_id: &str) -> Self {
        self.existing_agent = Some(agent_id.to_string());
        self
    }

    pub fn with_failing_lookup(mut self) -> Self {
        self.lookup_fails = true;
        self
    }

    pub fn with_run(mut self, run: Run) -> Self {
        self.run = run;
        self
    }

    pub fn with_reply(mut self, content: Vec<MessageContent>) -> Self {
        self.reply = Some(content);
        self
    }

    pub fn with_tool_call(mut self, id: &str, name: &str, arguments: Value) -> Self {
        self.tool_calls.push(RequiredToolCall {
            id: id.to_string(),
            function: FunctionCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        });
        self
    }

    /// Reply with the last tool output verbatim, like a well-behaved agent.
    pub fn relaying_tool_output(mut self) -> Self {
        self.relay_tool_output = true;
        self
    }

    pub fn created_agents(&self) -> Vec<AgentDefinition> {
        self.created_agents.lock().unwrap().clone()
    }

    pub fn threads_created(&self) -> usize {
        self.threads_created.load(Ordering::SeqCst)
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn tool_outputs(&self) -> Vec<ToolOutput> {
        self.tool_outputs.lock().unwrap().clone()
    }

    pub fn saved_files(&self) -> Vec<(String, PathBuf)> {
        self.saved_files.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<ThreadMessage> {
        self.messages.lock().unwrap().clone()
    }

    fn push_message(&self, role: MessageRole, content: Vec<MessageContent>) -> ThreadMessage {
        let mut messages = self.messages.lock().unwrap();
        let message = ThreadMessage::new(format!("msg-{}", messages.len() + 1), role, content);
        messages.push(message.clone());
        message
    }
}

#[async_trait]
impl AgentPlatform for MockAgentPlatform {
    async fn get_agent(&self, agent_id: &str) -> Result<Option<AgentInfo>, BridgeError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.lookup_fails {
            return Err(BridgeError::api(500, "lookup unavailable"));
        }
        Ok(self
            .existing_agent
            .as_deref()
            .filter(|id| *id == agent_id)
            .map(|id| AgentInfo {
                id: id.to_string(),
                ..Default::default()
            }))
    }

    async fn create_agent(&self, definition: &AgentDefinition) -> Result<AgentInfo, BridgeError> {
        let mut created = self.created_agents.lock().unwrap();
        created.push(definition.clone());
        Ok(AgentInfo {
            id: format!("agent-{}", created.len()),
            name: Some(definition.name.clone()),
            model: Some(definition.model.clone()),
            instructions: Some(definition.instructions.clone()),
        })
    }

    async fn create_thread(&self) -> Result<ThreadInfo, BridgeError> {
        let n = self.threads_created.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ThreadInfo {
            id: format!("thread-{n}"),
        })
    }

    async fn create_message(
        &self,
        _thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage, BridgeError> {
        Ok(self.push_message(role, vec![MessageContent::text(content)]))
    }

    async fn run_and_wait(
        &self,
        thread_id: &str,
        _agent_id: &str,
        tools: &ToolSet,
    ) -> Result<Run, BridgeError> {
        let mut last_output = None;
        for call in &self.tool_calls {
            let ctx = ToolExecutionContext {
                thread_id: Some(thread_id.to_string()),
                run_id: Some(self.run.id.clone()),
                call_id: Some(call.id.clone()),
            };
            let output = tools
                .call(&call.function.name, &call.function.arguments, &ctx)
                .await;
            self.tool_outputs.lock().unwrap().push(ToolOutput {
                tool_call_id: call.id.clone(),
                output: output.clone(),
            });
            last_output = Some(output);
        }

        if self.run.status != RunStatus::Failed {
            let reply = match (&self.reply, last_output) {
                (_, Some(output)) if self.relay_tool_output => {
                    Some(vec![MessageContent::text(output)])
                }
                (reply, _) => reply.clone(),
            };
            if let Some(content) = reply {
                self.push_message(MessageRole::Assistant, content);
            }
        }
        Ok(self.run.clone())
    }

    async fn list_messages(&self, _thread_id: &str) -> Result<Vec<ThreadMessage>, BridgeError> {
        Ok(self.messages())
    }

    async fn save_file(&self, file_id: &str, path: &Path) -> Result<(), BridgeError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, b"\x89PNG\r\n\x1a\n")?;
        self.saved_files
            .lock()
            .unwrap()
            .push((file_id.to_string(), path.to_path_buf()));
        Ok(())
    }
}
