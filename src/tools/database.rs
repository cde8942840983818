//! The `askDatabaseQuestions` tool: backend query plus markdown rendering,
//! exposed as one callable the agent can invoke on its own.

use std::sync::Arc;

use strum::Display;
use tracing::{debug, info, warn};

use super::tool::AgentTool;
use super::types::AgentToolParameters;
use crate::error::BridgeError;
use crate::genie::GenieClient;
use crate::result::{normalize, QueryResult};
use crate::runtime::BackgroundExecutor;

pub const DATABASE_TOOL_NAME: &str = "askDatabaseQuestions";

/// Topics the data backend is authoritative for.
pub const DEFAULT_TOPICS: &[&str] = &[
    "database schema questions",
    "racing circuits",
    "driver questions",
    "driver standings",
];

/// Steps of a single tool invocation, logged as they happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ToolInvocationState {
    Idle,
    BackendConversationStarted,
    BackendConversationContinued,
    ResultFetched,
    Normalized,
    Errored,
    Returned,
}

/// Markdown answer plus the backend conversation it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseAnswer {
    pub markdown: String,
    pub conversation_id: Option<String>,
    /// States visited, from `Idle` to `Returned`.
    pub trail: Vec<ToolInvocationState>,
}

/// Backend client wrapped as the database question callable.
#[derive(Debug, Clone)]
pub struct DatabaseQuestions {
    client: Arc<GenieClient>,
}

impl DatabaseQuestions {
    pub fn new(client: Arc<GenieClient>) -> Self {
        Self { client }
    }

    /// Answer `prompt` in a fresh backend conversation.
    pub async fn ask(&self, prompt: &str) -> String {
        self.ask_in(prompt, None).await.markdown
    }

    /// Answer `prompt`, continuing `conversation_id` when given.
    pub async fn ask_in(&self, prompt: &str, conversation_id: Option<String>) -> DatabaseAnswer {
        let mut trail = vec![ToolInvocationState::Idle];
        info!(tool = DATABASE_TOOL_NAME, prompt, "Database question");

        let outcome = self.client.query(prompt, conversation_id.clone()).await;

        if let QueryResult::Error { message } = &outcome.result {
            warn!(error = %message, "Database question errored");
            advance(&mut trail, ToolInvocationState::Errored);
        } else {
            advance(
                &mut trail,
                if conversation_id.is_some() {
                    ToolInvocationState::BackendConversationContinued
                } else {
                    ToolInvocationState::BackendConversationStarted
                },
            );
            advance(&mut trail, ToolInvocationState::ResultFetched);
        }

        let markdown = normalize(&outcome.result);
        if !outcome.result.is_error() {
            advance(&mut trail, ToolInvocationState::Normalized);
        }
        advance(&mut trail, ToolInvocationState::Returned);

        DatabaseAnswer {
            markdown,
            conversation_id: outcome.conversation_id,
            trail,
        }
    }

    /// Synchronous form for callers that cannot await, driven on `executor`.
    pub fn ask_blocking(
        &self,
        executor: &BackgroundExecutor,
        prompt: &str,
    ) -> Result<String, BridgeError> {
        let this = self.clone();
        let prompt = prompt.to_string();
        executor.block_on(async move { this.ask(&prompt).await })
    }

    /// Build the agent-facing tool.
    pub fn into_tool(self, topics: &[&str]) -> AgentTool {
        let this = Arc::new(self);
        AgentTool::new(
            DATABASE_TOOL_NAME,
            tool_description(topics),
            AgentToolParameters::object()
                .string(
                    "prompt",
                    "The user's question, passed through unchanged.",
                    true,
                )
                .build(),
            move |args, _ctx| {
                let this = this.clone();
                async move {
                    let prompt = args.get_str("prompt")?.to_string();
                    Ok(this.ask(&prompt).await)
                }
            },
        )
    }
}

fn advance(trail: &mut Vec<ToolInvocationState>, next: ToolInvocationState) {
    if let Some(from) = trail.last() {
        debug!(from = %from, to = %next, "Tool invocation state");
    }
    trail.push(next);
}

/// Build the `askDatabaseQuestions` tool for `client`.
pub fn database_questions_tool(client: Arc<GenieClient>, topics: &[&str]) -> AgentTool {
    DatabaseQuestions::new(client).into_tool(topics)
}

fn tool_description(topics: &[&str]) -> String {
    format!(
        "Answers questions about data by querying the database. \
         Use only for database questions. Authoritative for: {}. \
         The returned text must be shown to the user exactly as returned: \
         do not paraphrase, summarize or reformat it.",
        topics.join(", ")
    )
}

/// Fixed instructions for the conversational agent.
pub fn default_instructions(topics: &[&str]) -> String {
    let mut out = String::from(
        "You are an agent that responds to user questions.\n\
         For questions related to the topics listed below you must use the function askDatabaseQuestions.\n\
         When you call askDatabaseQuestions, pass the user's question as the prompt without changing it.\n\
         When you get the response from askDatabaseQuestions, return it to the user as is.\n\
         You must not change the response from askDatabaseQuestions.\n\
         The topics are:\n",
    );
    for topic in topics {
        out.push_str("- ");
        out.push_str(topic);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_lists_topics_and_verbatim_rule() {
        let text = tool_description(DEFAULT_TOPICS);
        assert!(text.contains("racing circuits"));
        assert!(text.contains("driver standings"));
        assert!(text.contains("exactly as returned"));
    }

    #[test]
    fn instructions_end_with_topic_list() {
        let text = default_instructions(&["database schema questions", "driver questions"]);
        assert!(text.ends_with("- database schema questions\n- driver questions\n"));
        assert!(text.contains("askDatabaseQuestions"));
    }

    #[test]
    fn states_render_in_snake_case() {
        assert_eq!(
            ToolInvocationState::BackendConversationStarted.to_string(),
            "backend_conversation_started"
        );
    }
}
