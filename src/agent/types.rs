//! Agent platform resources: agents, threads, messages, runs.

use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::tools::ToolDefinition;

/// An agent as stored by the platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
}

/// Everything needed to create an agent.
#[derive(Debug, Clone, Builder)]
pub struct AgentDefinition {
    #[builder(into)]
    pub model: String,
    #[builder(into)]
    pub name: String,
    #[builder(into)]
    pub instructions: String,
    #[builder(default)]
    pub tools: Vec<ToolDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadInfo {
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One content segment of a thread message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: TextContent },
    ImageFile { image_file: ImageFileContent },
    #[serde(other)]
    Unsupported,
}

impl MessageContent {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            text: TextContent {
                value: value.into(),
            },
        }
    }

    pub fn image_file(file_id: impl Into<String>) -> Self {
        Self::ImageFile {
            image_file: ImageFileContent {
                file_id: file_id.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFileContent {
    pub file_id: String,
}

/// A turn in an agent thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub id: String,
    pub role: MessageRole,
    #[serde(default)]
    pub content: Vec<MessageContent>,
    #[serde(default, with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

impl ThreadMessage {
    pub fn new(id: impl Into<String>, role: MessageRole, content: Vec<MessageContent>) -> Self {
        Self {
            id: id.into(),
            role,
            content,
            created_at: Utc::now(),
        }
    }

    pub fn text_segments(&self) -> impl Iterator<Item = &str> {
        self.content.iter().filter_map(|c| match c {
            MessageContent::Text { text } => Some(text.value.as_str()),
            _ => None,
        })
    }

    pub fn image_file_ids(&self) -> impl Iterator<Item = &str> {
        self.content.iter().filter_map(|c| match c {
            MessageContent::ImageFile { image_file } => Some(image_file.file_id.as_str()),
            _ => None,
        })
    }
}

/// Run lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Expired,
    Incomplete,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Cancelled | Self::Failed | Self::Completed | Self::Expired | Self::Incomplete
        )
    }
}

/// One execution of an agent against a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub last_error: Option<RunError>,
    #[serde(default)]
    pub required_action: Option<RequiredAction>,
}

impl Run {
    pub fn new(id: impl Into<String>, status: RunStatus) -> Self {
        Self {
            id: id.into(),
            status,
            last_error: None,
            required_action: None,
        }
    }

    pub fn failed(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            last_error: Some(RunError {
                code: None,
                message: message.into(),
            }),
            ..Self::new(id, RunStatus::Failed)
        }
    }

    /// Function calls the platform is waiting on.
    pub fn pending_tool_calls(&self) -> &[RequiredToolCall] {
        self.required_action
            .as_ref()
            .map(|a| a.submit_tool_outputs.tool_calls.as_slice())
            .unwrap_or_default()
    }

    /// Text for a failed run: the error message, else its code.
    pub fn error_text(&self) -> String {
        match &self.last_error {
            Some(err) if !err.message.is_empty() => err.message.clone(),
            Some(RunError {
                code: Some(code), ..
            }) => code.clone(),
            _ => format!("run ended with status {}", self.status),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredAction {
    pub submit_tool_outputs: SubmitToolOutputs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitToolOutputs {
    #[serde(default)]
    pub tool_calls: Vec<RequiredToolCall>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredToolCall {
    pub id: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments.
    #[serde(default)]
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub tool_call_id: String,
    pub output: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn assistant_message_with_text_and_image() {
        let message: ThreadMessage = serde_json::from_value(json!({
            "id": "msg_1",
            "object": "thread.message",
            "created_at": 1735689600,
            "role": "assistant",
            "content": [
                {"type": "image_file", "image_file": {"file_id": "abc123"}},
                {"type": "text", "text": {"value": "done", "annotations": []}},
                {"type": "image_url", "image_url": {"url": "https://x"}}
            ]
        }))
        .unwrap();

        assert_eq!(message.role, MessageRole::Assistant);
        assert_eq!(message.text_segments().collect::<Vec<_>>(), vec!["done"]);
        assert_eq!(message.image_file_ids().collect::<Vec<_>>(), vec!["abc123"]);
        assert_eq!(message.content[2], MessageContent::Unsupported);
        assert_eq!(message.created_at.timestamp(), 1735689600);
    }

    #[test]
    fn run_requiring_tool_outputs() {
        let run: Run = serde_json::from_value(json!({
            "id": "run_1",
            "status": "requires_action",
            "required_action": {
                "type": "submit_tool_outputs",
                "submit_tool_outputs": {"tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": "askDatabaseQuestions", "arguments": "{\"prompt\":\"hi\"}"}
                }]}
            },
            "last_error": null
        }))
        .unwrap();

        assert!(!run.status.is_terminal());
        assert_eq!(run.pending_tool_calls().len(), 1);
        assert_eq!(run.pending_tool_calls()[0].function.name, "askDatabaseQuestions");
    }

    #[test]
    fn failed_run_error_text() {
        assert_eq!(Run::failed("r", "quota exceeded").error_text(), "quota exceeded");

        let coded = Run {
            last_error: Some(RunError {
                code: Some("rate_limit_exceeded".into()),
                message: String::new(),
            }),
            ..Run::new("r", RunStatus::Failed)
        };
        assert_eq!(coded.error_text(), "rate_limit_exceeded");
        assert_eq!(
            Run::new("r", RunStatus::Failed).error_text(),
            "run ended with status failed"
        );
    }

    #[test]
    fn unknown_run_status_is_not_terminal() {
        let run: Run = serde_json::from_value(json!({"id": "r", "status": "paused"})).unwrap();
        assert_eq!(run.status, RunStatus::Unknown);
        assert!(!run.status.is_terminal());
    }
}
