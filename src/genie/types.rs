//! Wire types for the data backend's conversation and statement APIs.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::result::ColumnSchema;

/// Lifecycle of a backend message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GenieMessageStatus {
    Submitted,
    FetchingMetadata,
    FilteringContext,
    AskingAi,
    PendingWarehouse,
    ExecutingQuery,
    Completed,
    Failed,
    Cancelled,
    QueryResultExpired,
    #[serde(other)]
    Unknown,
}

impl GenieMessageStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Cancelled | Self::QueryResultExpired
        )
    }

    pub fn is_failure(self) -> bool {
        self.is_terminal() && self != Self::Completed
    }
}

/// A message in a backend conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenieMessage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub conversation_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub status: Option<GenieMessageStatus>,
    #[serde(default)]
    pub attachments: Vec<GenieAttachment>,
    #[serde(default)]
    pub query_result: Option<MessageQueryResultRef>,
    #[serde(default)]
    pub error: Option<MessageError>,
}

impl GenieMessage {
    /// Message id; older payloads only carry `message_id`.
    pub fn resolved_id(&self) -> &str {
        match self.message_id.as_deref() {
            Some(id) if self.id.is_empty() => id,
            _ => &self.id,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status.is_some_and(GenieMessageStatus::is_terminal)
    }

    /// Whether the backend attached an executable query.
    pub fn has_query(&self) -> bool {
        self.query_result.is_some() || self.attachments.iter().any(|a| a.query.is_some())
    }

    /// First non-empty attachment text.
    pub fn attachment_text(&self) -> Option<&str> {
        self.attachments
            .iter()
            .filter_map(|a| a.text.as_ref())
            .map(|t| t.content.as_str())
            .find(|c| !c.is_empty())
    }

    /// First attached query that carries a description.
    pub fn described_query(&self) -> Option<&GenieQuery> {
        self.attachments
            .iter()
            .filter_map(|a| a.query.as_ref())
            .find(|q| q.description.as_deref().is_some_and(|d| !d.is_empty()))
    }

    /// Human-readable reason for a failed message.
    pub fn failure_reason(&self) -> String {
        if let Some(text) = self.error.as_ref().and_then(|e| e.error.as_deref()) {
            return text.to_string();
        }
        match self.status {
            Some(status) => format!("message ended with status {status}"),
            None => "message ended without a status".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenieAttachment {
    #[serde(default)]
    pub attachment_id: Option<String>,
    #[serde(default)]
    pub query: Option<GenieQuery>,
    #[serde(default)]
    pub text: Option<TextAttachment>,
}

/// Query generated by the backend for a message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenieQuery {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextAttachment {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageQueryResultRef {
    #[serde(default)]
    pub statement_id: Option<String>,
    #[serde(default)]
    pub row_count: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageError {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Reply to a start-conversation call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartConversationResponse {
    pub conversation_id: String,
    pub message_id: String,
    #[serde(default)]
    pub message: Option<GenieMessage>,
}

/// Reply to a get-query-result call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageQueryResult {
    #[serde(default)]
    pub statement_response: Option<StatementResponse>,
}

impl MessageQueryResult {
    pub fn statement_id(&self) -> Option<&str> {
        self.statement_response
            .as_ref()
            .map(|s| s.statement_id.as_str())
            .filter(|id| !id.is_empty())
    }
}

/// Statement execution state, including schema and first result chunk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementResponse {
    #[serde(default)]
    pub statement_id: String,
    #[serde(default)]
    pub status: Option<StatementStatus>,
    #[serde(default)]
    pub manifest: Option<ResultManifest>,
    #[serde(default)]
    pub result: Option<ResultData>,
}

impl StatementResponse {
    pub fn state(&self) -> Option<StatementState> {
        self.status.as_ref().map(|s| s.state)
    }

    pub fn columns(&self) -> Vec<ColumnSchema> {
        self.manifest
            .as_ref()
            .and_then(|m| m.schema.as_ref())
            .map(|s| s.columns.clone())
            .unwrap_or_default()
    }

    pub fn rows(&self) -> Vec<Vec<serde_json::Value>> {
        self.result
            .as_ref()
            .and_then(|r| r.data_array.clone())
            .unwrap_or_default()
    }

    pub fn error_message(&self) -> String {
        self.status
            .as_ref()
            .and_then(|s| s.error.as_ref())
            .and_then(|e| e.message.clone())
            .unwrap_or_else(|| format!("statement {} did not succeed", self.statement_id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum StatementState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Canceled,
    Closed,
    #[serde(other)]
    Unknown,
}

impl StatementState {
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementStatus {
    pub state: StatementState,
    #[serde(default)]
    pub error: Option<StatementError>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultManifest {
    #[serde(default)]
    pub schema: Option<ResultSchema>,
    #[serde(default)]
    pub total_row_count: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultSchema {
    #[serde(default)]
    pub columns: Vec<ColumnSchema>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultData {
    #[serde(default)]
    pub data_array: Option<Vec<Vec<serde_json::Value>>>,
}
