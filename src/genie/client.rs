//! One question in, one [`QueryResult`] out.

use std::sync::Arc;

use tracing::{debug, warn};

use super::api::GenieApi;
use super::types::{GenieMessage, StatementResponse, StatementState};
use crate::error::BridgeError;
use crate::result::{QueryResult, TabularResult};
use crate::util::poll::PollPolicy;

/// Result of [`GenieClient::query`] together with the backend conversation
/// it ran in. The id is kept even when the result is an error so the caller
/// can continue the same conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub result: QueryResult,
    pub conversation_id: Option<String>,
}

/// Asks questions in a single backend space.
#[derive(Clone)]
pub struct GenieClient {
    api: Arc<dyn GenieApi>,
    space_id: String,
    poll: PollPolicy,
}

impl GenieClient {
    pub fn new(api: Arc<dyn GenieApi>, space_id: impl Into<String>) -> Self {
        Self {
            api,
            space_id: space_id.into(),
            poll: PollPolicy::default(),
        }
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn space_id(&self) -> &str {
        &self.space_id
    }

    /// Ask `question`, starting a new backend conversation when
    /// `conversation_id` is `None` and appending to it otherwise.
    ///
    /// Never fails: transport and backend errors come back as
    /// [`QueryResult::Error`].
    pub async fn query(&self, question: &str, conversation_id: Option<String>) -> QueryOutcome {
        let mut conversation_id = conversation_id;
        let result = match self.try_query(question, &mut conversation_id).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, conversation_id = ?conversation_id, "Backend query failed");
                QueryResult::error(e.to_string())
            }
        };
        QueryOutcome {
            result,
            conversation_id,
        }
    }

    async fn try_query(
        &self,
        question: &str,
        conversation_id: &mut Option<String>,
    ) -> Result<QueryResult, BridgeError> {
        let (conversation, accepted) = match conversation_id.as_deref() {
            None => {
                let started = self.api.start_conversation(&self.space_id, question).await?;
                *conversation_id = Some(started.conversation_id.clone());
                let mut accepted = started.message.unwrap_or_default();
                if accepted.resolved_id().is_empty() {
                    accepted.id = started.message_id;
                }
                (started.conversation_id, accepted)
            }
            Some(existing) => {
                let accepted = self
                    .api
                    .create_message(&self.space_id, existing, question)
                    .await?;
                (existing.to_string(), accepted)
            }
        };

        let message = self.wait_for_message(&conversation, accepted).await?;
        if message.status.is_some_and(|s| s.is_failure()) {
            return Ok(QueryResult::error(message.failure_reason()));
        }

        self.extract(&conversation, &message).await
    }

    async fn wait_for_message(
        &self,
        conversation_id: &str,
        accepted: GenieMessage,
    ) -> Result<GenieMessage, BridgeError> {
        if accepted.is_done() {
            return Ok(accepted);
        }
        let message_id = accepted.resolved_id().to_string();
        if message_id.is_empty() {
            return Err(BridgeError::BackendMessageFailed(
                "backend accepted the question without a message id".into(),
            ));
        }

        let api = self.api.as_ref();
        let space_id = self.space_id.as_str();
        let message_id = message_id.as_str();
        self.poll
            .wait_until(move || async move {
                let message = api.get_message(space_id, conversation_id, message_id).await?;
                debug!(message_id, status = ?message.status, "Polled backend message");
                Ok(message.is_done().then_some(message))
            })
            .await
    }

    async fn extract(
        &self,
        conversation_id: &str,
        message: &GenieMessage,
    ) -> Result<QueryResult, BridgeError> {
        if message.has_query() {
            let query_result = self
                .api
                .get_message_query_result(&self.space_id, conversation_id, message.resolved_id())
                .await?;
            if let Some(statement_id) = query_result.statement_id() {
                let statement = self.wait_for_statement(statement_id).await?;
                let described = message.described_query();
                return Ok(QueryResult::Tabular(TabularResult {
                    columns: statement.columns(),
                    rows: statement.rows(),
                    description: described.and_then(|q| q.description.clone()),
                    source_query: described
                        .map(|q| q.query.clone())
                        .filter(|q| !q.is_empty()),
                }));
            }
        }

        if let Some(text) = message.attachment_text() {
            return Ok(QueryResult::AttachmentText {
                content: text.to_string(),
            });
        }

        Ok(QueryResult::PlainMessage {
            content: message.content.clone(),
        })
    }

    async fn wait_for_statement(&self, statement_id: &str) -> Result<StatementResponse, BridgeError> {
        let api = self.api.as_ref();
        let statement = self
            .poll
            .wait_until(move || async move {
                let statement = api.get_statement(statement_id).await?;
                let pending = statement.state().is_some_and(|s| s.is_pending());
                Ok((!pending).then_some(statement))
            })
            .await?;

        match statement.state() {
            None | Some(StatementState::Succeeded) => Ok(statement),
            Some(_) => Err(BridgeError::BackendMessageFailed(statement.error_message())),
        }
    }
}

impl std::fmt::Debug for GenieClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenieClient")
            .field("space_id", &self.space_id)
            .field("poll", &self.poll)
            .finish()
    }
}
