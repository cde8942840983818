//! Remote surface of the data backend.

use async_trait::async_trait;

use super::types::{GenieMessage, MessageQueryResult, StartConversationResponse, StatementResponse};
use crate::error::BridgeError;

/// Operations exposed by the data Q&A backend. Start and append return as
/// soon as the message is accepted; completion is observed via `get_message`.
#[async_trait]
pub trait GenieApi: Send + Sync {
    async fn start_conversation(
        &self,
        space_id: &str,
        content: &str,
    ) -> Result<StartConversationResponse, BridgeError>;

    async fn create_message(
        &self,
        space_id: &str,
        conversation_id: &str,
        content: &str,
    ) -> Result<GenieMessage, BridgeError>;

    async fn get_message(
        &self,
        space_id: &str,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<GenieMessage, BridgeError>;

    async fn get_message_query_result(
        &self,
        space_id: &str,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<MessageQueryResult, BridgeError>;

    async fn get_statement(&self, statement_id: &str) -> Result<StatementResponse, BridgeError>;
}
