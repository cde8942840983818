//! REST implementation of [`GenieApi`].

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::api::GenieApi;
use super::types::{GenieMessage, MessageQueryResult, StartConversationResponse, StatementResponse};
use crate::config::GenieSettings;
use crate::error::BridgeError;
use crate::http::{bearer_headers, read_json, shared_client};

/// Talks to the workspace REST API with a bearer token.
#[derive(Clone)]
pub struct HttpGenieApi {
    host: String,
    token: String,
}

impl HttpGenieApi {
    pub fn new(host: impl Into<String>, token: impl Into<String>) -> Self {
        let host: String = host.into();
        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host
        } else {
            format!("https://{host}")
        };
        Self {
            host: host.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn from_settings(settings: &GenieSettings) -> Self {
        Self::new(settings.host.clone(), settings.token.clone())
    }

    fn space_url(&self, space_id: &str) -> String {
        format!("{}/api/2.0/genie/spaces/{space_id}", self.host)
    }

    fn message_url(&self, space_id: &str, conversation_id: &str, message_id: &str) -> String {
        format!(
            "{}/conversations/{conversation_id}/messages/{message_id}",
            self.space_url(space_id)
        )
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, BridgeError> {
        let resp = shared_client()
            .get(url)
            .headers(bearer_headers(&self.token))
            .send()
            .await?;
        read_json(resp).await
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<T, BridgeError> {
        let resp = shared_client()
            .post(url)
            .headers(bearer_headers(&self.token))
            .json(&body)
            .send()
            .await?;
        read_json(resp).await
    }
}

impl std::fmt::Debug for HttpGenieApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGenieApi")
            .field("host", &self.host)
            .finish()
    }
}

#[async_trait]
impl GenieApi for HttpGenieApi {
    async fn start_conversation(
        &self,
        space_id: &str,
        content: &str,
    ) -> Result<StartConversationResponse, BridgeError> {
        debug!(space_id, "Starting backend conversation");
        let url = format!("{}/start-conversation", self.space_url(space_id));
        self.post(&url, json!({ "content": content })).await
    }

    async fn create_message(
        &self,
        space_id: &str,
        conversation_id: &str,
        content: &str,
    ) -> Result<GenieMessage, BridgeError> {
        debug!(space_id, conversation_id, "Appending backend message");
        let url = format!(
            "{}/conversations/{conversation_id}/messages",
            self.space_url(space_id)
        );
        self.post(&url, json!({ "content": content })).await
    }

    async fn get_message(
        &self,
        space_id: &str,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<GenieMessage, BridgeError> {
        self.get(&self.message_url(space_id, conversation_id, message_id))
            .await
    }

    async fn get_message_query_result(
        &self,
        space_id: &str,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<MessageQueryResult, BridgeError> {
        let url = format!(
            "{}/query-result",
            self.message_url(space_id, conversation_id, message_id)
        );
        self.get(&url).await
    }

    async fn get_statement(&self, statement_id: &str) -> Result<StatementResponse, BridgeError> {
        debug!(statement_id, "Fetching statement result");
        let url = format!("{}/api/2.0/sql/statements/{statement_id}", self.host);
        self.get(&url).await
    }
}
