//! Client for the natural-language data Q&A backend.
//!
//! [`GenieApi`] is the raw remote surface; [`GenieClient`] turns one question
//! into exactly one [`QueryResult`](crate::result::QueryResult) shape.

pub mod api;
pub mod client;
pub mod http;
pub mod types;

pub use api::GenieApi;
pub use client::{GenieClient, QueryOutcome};
pub use http::HttpGenieApi;
pub use types::{
    GenieAttachment, GenieMessage, GenieMessageStatus, GenieQuery, MessageQueryResult,
    StartConversationResponse, StatementResponse,
};
