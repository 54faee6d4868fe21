//! Chat gateway
//!
//! Thin typed wrapper over the chat endpoint. No retry, no batching, no
//! client-side rate limiting: a failed send propagates to the caller,
//! which substitutes `ChatMessage::fallback()` and leaves the
//! conversation otherwise untouched.

pub mod types;

pub use types::{ChatMessage, ChatReply, FALLBACK_REPLY, MessageOrigin};

use crate::auth::http_client::ApiClient;
use crate::auth::types::AuthError;
use log::{debug, info};
use serde_json::json;
use std::sync::Arc;

/// Typed client for the chat endpoint
pub struct ChatGateway {
    client: Arc<ApiClient>,
}

impl ChatGateway {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Send one message and await the assistant's answer
    ///
    /// `text` is expected to be non-empty after trimming; the caller
    /// enforces that before submitting.
    pub async fn send_message(&self, text: &str) -> Result<ChatReply, AuthError> {
        debug!("Sending chat message ({} chars)", text.len());

        let reply: ChatReply = self
            .client
            .post_authed("/api/chat", &json!({ "message": text }))
            .await?;

        info!(
            "Received answer ({} chars, domain: {})",
            reply.answer.len(),
            reply.domain.as_deref().unwrap_or("-")
        );
        Ok(reply)
    }
}
