//! Chat message types

use crate::auth::types::UserProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shown in place of an assistant reply when a send fails
pub const FALLBACK_REPLY: &str = "Désolé, une erreur s'est produite. Veuillez réessayer.";

/// Answer returned by the chat endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    /// Echo of the question that was asked
    #[serde(default)]
    pub question: String,
    pub answer: String,
    /// Profile the answer was scoped to (e.g. "CDI/Cadre")
    #[serde(default)]
    pub profile: String,
    /// Knowledge domain the answer came from, when the engine knows it
    #[serde(default)]
    pub domain: Option<String>,
}

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageOrigin {
    User,
    Assistant,
}

/// A single message in the conversation
///
/// Messages are created once and never mutated; the UI owns the ordered
/// sequence and appends to it. Ordering across concurrent sends is not
/// guaranteed by this layer, which is why each message carries its own id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub origin: MessageOrigin,
    pub text: String,
    #[serde(default)]
    pub domain: Option<String>,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    fn new(origin: MessageOrigin, text: String, domain: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin,
            text,
            domain,
            sent_at: Utc::now(),
        }
    }

    /// Message typed by the user
    pub fn from_user(text: impl Into<String>) -> Self {
        Self::new(MessageOrigin::User, text.into(), None)
    }

    /// Assistant message built from a backend reply
    pub fn from_reply(reply: &ChatReply) -> Self {
        Self::new(
            MessageOrigin::Assistant,
            reply.answer.clone(),
            reply.domain.clone(),
        )
    }

    /// Generic assistant message substituted when a send fails
    pub fn fallback() -> Self {
        Self::new(MessageOrigin::Assistant, FALLBACK_REPLY.to_string(), None)
    }

    /// Greeting shown when the conversation opens
    pub fn welcome(profile: &UserProfile) -> Self {
        let text = format!(
            "Bonjour {} ! Je suis votre assistant RH. Comment puis-je vous aider aujourd'hui ?",
            profile.display_name()
        );
        Self::new(MessageOrigin::Assistant, text, None)
    }
}
