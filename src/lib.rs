//! HR Assistant Client Core
//!
//! Session lifecycle, credential storage and renewal, and the chat
//! gateway for the HR assistant. Used by the desktop shell; everything
//! presentational (rendering, routing, theming) lives there, not here.

pub mod auth;
pub mod chat;
pub mod config;

// Re-export commonly used items
pub use auth::http_client::ApiClient;
pub use auth::manager::SessionManager;
pub use auth::manager::login_failure_message;
pub use auth::storage::TokenStore;
pub use auth::types::{AuthError, Credentials, SessionEvent, SessionState, UserProfile};
pub use chat::ChatGateway;
pub use chat::types::{ChatMessage, ChatReply, MessageOrigin};
pub use config::ClientConfig;
