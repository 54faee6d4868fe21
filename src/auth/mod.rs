//! Authentication module for the HR assistant client
//!
//! Handles the authenticated session layer:
//! - Username/password login against the backend
//! - Durable token storage
//! - Transparent single-retry credential renewal on expiry
//! - Session bootstrap/login/logout state machine

pub mod http_client;
pub mod manager;
pub mod storage;
pub mod types;

pub use manager::{SessionHandle, SessionManager};
pub use types::*;
