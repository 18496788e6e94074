//! Assistant backend boundary
//!
//! The [`Transport`] trait is the only way the session talks to the remote
//! assistant. [`HttpTransport`] is the real implementation; tests use a mock.

pub mod http;
#[cfg(test)]
pub(crate) mod mock;

pub use http::HttpTransport;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::state::{ChatMessage, ChatRole};

/// One prior turn as sent to the backend (no timestamp)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: ChatRole,
    pub content: String,
}

impl From<&ChatMessage> for HistoryEntry {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role(),
            content: message.content().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub chat_history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreetingResponse {
    pub greeting: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunFactResponse {
    pub fact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub index_loaded: bool,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Client for the assistant backend
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST /chat
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError>;

    /// GET /greeting
    async fn greeting(&self) -> Result<GreetingResponse, TransportError>;

    /// GET /fun-fact
    async fn fun_fact(&self) -> Result<FunFactResponse, TransportError>;

    /// GET /health
    async fn health(&self) -> Result<HealthResponse, TransportError>;
}
