//! UI-agnostic session state
//!
//! The message log and status flags that make up one conversation. Only the
//! dispatcher and the health monitor mutate a [`SessionState`]; everything else
//! reads it.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// A chat message in the conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    role: ChatRole,
    content: String,
    timestamp: DateTime<Local>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }

    fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Local::now(),
        }
    }

    pub fn role(&self) -> ChatRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }
}

/// Everything the UI needs to render the conversation
#[derive(Debug, Clone)]
pub struct SessionState {
    messages: Vec<ChatMessage>,
    pub(crate) is_loading: bool,
    pub(crate) backend_healthy: bool,
    pub(crate) greeting: String,
    pub(crate) chat_name: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            is_loading: false,
            backend_healthy: true,
            greeting: String::new(),
            chat_name: None,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn backend_healthy(&self) -> bool {
        self.backend_healthy
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    pub fn chat_name(&self) -> Option<&str> {
        self.chat_name.as_deref()
    }

    /// Input is accepted only while idle and the backend is reachable
    pub fn accepts_input(&self) -> bool {
        !self.is_loading && self.backend_healthy
    }

    pub(crate) fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }
}
