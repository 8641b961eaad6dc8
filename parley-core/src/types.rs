//! Core types used throughout Parley

use serde::{Deserialize, Serialize};

/// One role-tagged turn of prior conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEvent {
    pub role: String,
    pub content: String,
}

impl ChatEvent {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

/// The prompt and its preceding events, as extracted from one inbound request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConversationRequest {
    pub prompt: String,
    pub events: Vec<ChatEvent>,
}

impl ConversationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            events: Vec::new(),
        }
    }

    pub fn with_events(mut self, events: Vec<ChatEvent>) -> Self {
        self.events = events;
        self
    }

    /// Canonical serialization of `(events, prompt)`, the input of the cache key
    pub fn canonical_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&(&self.events, &self.prompt))
    }
}

/// Where the system prompt for a request came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemPrompt {
    /// Found in the translation sheet under the sentinel key
    Translated(String),
    /// Statically configured fallback
    Configured(String),
}

impl SystemPrompt {
    pub fn text(&self) -> &str {
        match self {
            Self::Translated(text) | Self::Configured(text) => text,
        }
    }
}
