//! Model gateway invocation
//!
//! [`ModelGateway`] is the transport seam: it posts a [`ChatPayload`] and hands
//! back the raw status and body. [`invoke`] builds the payload and classifies
//! the outcome.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::config::{GatewayTarget, Settings};
use crate::error::{Error, Result};
use crate::types::{ChatEvent, ConversationRequest};

/// Returned in place of an empty or unparseable completion
pub const NO_RESPONSE_TEXT: &str = "No response generated";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatPayload {
    pub model: String,
    pub messages: Vec<ChatEvent>,
    pub max_tokens: u32,
}

/// Raw upstream answer before classification
#[derive(Debug, Clone)]
pub struct GatewayReply {
    pub status: u16,
    pub body: String,
}

#[async_trait(?Send)]
pub trait ModelGateway {
    /// Sends the payload. Transport failures (no upstream status at all) are
    /// reported as `Err`; any HTTP answer, including errors, is `Ok`.
    async fn send(&self, target: GatewayTarget<'_>, payload: &ChatPayload) -> Result<GatewayReply>;
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

/// System message, then the events in order, then the prompt as the user turn
pub fn build_messages(system_prompt: &str, conversation: &ConversationRequest) -> Vec<ChatEvent> {
    let mut messages = Vec::with_capacity(conversation.events.len() + 2);
    messages.push(ChatEvent::system(system_prompt));
    messages.extend(conversation.events.iter().cloned());
    messages.push(ChatEvent::user(conversation.prompt.as_str()));
    messages
}

pub fn build_payload(
    settings: &Settings,
    system_prompt: &str,
    conversation: &ConversationRequest,
) -> ChatPayload {
    ChatPayload {
        model: settings.model.clone(),
        messages: build_messages(system_prompt, conversation),
        max_tokens: settings.max_tokens,
    }
}

pub async fn invoke(
    gateway: &dyn ModelGateway,
    settings: &Settings,
    system_prompt: &str,
    conversation: &ConversationRequest,
) -> Result<String> {
    let target = settings.gateway()?;
    let payload = build_payload(settings, system_prompt, conversation);
    debug!(
        model = %payload.model,
        messages = payload.messages.len(),
        "calling model gateway"
    );

    let reply = gateway.send(target, &payload).await.map_err(|e| match e {
        Error::ProcessingFailed(_) | Error::Gateway { .. } => e,
        other => Error::ProcessingFailed(other.to_string()),
    })?;

    classify(reply)
}

/// Maps a raw gateway reply to completion text or a gateway error
pub fn classify(reply: GatewayReply) -> Result<String> {
    if !(200..300).contains(&reply.status) {
        error!(status = reply.status, body = %reply.body, "model gateway returned an error");
        return Err(Error::Gateway {
            status: reply.status,
            detail: reply.body,
        });
    }

    let text = serde_json::from_str::<ChatCompletion>(&reply.body)
        .ok()
        .and_then(|completion| completion.choices.into_iter().next())
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty());

    Ok(text.unwrap_or_else(|| {
        warn!(body = %reply.body, "gateway returned no usable completion");
        NO_RESPONSE_TEXT.to_string()
    }))
}
