//! Extracts `{prompt, events}` from a query-string or JSON-body request

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::http::{InboundRequest, Method};
use crate::types::{ChatEvent, ConversationRequest};

/// Legacy name for `prompt`, still sent by older clients
const LEGACY_PROMPT_PARAM: &str = "finalPrompt";

#[derive(Debug, Default, Deserialize)]
struct PostBody {
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default, rename = "finalPrompt")]
    final_prompt: Option<String>,
    #[serde(default)]
    events: Option<Value>,
}

pub fn normalize(req: &InboundRequest) -> Result<ConversationRequest> {
    let (prompt, events) = match req.method {
        Method::Get => {
            let prompt = req
                .non_empty_param("prompt")
                .or_else(|| req.non_empty_param(LEGACY_PROMPT_PARAM));
            let events = req
                .non_empty_param("events")
                .map(|raw| {
                    serde_json::from_str::<Value>(&raw)
                        .map_err(|e| Error::InvalidEventsFormat(e.to_string()))
                })
                .transpose()?;
            (prompt, events)
        }
        Method::Post => {
            let body = parse_body(req.body.as_deref().unwrap_or_default())?;
            let prompt = non_empty(body.prompt).or_else(|| non_empty(body.final_prompt));
            (prompt, body.events)
        }
        _ => return Err(Error::MethodNotAllowed),
    };

    let prompt = prompt.ok_or(Error::MissingPrompt)?;
    let events = match events {
        Some(value) => parse_events(value)?,
        None => Vec::new(),
    };

    Ok(ConversationRequest { prompt, events })
}

fn parse_body(raw: &str) -> Result<PostBody> {
    if raw.trim().is_empty() {
        return Ok(PostBody::default());
    }
    serde_json::from_str(raw).map_err(|e| Error::InvalidJsonBody(e.to_string()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_events(value: Value) -> Result<Vec<ChatEvent>> {
    let Value::Array(items) = value else {
        return Err(Error::InvalidEventsFormat(
            "events must be an array".to_string(),
        ));
    };

    items
        .into_iter()
        .map(|item| {
            let role = string_field(&item, "role");
            let content = string_field(&item, "content");
            match (role, content) {
                (Some(role), Some(content)) => Ok(ChatEvent::new(role, content)),
                _ => Err(Error::InvalidEventsFormat(
                    "each event must have a role and content".to_string(),
                )),
            }
        })
        .collect()
}

fn string_field(item: &Value, field: &str) -> Option<String> {
    item.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
