//! Runtime settings for the request pipeline
//!
//! The Worker fills these from its vars and secrets; tests build them directly.

use crate::error::{Error, Result};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_SHEET_NAME: &str = "Translations";
pub const DEFAULT_SPEECH_API_URL: &str = "https://api.elevenlabs.io/v1";
/// One day
pub const DEFAULT_CACHE_MAX_AGE: u32 = 86_400;

#[derive(Debug, Clone)]
pub struct Settings {
    pub gateway_url: Option<String>,
    pub gateway_api_key: Option<String>,
    /// Sent as `cf-aig-authorization` when the gateway requires its own token
    pub gateway_token: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    /// Static fallback when the translation sheet has no system prompt
    pub system_prompt: Option<String>,
    pub sheet: Option<SheetSettings>,
    pub speech: Option<SpeechSettings>,
    pub response_max_age: u32,
    pub cors_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gateway_url: None,
            gateway_api_key: None,
            gateway_token: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            system_prompt: None,
            sheet: None,
            speech: None,
            response_max_age: DEFAULT_CACHE_MAX_AGE,
            cors_enabled: false,
        }
    }
}

impl Settings {
    /// Gateway endpoint and API key, or a configuration error naming what is missing
    pub fn gateway(&self) -> Result<GatewayTarget<'_>> {
        let url = self
            .gateway_url
            .as_deref()
            .ok_or_else(|| Error::ServerConfiguration("GATEWAY_URL is not set".to_string()))?;
        let api_key = self.gateway_api_key.as_deref().ok_or_else(|| {
            Error::ServerConfiguration("GATEWAY_API_KEY is not set".to_string())
        })?;

        Ok(GatewayTarget {
            url,
            api_key,
            token: self.gateway_token.as_deref(),
        })
    }

    pub fn cache_control(&self) -> String {
        format!("public, max-age={}", self.response_max_age)
    }
}

/// Resolved gateway endpoint borrowed from [`Settings`]
#[derive(Debug, Clone, Copy)]
pub struct GatewayTarget<'a> {
    pub url: &'a str,
    pub api_key: &'a str,
    pub token: Option<&'a str>,
}

/// Location of the translation spreadsheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSettings {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    /// Credential material for the translation source; `None` is a misconfiguration
    pub credentials: Option<String>,
}

impl SheetSettings {
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            credentials: None,
        }
    }

    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    pub fn with_credentials(mut self, credentials: impl Into<String>) -> Self {
        self.credentials = Some(credentials.into());
        self
    }

    pub fn credentials(&self) -> Result<&str> {
        self.credentials.as_deref().ok_or_else(|| {
            Error::ServerConfiguration("translation sheet credentials are not set".to_string())
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechSettings {
    pub api_key: String,
    pub api_url: String,
    pub default_voice_id: String,
}

impl SpeechSettings {
    pub fn new(api_key: impl Into<String>, default_voice_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_SPEECH_API_URL.to_string(),
            default_voice_id: default_voice_id.into(),
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}
