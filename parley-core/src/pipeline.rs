//! Request orchestration: normalize, translate, look up the cache, call the
//! gateway, assemble, write through.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::assemble::{self, ChatResponse};
use crate::cache::{self, ResponseCache};
use crate::cache_key;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::gateway::{self, ModelGateway};
use crate::http::{HttpReply, InboundRequest, Method};
use crate::normalize::normalize;
use crate::speech::{self, SpeechProvider};
use crate::translate::{self, TranslationSource, Translator, TranslatorLifecycle};

pub const CLEAR_CACHE_PARAM: &str = "clear-cache";
pub const SYSTEM_PROMPT_PARAM: &str = "system-prompt";
pub const CACHE_CLEARED_TEXT: &str = "Cache cleared";

/// External collaborators the pipeline talks to
#[derive(Clone, Copy)]
pub struct Services<'a> {
    pub cache: &'a dyn ResponseCache,
    pub gateway: &'a dyn ModelGateway,
    pub translations: &'a dyn TranslationSource,
    /// Only consulted when speech is configured in [`Settings`]
    pub speech: Option<&'a dyn SpeechProvider>,
}

pub struct Pipeline<'a> {
    settings: Settings,
    lifecycle: &'a TranslatorLifecycle,
    services: Services<'a>,
}

impl<'a> Pipeline<'a> {
    pub fn new(settings: Settings, lifecycle: &'a TranslatorLifecycle, services: Services<'a>) -> Self {
        Self {
            settings,
            lifecycle,
            services,
        }
    }

    /// Handles one request. Every error becomes a `{"error": ...}` reply here
    /// and nowhere else.
    pub async fn handle(&self, req: InboundRequest) -> HttpReply {
        let reply = match self.route(&req).await {
            Ok(reply) => reply,
            Err(e) => {
                if e.is_client_error() {
                    debug!(status = e.status_code(), error = %e, "rejected request");
                } else {
                    error!(status = e.status_code(), error = %e, "request failed");
                }
                HttpReply::from_error(&e)
            }
        };

        if self.settings.cors_enabled {
            reply.with_cors()
        } else {
            reply
        }
    }

    async fn route(&self, req: &InboundRequest) -> Result<HttpReply> {
        match req.method {
            Method::Options if self.settings.cors_enabled => return Ok(HttpReply::no_content()),
            Method::Get | Method::Post => {}
            _ => return Err(Error::MethodNotAllowed),
        }

        if req.has_param(CLEAR_CACHE_PARAM) {
            return self.clear_cache(req).await;
        }

        if let (Some(settings), Some(provider)) = (&self.settings.speech, self.services.speech) {
            match (&req.method, req.path()) {
                (Method::Get, speech::VOICES_PATH) => {
                    return speech::handle_voices(
                        provider,
                        self.services.cache,
                        settings,
                        &req.origin(),
                        self.settings.response_max_age,
                    )
                    .await;
                }
                (Method::Get, speech::SPEECH_PATH) => {
                    return speech::handle_speech(provider, settings, req).await;
                }
                _ => {}
            }
        }

        self.chat(req).await
    }

    async fn clear_cache(&self, req: &InboundRequest) -> Result<HttpReply> {
        let origin = req.origin();
        let cache = self.services.cache;

        self.lifecycle.reset();
        if let Some(sheet) = &self.settings.sheet {
            let key = cache_key::translation_key(&origin, &sheet.spreadsheet_id, &sheet.sheet_name);
            if cache::delete_best_effort(cache, &key).await {
                info!(key = %key, "translation cache cleared");
            }
        }
        if self.settings.speech.is_some() {
            let key = cache_key::voice_list_key(&origin);
            if cache::delete_best_effort(cache, &key).await {
                info!(key = %key, "voice list cache cleared");
            }
        }

        HttpReply::json(200, &ChatResponse::new(CACHE_CLEARED_TEXT))
    }

    async fn chat(&self, req: &InboundRequest) -> Result<HttpReply> {
        let mut conversation = normalize(req)?;
        self.settings.gateway()?;

        let translator = self.translator(req).await?;
        translate::translate_conversation(translator.as_deref(), &mut conversation);
        let system_prompt = translate::resolve_system_prompt(
            translator.as_deref(),
            req.non_empty_param(SYSTEM_PROMPT_PARAM).as_deref(),
            self.settings.system_prompt.as_deref(),
        )?;

        let origin = req.origin();
        let key = cache_key::response_key(&origin, &conversation)?;
        if let Some(hit) = cache::get_or_miss(self.services.cache, &key).await {
            match serde_json::from_slice::<ChatResponse>(&hit.body) {
                Ok(cached) => {
                    info!(key = %key, "response cache hit");
                    return self.reply(req, &origin, cached.response, true);
                }
                Err(e) => warn!(key = %key, error = %e, "unreadable cache entry, treating as miss"),
            }
        } else {
            info!(key = %key, "response cache miss");
        }

        let text = gateway::invoke(
            self.services.gateway,
            &self.settings,
            system_prompt.text(),
            &conversation,
        )
        .await?;

        // stored without a voice link; voice-id is not part of the key
        let stored = assemble::assemble(&self.settings, &ChatResponse::new(text.as_str()))?;
        cache::put_best_effort(self.services.cache, &key, stored).await;
        self.reply(req, &origin, text, false)
    }

    /// Final reply for `text`, with this request's voice link when speech is on
    fn reply(&self, req: &InboundRequest, origin: &str, text: String, hit: bool) -> Result<HttpReply> {
        let voice = self
            .settings
            .speech
            .as_ref()
            .filter(|_| !text.trim().is_empty())
            .map(|settings| {
                speech::voice_link(origin, &speech::requested_voice(req, settings), &text)
            });
        let reply = assemble::assemble(&self.settings, &ChatResponse::new(text).with_voice(voice))?;
        Ok(assemble::mark_cache_status(reply, hit))
    }

    /// `None` when no translation sheet is configured
    async fn translator(&self, req: &InboundRequest) -> Result<Option<Arc<dyn Translator>>> {
        let Some(sheet) = &self.settings.sheet else {
            return Ok(None);
        };

        let translator = self
            .lifecycle
            .ensure_ready(
                &req.origin(),
                sheet,
                self.services.translations,
                self.services.cache,
                self.settings.response_max_age,
            )
            .await
            .inspect_err(|e| warn!(error = %e, "translator unavailable"))?;
        Ok(Some(translator))
    }
}
