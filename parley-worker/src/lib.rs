//! Cloudflare Worker for localized, cached model-gateway completions
//!
//! `GET|POST *` with a prompt (and optional prior events) is translated through
//! the configured spreadsheet, answered from the edge cache when possible, and
//! otherwise sent to the model gateway. Keys are Cloudflare secrets:
//! GATEWAY_API_KEY, GATEWAY_TOKEN (optional), SHEETS_API_KEY, SPEECH_API_KEY.

mod cache;
mod config;
mod gateway;
mod http;
mod logging;
mod sheets;
mod speech;

use std::sync::LazyLock;

use parley::{HttpReply, Pipeline, Services, TranslatorLifecycle};
use worker::{event, Env, Request, Response, Result};

use crate::cache::WorkerCache;
use crate::gateway::FetchGateway;
use crate::sheets::GoogleSheetsSource;
use crate::speech::ElevenLabsSpeech;

/// Lives as long as the isolate; reset by `clear-cache`
static TRANSLATOR: LazyLock<TranslatorLifecycle> = LazyLock::new(TranslatorLifecycle::new);

#[event(fetch)]
pub async fn main(mut req: Request, env: Env, _ctx: worker::Context) -> Result<Response> {
    logging::init(&env);

    let settings = config::settings_from_env(&env);
    let cors_enabled = settings.cors_enabled;

    let inbound = match http::inbound_request(&mut req).await {
        Ok(inbound) => inbound,
        Err(e) => {
            let reply = HttpReply::from_error(&e);
            return http::into_response(if cors_enabled { reply.with_cors() } else { reply });
        }
    };
    tracing::debug!(method = ?inbound.method, path = inbound.path(), "inbound request");

    let cache = WorkerCache::default();
    let pipeline = Pipeline::new(
        settings,
        &TRANSLATOR,
        Services {
            cache: &cache,
            gateway: &FetchGateway,
            translations: &GoogleSheetsSource,
            speech: Some(&ElevenLabsSpeech),
        },
    );

    let reply = pipeline.handle(inbound).await;
    http::into_response(reply)
}
