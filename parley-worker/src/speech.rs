//! ElevenLabs-style speech provider

use async_trait::async_trait;
use parley::{Error, Result, SpeechProvider, SpeechSettings};
use serde::Serialize;
use worker::{Fetch, Headers, Method, Request, RequestInit, Response, Url};

pub struct ElevenLabsSpeech;

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
}

fn speech_error(e: worker::Error) -> Error {
    Error::ProcessingFailed(format!("speech request failed: {e}"))
}

async fn send(
    settings: &SpeechSettings,
    method: Method,
    segments: &[&str],
    body: Option<Vec<u8>>,
) -> Result<Response> {
    let headers = Headers::new();
    headers.set("xi-api-key", &settings.api_key).map_err(speech_error)?;
    if body.is_some() {
        headers.set("Content-Type", "application/json").map_err(speech_error)?;
        headers.set("Accept", "audio/mpeg").map_err(speech_error)?;
    }

    let mut init = RequestInit::new();
    init.with_method(method);
    init.with_headers(headers);
    if let Some(body) = body {
        init.with_body(Some(body.into()));
    }

    let mut url = Url::parse(&settings.api_url)
        .map_err(|e| Error::ServerConfiguration(format!("invalid SPEECH_API_URL: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| Error::ServerConfiguration("invalid SPEECH_API_URL".to_string()))?
        .pop_if_empty()
        .extend(segments);

    let upstream = Request::new_with_init(url.as_str(), &init).map_err(speech_error)?;
    let mut response = Fetch::Request(upstream).send().await.map_err(speech_error)?;

    let status = response.status_code();
    if !(200..300).contains(&status) {
        let detail = response.text().await.unwrap_or_default();
        tracing::error!(status, body = %detail, url = %url, "speech provider returned an error");
        return Err(Error::ProcessingFailed(format!(
            "speech provider error {status}"
        )));
    }
    Ok(response)
}

#[async_trait(?Send)]
impl SpeechProvider for ElevenLabsSpeech {
    async fn list_voices(&self, settings: &SpeechSettings) -> Result<String> {
        let mut response = send(settings, Method::Get, &["voices"], None).await?;
        response.text().await.map_err(speech_error)
    }

    async fn synthesize(
        &self,
        settings: &SpeechSettings,
        voice_id: &str,
        text: &str,
    ) -> Result<Vec<u8>> {
        let body = serde_json::to_vec(&SynthesisRequest { text })?;
        let mut response = send(
            settings,
            Method::Post,
            &["text-to-speech", voice_id],
            Some(body),
        )
        .await?;
        response.bytes().await.map_err(speech_error)
    }
}
