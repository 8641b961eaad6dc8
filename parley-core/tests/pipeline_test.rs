//! End-to-end pipeline tests
//!
//! Every external collaborator is an in-memory fake that records how it was
//! called, so these tests can check not only the reply but also which network
//! and cache calls did (or did not) happen.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use async_trait::async_trait;
use parley::cache_key;
use parley::{
    ChatPayload, Error, GatewayReply, GatewayTarget, HttpReply, InboundRequest, Method,
    ModelGateway, Pipeline, ResponseCache, Result, Services, Settings, SheetSettings,
    SpeechProvider, SpeechSettings, TranslationData, TranslationSource, TranslatorLifecycle,
};
use serde_json::Value;

const ORIGIN: &str = "https://edge.example";

// ============ Fakes ============

#[derive(Default)]
struct MemoryCache {
    entries: RefCell<HashMap<String, HttpReply>>,
    gets: Cell<usize>,
    puts: Cell<usize>,
    deletes: RefCell<Vec<String>>,
    fail_writes: Cell<bool>,
    fail_deletes: Cell<bool>,
}

impl MemoryCache {
    fn calls(&self) -> usize {
        self.gets.get() + self.puts.get() + self.deletes.borrow().len()
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }
}

#[async_trait(?Send)]
impl ResponseCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<HttpReply>> {
        self.gets.set(self.gets.get() + 1);
        Ok(self.entries.borrow().get(key).cloned())
    }

    async fn put(&self, key: &str, reply: HttpReply) -> Result<()> {
        self.puts.set(self.puts.get() + 1);
        if self.fail_writes.get() {
            return Err(Error::Cache("quota exceeded".to_string()));
        }
        self.entries.borrow_mut().insert(key.to_string(), reply);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.deletes.borrow_mut().push(key.to_string());
        if self.fail_deletes.get() {
            return Err(Error::Cache("delete unavailable".to_string()));
        }
        Ok(self.entries.borrow_mut().remove(key).is_some())
    }
}

struct RecordingGateway {
    payloads: RefCell<Vec<ChatPayload>>,
    status: Cell<u16>,
    body: RefCell<String>,
    transport_down: Cell<bool>,
}

impl RecordingGateway {
    fn answering(text: &str) -> Self {
        let body = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": text } }]
        });
        Self {
            payloads: RefCell::new(Vec::new()),
            status: Cell::new(200),
            body: RefCell::new(body.to_string()),
            transport_down: Cell::new(false),
        }
    }

    fn calls(&self) -> usize {
        self.payloads.borrow().len()
    }

    fn last_payload(&self) -> ChatPayload {
        self.payloads.borrow().last().cloned().expect("gateway was not called")
    }
}

#[async_trait(?Send)]
impl ModelGateway for RecordingGateway {
    async fn send(&self, target: GatewayTarget<'_>, payload: &ChatPayload) -> Result<GatewayReply> {
        assert_eq!(target.api_key, "gw-key");
        self.payloads.borrow_mut().push(payload.clone());
        if self.transport_down.get() {
            return Err(Error::ProcessingFailed("connection reset".to_string()));
        }
        Ok(GatewayReply {
            status: self.status.get(),
            body: self.body.borrow().clone(),
        })
    }
}

#[derive(Default)]
struct StaticSource {
    rows: Vec<(String, String)>,
    fetches: Cell<usize>,
    fail: Cell<bool>,
}

impl StaticSource {
    fn with_rows(rows: &[(&str, &str)]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        }
    }
}

#[async_trait(?Send)]
impl TranslationSource for StaticSource {
    async fn fetch(&self, sheet: &SheetSettings, credentials: &str) -> Result<TranslationData> {
        assert_eq!(credentials, "sheets-key");
        self.fetches.set(self.fetches.get() + 1);
        if self.fail.get() {
            return Err(Error::ProcessingFailed("sheet unavailable".to_string()));
        }
        Ok(TranslationData::default().with_sheet(sheet.sheet_name.clone(), self.rows.clone()))
    }
}

#[derive(Default)]
struct FakeSpeech {
    voice_lists: Cell<usize>,
}

#[async_trait(?Send)]
impl SpeechProvider for FakeSpeech {
    async fn list_voices(&self, _settings: &SpeechSettings) -> Result<String> {
        self.voice_lists.set(self.voice_lists.get() + 1);
        Ok(r#"{"voices":[{"voice_id":"v1","name":"Captain"}]}"#.to_string())
    }

    async fn synthesize(
        &self,
        _settings: &SpeechSettings,
        voice_id: &str,
        text: &str,
    ) -> Result<Vec<u8>> {
        Ok(format!("{voice_id}:{text}").into_bytes())
    }
}

// ============ Harness ============

struct Harness {
    cache: MemoryCache,
    gateway: RecordingGateway,
    source: StaticSource,
    speech: FakeSpeech,
    lifecycle: TranslatorLifecycle,
}

impl Harness {
    fn new(source: StaticSource) -> Self {
        Self {
            cache: MemoryCache::default(),
            gateway: RecordingGateway::answering("Ahoy!"),
            source,
            speech: FakeSpeech::default(),
            lifecycle: TranslatorLifecycle::new(),
        }
    }

    fn pipeline(&self, settings: Settings) -> Pipeline<'_> {
        Pipeline::new(
            settings,
            &self.lifecycle,
            Services {
                cache: &self.cache,
                gateway: &self.gateway,
                translations: &self.source,
                speech: Some(&self.speech),
            },
        )
    }
}

fn settings() -> Settings {
    Settings {
        gateway_url: Some("https://gateway.example/v1/chat/completions".to_string()),
        gateway_api_key: Some("gw-key".to_string()),
        system_prompt: Some("You are a helpful assistant.".to_string()),
        ..Settings::default()
    }
}

fn translated_settings() -> Settings {
    Settings {
        sheet: Some(SheetSettings::new("sheet-1").with_credentials("sheets-key")),
        ..settings()
    }
}

fn get(query: &str) -> InboundRequest {
    InboundRequest::get(&format!("{ORIGIN}/?{query}")).unwrap()
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn json_body(reply: &HttpReply) -> Value {
    serde_json::from_slice(&reply.body).unwrap()
}

fn translation_key() -> String {
    cache_key::translation_key(ORIGIN, "sheet-1", parley::config::DEFAULT_SHEET_NAME)
}

// ============ Caching ============

#[tokio::test]
async fn test_identical_requests_hit_cache() {
    let h = Harness::new(StaticSource::default());
    let pipeline = h.pipeline(settings());
    let query = format!(
        "prompt=tell%20me%20a%20joke&events={}",
        encode(r#"[{"role":"user","content":"hi"}]"#)
    );

    let live = pipeline.handle(get(&query)).await;
    assert_eq!(live.status, 200);
    assert_eq!(live.header("X-Cache"), Some("MISS"));
    assert_eq!(json_body(&live)["response"], "Ahoy!");

    let cached = pipeline.handle(get(&query)).await;
    assert_eq!(cached.status, 200);
    assert_eq!(cached.header("X-Cache"), Some("HIT"));
    assert_eq!(cached.body, live.body);
    assert_eq!(cached.header("Cache-Control"), Some("public, max-age=86400"));
    assert_eq!(h.gateway.calls(), 1);
}

#[tokio::test]
async fn test_different_requests_miss_cache() {
    let h = Harness::new(StaticSource::default());
    let pipeline = h.pipeline(settings());

    pipeline.handle(get("prompt=one")).await;
    pipeline.handle(get("prompt=two")).await;

    assert_eq!(h.gateway.calls(), 2);
    assert_eq!(h.cache.entries.borrow().len(), 2);
}

#[tokio::test]
async fn test_cache_key_uses_translated_text() {
    let h = Harness::new(StaticSource::with_rows(&[("GREETING", "Bonjour")]));
    let pipeline = h.pipeline(translated_settings());

    let first = pipeline.handle(get("prompt=GREETING")).await;
    assert_eq!(first.header("X-Cache"), Some("MISS"));
    assert_eq!(h.gateway.last_payload().messages.last().unwrap().content, "Bonjour");

    // the surface text differs but the translated conversation is the same
    let second = pipeline.handle(get("prompt=Bonjour")).await;
    assert_eq!(second.header("X-Cache"), Some("HIT"));
    assert_eq!(h.gateway.calls(), 1);
}

#[tokio::test]
async fn test_cache_write_failure_does_not_fail_request() {
    let h = Harness::new(StaticSource::default());
    h.cache.fail_writes.set(true);
    let pipeline = h.pipeline(settings());

    let reply = pipeline.handle(get("prompt=hello")).await;
    assert_eq!(reply.status, 200);
    assert_eq!(json_body(&reply)["response"], "Ahoy!");

    pipeline.handle(get("prompt=hello")).await;
    assert_eq!(h.gateway.calls(), 2);
}

// ============ Validation ============

#[tokio::test]
async fn test_missing_prompt_makes_no_calls() {
    let h = Harness::new(StaticSource::default());
    let reply = h.pipeline(translated_settings()).handle(get("events=%5B%5D")).await;

    assert_eq!(reply.status, 400);
    assert!(json_body(&reply)["error"].is_string());
    assert_eq!(h.gateway.calls(), 0);
    assert_eq!(h.cache.calls(), 0);
    assert_eq!(h.source.fetches.get(), 0);
}

#[tokio::test]
async fn test_event_without_content_rejected_before_network() {
    let h = Harness::new(StaticSource::default());
    let events = encode(r#"[{"role":"user","content":"hi"},{"role":"assistant"}]"#);
    let reply = h
        .pipeline(settings())
        .handle(get(&format!("prompt=x&events={events}")))
        .await;

    assert_eq!(reply.status, 400);
    let error = json_body(&reply)["error"].as_str().unwrap().to_string();
    assert!(error.contains("role"));
    assert!(error.contains("content"));
    assert_eq!(h.gateway.calls(), 0);
    assert_eq!(h.cache.calls(), 0);
}

#[tokio::test]
async fn test_malformed_events_json() {
    let h = Harness::new(StaticSource::default());
    let reply = h.pipeline(settings()).handle(get("prompt=x&events=%5Bnope")).await;

    assert_eq!(reply.status, 400);
    let error = json_body(&reply)["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("Invalid events format: "));
}

#[tokio::test]
async fn test_post_with_legacy_prompt_field() {
    let h = Harness::new(StaticSource::default());
    let req = InboundRequest::post(
        &format!("{ORIGIN}/"),
        r#"{"finalPrompt":"legacy client","events":[{"role":"user","content":"earlier"}]}"#,
    )
    .unwrap();

    let reply = h.pipeline(settings()).handle(req).await;
    assert_eq!(reply.status, 200);

    let messages = h.gateway.last_payload().messages;
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].content, "earlier");
    assert_eq!(messages[2].content, "legacy client");
}

#[tokio::test]
async fn test_post_invalid_json_body() {
    let h = Harness::new(StaticSource::default());
    let req = InboundRequest::post(&format!("{ORIGIN}/"), "{oops").unwrap();

    let reply = h.pipeline(settings()).handle(req).await;
    assert_eq!(reply.status, 400);
    assert_eq!(h.gateway.calls(), 0);
}

#[tokio::test]
async fn test_other_methods_not_allowed() {
    let h = Harness::new(StaticSource::default());
    let mut req = get("prompt=x");
    req.method = Method::Other("DELETE".to_string());

    let reply = h.pipeline(settings()).handle(req).await;
    assert_eq!(reply.status, 405);

    // OPTIONS is only answered when CORS is on
    let mut req = get("prompt=x");
    req.method = Method::Options;
    assert_eq!(h.pipeline(settings()).handle(req).await.status, 405);
}

// ============ Configuration ============

#[tokio::test]
async fn test_missing_gateway_config_is_server_error() {
    let h = Harness::new(StaticSource::default());
    let pipeline = h.pipeline(Settings {
        gateway_api_key: None,
        ..settings()
    });

    assert_eq!(pipeline.handle(get("")).await.status, 400);

    let reply = pipeline.handle(get("prompt=x")).await;
    assert_eq!(reply.status, 500);
    assert!(json_body(&reply)["error"].as_str().unwrap().contains("GATEWAY_API_KEY"));
}

#[tokio::test]
async fn test_unconfigured_system_prompt() {
    let h = Harness::new(StaticSource::default());
    let reply = h
        .pipeline(Settings {
            system_prompt: None,
            ..settings()
        })
        .handle(get("prompt=x"))
        .await;

    assert_eq!(reply.status, 500);
    assert_eq!(json_body(&reply)["error"], "System prompt is not configured");
    assert_eq!(h.gateway.calls(), 0);
}

#[tokio::test]
async fn test_missing_sheet_credentials() {
    let h = Harness::new(StaticSource::default());
    let reply = h
        .pipeline(Settings {
            sheet: Some(SheetSettings::new("sheet-1")),
            ..settings()
        })
        .handle(get("prompt=x"))
        .await;

    assert_eq!(reply.status, 500);
    assert_eq!(h.source.fetches.get(), 0);
}

// ============ Translation ============

#[tokio::test]
async fn test_translated_system_prompt_wins() {
    let h = Harness::new(StaticSource::with_rows(&[("SYSTEM_PROMPT", "You are a pirate.")]));
    let reply = h.pipeline(translated_settings()).handle(get("prompt=hello")).await;
    assert_eq!(reply.status, 200);

    let payload = h.gateway.last_payload();
    let first = &payload.messages[0];
    assert_eq!(first.role, "system");
    assert_eq!(first.content, "You are a pirate.");
}

#[tokio::test]
async fn test_system_prompt_parameter_selects_key() {
    let h = Harness::new(StaticSource::with_rows(&[
        ("SYSTEM_PROMPT", "You are a pirate."),
        ("NINJA_PROMPT", "You are a ninja."),
    ]));
    let pipeline = h.pipeline(translated_settings());

    pipeline.handle(get("prompt=hello&system-prompt=NINJA_PROMPT")).await;
    assert_eq!(h.gateway.last_payload().messages[0].content, "You are a ninja.");

    pipeline.handle(get("prompt=again&system-prompt=UNKNOWN")).await;
    assert_eq!(
        h.gateway.last_payload().messages[0].content,
        "You are a helpful assistant."
    );
}

#[tokio::test]
async fn test_events_translated_in_order() {
    let h = Harness::new(StaticSource::with_rows(&[("HI", "Salut"), ("BYE", "Au revoir")]));
    let events = encode(r#"[{"role":"user","content":"HI"},{"role":"assistant","content":"BYE"}]"#);
    h.pipeline(translated_settings())
        .handle(get(&format!("prompt=untranslated&events={events}")))
        .await;

    let contents: Vec<String> = h
        .gateway
        .last_payload()
        .messages
        .into_iter()
        .map(|m| m.content)
        .collect();
    assert_eq!(
        contents,
        vec!["You are a helpful assistant.", "Salut", "Au revoir", "untranslated"]
    );
}

#[tokio::test]
async fn test_translation_data_reused_from_cache() {
    let h = Harness::new(StaticSource::with_rows(&[("HI", "Salut")]));
    h.pipeline(translated_settings()).handle(get("prompt=HI")).await;
    assert_eq!(h.source.fetches.get(), 1);
    assert!(h.cache.contains(&translation_key()));

    // a fresh isolate starts uninitialized but finds the data in the cache
    let fresh = TranslatorLifecycle::new();
    let pipeline = Pipeline::new(
        translated_settings(),
        &fresh,
        Services {
            cache: &h.cache,
            gateway: &h.gateway,
            translations: &h.source,
            speech: None,
        },
    );
    pipeline.handle(get("prompt=HI&events=%5B%5D")).await;
    assert!(fresh.is_ready());
    assert_eq!(h.source.fetches.get(), 1);
}

#[tokio::test]
async fn test_translator_init_failure_is_retried() {
    let h = Harness::new(StaticSource::with_rows(&[("HI", "Salut")]));
    h.source.fail.set(true);
    let pipeline = h.pipeline(translated_settings());

    let reply = pipeline.handle(get("prompt=HI")).await;
    assert_eq!(reply.status, 500);
    assert!(
        json_body(&reply)["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to initialize translator")
    );
    assert!(!h.lifecycle.is_ready());
    assert_eq!(h.gateway.calls(), 0);

    h.source.fail.set(false);
    let reply = pipeline.handle(get("prompt=HI")).await;
    assert_eq!(reply.status, 200);
    assert_eq!(h.source.fetches.get(), 2);
    assert!(h.lifecycle.is_ready());
}

// ============ Clear cache ============

#[tokio::test]
async fn test_clear_cache_short_circuits() {
    let h = Harness::new(StaticSource::with_rows(&[("HI", "Salut")]));
    let pipeline = h.pipeline(translated_settings());
    pipeline.handle(get("prompt=HI")).await;
    assert!(h.cache.contains(&translation_key()));
    assert_eq!(h.gateway.calls(), 1);

    let reply = pipeline.handle(get("clear-cache=1&prompt=HI&events=garbage")).await;
    assert_eq!(reply.status, 200);
    assert_eq!(json_body(&reply), serde_json::json!({ "response": "Cache cleared" }));
    assert_eq!(h.gateway.calls(), 1);
    assert!(!h.cache.contains(&translation_key()));
    assert!(h.cache.deletes.borrow().contains(&translation_key()));
    assert!(!h.lifecycle.is_ready());

    // next request rebuilds the translator from a fresh fetch
    pipeline.handle(get("prompt=HI")).await;
    assert_eq!(h.source.fetches.get(), 2);
}

#[tokio::test]
async fn test_clear_cache_survives_failing_deletes() {
    let h = Harness::new(StaticSource::with_rows(&[("HI", "Salut")]));
    let pipeline = h.pipeline(Settings {
        speech: Some(SpeechSettings::new("tts-key", "v1")),
        ..translated_settings()
    });
    pipeline.handle(get("prompt=HI")).await;
    assert!(h.lifecycle.is_ready());

    h.cache.fail_deletes.set(true);
    let reply = pipeline.handle(get("clear-cache=1")).await;
    assert_eq!(reply.status, 200);
    assert_eq!(json_body(&reply), serde_json::json!({ "response": "Cache cleared" }));
    assert!(!h.lifecycle.is_ready());
    // both deletes were still attempted
    assert_eq!(
        *h.cache.deletes.borrow(),
        vec![translation_key(), cache_key::voice_list_key(ORIGIN)]
    );
}

#[tokio::test]
async fn test_clear_cache_removes_voice_list() {
    let h = Harness::new(StaticSource::default());
    let pipeline = h.pipeline(Settings {
        speech: Some(SpeechSettings::new("tts-key", "v1")),
        ..settings()
    });

    pipeline.handle(get("clear-cache")).await;
    assert_eq!(
        *h.cache.deletes.borrow(),
        vec![cache_key::voice_list_key(ORIGIN)]
    );
}

// ============ Gateway outcomes ============

#[tokio::test]
async fn test_gateway_status_propagates() {
    let h = Harness::new(StaticSource::default());
    h.gateway.status.set(502);
    *h.gateway.body.borrow_mut() = "<html>upstream exploded</html>".to_string();

    let reply = h.pipeline(settings()).handle(get("prompt=x")).await;
    assert_eq!(reply.status, 502);
    let text = reply.text();
    assert!(text.contains("AI Gateway error: 502"));
    assert!(!text.contains("exploded"));
    assert!(h.cache.entries.borrow().is_empty());
}

#[tokio::test]
async fn test_empty_completion_soft_degrades() {
    let h = Harness::new(StaticSource::default());
    *h.gateway.body.borrow_mut() = r#"{"choices":[]}"#.to_string();

    let reply = h.pipeline(settings()).handle(get("prompt=x")).await;
    assert_eq!(reply.status, 200);
    assert_eq!(json_body(&reply)["response"], "No response generated");
}

#[tokio::test]
async fn test_transport_failure_is_processing_error() {
    let h = Harness::new(StaticSource::default());
    h.gateway.transport_down.set(true);

    let reply = h.pipeline(settings()).handle(get("prompt=x")).await;
    assert_eq!(reply.status, 500);
    assert_eq!(
        json_body(&reply)["error"],
        "Failed to process request: connection reset"
    );
}

#[tokio::test]
async fn test_payload_uses_configured_model() {
    let h = Harness::new(StaticSource::default());
    h.pipeline(Settings {
        model: "claude-test".to_string(),
        max_tokens: 256,
        ..settings()
    })
    .handle(get("prompt=x"))
    .await;

    let payload = h.gateway.last_payload();
    assert_eq!(payload.model, "claude-test");
    assert_eq!(payload.max_tokens, 256);
}

// ============ CORS ============

#[tokio::test]
async fn test_cors_preflight_and_headers() {
    let h = Harness::new(StaticSource::default());
    let cors = Settings {
        cors_enabled: true,
        ..settings()
    };

    let mut preflight = get("");
    preflight.method = Method::Options;
    let reply = h.pipeline(cors.clone()).handle(preflight).await;
    assert_eq!(reply.status, 204);
    assert_eq!(reply.header("Access-Control-Allow-Origin"), Some("*"));
    assert!(reply.header("Access-Control-Allow-Methods").unwrap().contains("POST"));

    let error = h.pipeline(cors.clone()).handle(get("")).await;
    assert_eq!(error.status, 400);
    assert_eq!(error.header("Access-Control-Allow-Origin"), Some("*"));

    let ok = h.pipeline(cors).handle(get("prompt=x")).await;
    assert_eq!(ok.header("Access-Control-Allow-Origin"), Some("*"));
    // the stored copy is host-neutral
    let stored = h.cache.entries.borrow().values().next().cloned().unwrap();
    assert_eq!(stored.header("Access-Control-Allow-Origin"), None);
    assert_eq!(stored.header("X-Cache"), None);
}

// ============ Speech ============

#[tokio::test]
async fn test_voice_link_added_when_speech_configured() {
    let h = Harness::new(StaticSource::default());
    let reply = h
        .pipeline(Settings {
            speech: Some(SpeechSettings::new("tts-key", "v1")),
            ..settings()
        })
        .handle(get("prompt=x&voice-id=captain"))
        .await;

    let body = json_body(&reply);
    assert_eq!(body["response"], "Ahoy!");
    assert_eq!(
        body["voice"],
        "https://edge.example/speech?voice-id=captain&text=Ahoy%21"
    );
}

#[tokio::test]
async fn test_voice_link_follows_each_request() {
    let h = Harness::new(StaticSource::default());
    let pipeline = h.pipeline(Settings {
        speech: Some(SpeechSettings::new("tts-key", "v1")),
        ..settings()
    });

    let alice = pipeline.handle(get("prompt=x&voice-id=alice")).await;
    let bob = pipeline.handle(get("prompt=x&voice-id=bob")).await;
    let fallback = pipeline.handle(get("prompt=x")).await;

    assert_eq!(h.gateway.calls(), 1);
    assert_eq!(bob.header("X-Cache"), Some("HIT"));
    assert_eq!(
        json_body(&alice)["voice"],
        "https://edge.example/speech?voice-id=alice&text=Ahoy%21"
    );
    assert_eq!(
        json_body(&bob)["voice"],
        "https://edge.example/speech?voice-id=bob&text=Ahoy%21"
    );
    assert_eq!(
        json_body(&fallback)["voice"],
        "https://edge.example/speech?voice-id=v1&text=Ahoy%21"
    );

    // a live request for bob would have produced the same bytes
    let fresh = Harness::new(StaticSource::default());
    let live = fresh
        .pipeline(Settings {
            speech: Some(SpeechSettings::new("tts-key", "v1")),
            ..settings()
        })
        .handle(get("prompt=x&voice-id=bob"))
        .await;
    assert_eq!(live.header("X-Cache"), Some("MISS"));
    assert_eq!(live.body, bob.body);
}

#[tokio::test]
async fn test_voice_list_cached() {
    let h = Harness::new(StaticSource::default());
    let pipeline = h.pipeline(Settings {
        speech: Some(SpeechSettings::new("tts-key", "v1")),
        ..settings()
    });
    let voices = || InboundRequest::get(&format!("{ORIGIN}/voices")).unwrap();

    let first = pipeline.handle(voices()).await;
    let second = pipeline.handle(voices()).await;
    assert_eq!(first.status, 200);
    assert_eq!(first.body, second.body);
    assert_eq!(h.speech.voice_lists.get(), 1);
    assert_eq!(h.gateway.calls(), 0);
}

#[tokio::test]
async fn test_speech_route() {
    let h = Harness::new(StaticSource::default());
    let pipeline = h.pipeline(Settings {
        speech: Some(SpeechSettings::new("tts-key", "v1")),
        ..settings()
    });

    let reply = pipeline
        .handle(InboundRequest::get(&format!("{ORIGIN}/speech?text=Ahoy")).unwrap())
        .await;
    assert_eq!(reply.status, 200);
    assert_eq!(reply.header("Content-Type"), Some("audio/mpeg"));
    assert_eq!(reply.body, b"v1:Ahoy".to_vec());

    let missing = pipeline
        .handle(InboundRequest::get(&format!("{ORIGIN}/speech")).unwrap())
        .await;
    assert_eq!(missing.status, 400);
}
