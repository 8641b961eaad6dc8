//! Parley Core - prompt brokering pipeline for an edge-deployed model gateway
//!
//! Validates an inbound chat request, localizes it through a spreadsheet-backed
//! translator, serves cached completions when it can and otherwise calls the
//! upstream model gateway, writing the result through to the response cache.
//! Every external collaborator (cache, gateway, translation source, speech) is a
//! trait so the host runtime only supplies adapters.

pub mod assemble;
pub mod cache;
pub mod cache_key;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod normalize;
pub mod pipeline;
pub mod speech;
pub mod translate;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

pub use assemble::ChatResponse;
pub use cache::ResponseCache;
pub use config::{GatewayTarget, Settings, SheetSettings, SpeechSettings};
pub use gateway::{ChatPayload, GatewayReply, ModelGateway};
pub use http::{HttpReply, InboundRequest, Method};
pub use pipeline::{Pipeline, Services};
pub use speech::SpeechProvider;
pub use translate::{
    SheetTranslator, TranslationData, TranslationSource, Translator, TranslatorLifecycle,
};
