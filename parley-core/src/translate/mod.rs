//! Spreadsheet-backed localization
//!
//! A [`TranslationSource`] fetches [`TranslationData`] for a spreadsheet; a
//! [`SheetTranslator`] built from one sheet of it rewrites prompt and event text.
//! [`TranslatorLifecycle`] owns the process-wide translator between requests.

mod lifecycle;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::SheetSettings;
use crate::error::{Error, Result};
use crate::types::{ConversationRequest, SystemPrompt};

pub use lifecycle::{TranslatorLifecycle, TranslatorState};

/// Key looked up for the system prompt when the request does not name another
pub const SYSTEM_PROMPT_KEY: &str = "SYSTEM_PROMPT";

/// Resolves text keys to localized strings
pub trait Translator: Send + Sync {
    /// The localized text for `key`, or `None` when the sheet has no row for it
    fn lookup(&self, key: &str) -> Option<&str>;

    /// Identity fallback on miss
    fn translate(&self, key: &str) -> String {
        self.lookup(key).unwrap_or(key).to_string()
    }
}

/// Translations keyed by sheet name, then by source text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationData {
    pub sheets: BTreeMap<String, BTreeMap<String, String>>,
}

impl TranslationData {
    pub fn with_sheet(
        mut self,
        name: impl Into<String>,
        rows: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.sheets.insert(name.into(), rows.into_iter().collect());
        self
    }
}

/// Fetches translation data from wherever the spreadsheet lives
#[async_trait(?Send)]
pub trait TranslationSource {
    async fn fetch(&self, sheet: &SheetSettings, credentials: &str) -> Result<TranslationData>;
}

#[derive(Debug, Clone, Default)]
pub struct SheetTranslator {
    rows: BTreeMap<String, String>,
}

impl SheetTranslator {
    pub fn new(rows: BTreeMap<String, String>) -> Self {
        Self { rows }
    }

    /// Builds the translator for `sheet_name`, failing when the data lacks that sheet
    pub fn from_data(mut data: TranslationData, sheet_name: &str) -> Result<Self> {
        data.sheets
            .remove(sheet_name)
            .map(Self::new)
            .ok_or_else(|| {
                Error::TranslatorInitFailed(format!("sheet '{sheet_name}' not found"))
            })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Translator for SheetTranslator {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.rows.get(key).map(String::as_str)
    }
}

/// Rewrites the prompt and every event's content in place
pub fn translate_conversation(
    translator: Option<&dyn Translator>,
    conversation: &mut ConversationRequest,
) {
    let Some(translator) = translator else {
        return;
    };

    for event in &mut conversation.events {
        event.content = translator.translate(&event.content);
    }
    conversation.prompt = translator.translate(&conversation.prompt);
}

/// Picks the translated override under `key` if the sheet has one, else the
/// configured fallback. Never merges the two.
pub fn resolve_system_prompt(
    translator: Option<&dyn Translator>,
    key: Option<&str>,
    fallback: Option<&str>,
) -> Result<SystemPrompt> {
    let key = key.filter(|k| !k.trim().is_empty()).unwrap_or(SYSTEM_PROMPT_KEY);

    let translated = translator
        .and_then(|t| t.lookup(key))
        .filter(|text| !text.trim().is_empty());
    if let Some(text) = translated {
        return Ok(SystemPrompt::Translated(text.to_string()));
    }

    fallback
        .filter(|text| !text.trim().is_empty())
        .map(|text| SystemPrompt::Configured(text.to_string()))
        .ok_or(Error::SystemPromptUnconfigured)
}
