use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::cache::{self, ResponseCache};
use crate::cache_key;
use crate::config::SheetSettings;
use crate::error::{Error, Result};
use crate::http::HttpReply;

use super::{SheetTranslator, TranslationData, TranslationSource, Translator};

#[derive(Clone, Default)]
pub enum TranslatorState {
    #[default]
    Uninitialized,
    Ready(Arc<dyn Translator>),
}

/// Holds the translator shared by every request of one isolate.
///
/// Concurrent initializers may both fetch; the last one to finish wins. The
/// lock only guards the pointer swap and is never held across an await.
#[derive(Default)]
pub struct TranslatorLifecycle {
    state: RwLock<TranslatorState>,
}

impl TranslatorLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Arc<dyn Translator>> {
        match &*self.state.read() {
            TranslatorState::Ready(translator) => Some(Arc::clone(translator)),
            TranslatorState::Uninitialized => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.current().is_some()
    }

    /// Forces the next `ensure_ready` to rebuild from the source
    pub fn reset(&self) {
        *self.state.write() = TranslatorState::Uninitialized;
    }

    /// Returns the ready translator, initializing it first if needed.
    ///
    /// Initialization reads the translation cache entry, fetches from `source`
    /// on a miss and writes the result back, then builds the translator for the
    /// configured sheet. On failure the state stays uninitialized.
    pub async fn ensure_ready(
        &self,
        origin: &str,
        sheet: &SheetSettings,
        source: &dyn TranslationSource,
        cache: &dyn ResponseCache,
        max_age: u32,
    ) -> Result<Arc<dyn Translator>> {
        if let Some(translator) = self.current() {
            return Ok(translator);
        }

        let credentials = sheet.credentials()?;
        let key = cache_key::translation_key(origin, &sheet.spreadsheet_id, &sheet.sheet_name);

        let data = match cache::get_or_miss(cache, &key).await {
            Some(hit) => {
                debug!(key = %key, "translation data served from cache");
                serde_json::from_slice::<TranslationData>(&hit.body).map_err(|e| {
                    Error::TranslatorInitFailed(format!("cached translation data is corrupt: {e}"))
                })?
            }
            None => {
                let data = source
                    .fetch(sheet, credentials)
                    .await
                    .map_err(|e| match e {
                        Error::TranslatorInitFailed(_) => e,
                        other => Error::TranslatorInitFailed(other.to_string()),
                    })?;
                let reply = HttpReply::json(200, &data)?
                    .with_header("Cache-Control", format!("public, max-age={max_age}"));
                cache::put_best_effort(cache, &key, reply).await;
                data
            }
        };

        let translator = SheetTranslator::from_data(data, &sheet.sheet_name)?;
        if translator.is_empty() {
            warn!(sheet = %sheet.sheet_name, "translation sheet has no rows");
        }
        info!(
            spreadsheet = %sheet.spreadsheet_id,
            sheet = %sheet.sheet_name,
            entries = translator.len(),
            "translator ready"
        );

        let translator: Arc<dyn Translator> = Arc::new(translator);
        *self.state.write() = TranslatorState::Ready(Arc::clone(&translator));
        Ok(translator)
    }
}
