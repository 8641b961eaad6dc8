//! Deterministic cache keys for gateway responses and translation data

use url::form_urlencoded;

use crate::error::Result;
use crate::types::ConversationRequest;

/// Bump whenever the cached response payload changes shape
pub const CACHE_FORMAT_VERSION: u32 = 3;

/// 32-bit rolling hash over UTF-16 code units (`h = h * 31 + unit`, wrapping).
/// Collisions are possible and accepted.
pub fn rolling_hash(input: &str) -> i32 {
    input.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}

/// Key for the gateway response to an already-translated conversation
pub fn response_key(origin: &str, conversation: &ConversationRequest) -> Result<String> {
    let hash = rolling_hash(&conversation.canonical_json()?);
    Ok(format!(
        "{origin}/response?hash={hash}&v={CACHE_FORMAT_VERSION}"
    ))
}

/// Key for the fetched translation data of one spreadsheet sheet
pub fn translation_key(origin: &str, spreadsheet_id: &str, sheet_name: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("spreadsheet", spreadsheet_id)
        .append_pair("sheet", sheet_name)
        .finish();
    format!("{origin}/translations?{query}")
}

pub fn voice_list_key(origin: &str) -> String {
    format!("{origin}/voices")
}
