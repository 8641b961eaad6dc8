//! Settings from Worker vars and secrets

use parley::config::{DEFAULT_SHEET_NAME, DEFAULT_SPEECH_API_URL};
use parley::{Settings, SheetSettings, SpeechSettings};
use worker::Env;

/// Var first, then secret; trimmed, blank counts as unset
pub fn env_string(env: &Env, key: &str) -> Option<String> {
    env.var(key)
        .map(|value| value.to_string())
        .or_else(|_| env.secret(key).map(|value| value.to_string()))
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_bool(env: &Env, key: &str, default: bool) -> bool {
    env_string(env, key)
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

fn env_u32(env: &Env, key: &str, default: u32) -> u32 {
    env_string(env, key)
        .and_then(|value| value.parse::<u32>().ok())
        .unwrap_or(default)
}

pub fn settings_from_env(env: &Env) -> Settings {
    let defaults = Settings::default();

    let sheet = env_string(env, "SPREADSHEET_ID").map(|id| SheetSettings {
        spreadsheet_id: id,
        sheet_name: env_string(env, "SHEET_NAME").unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string()),
        credentials: env_string(env, "SHEETS_API_KEY"),
    });

    let speech = match (env_string(env, "SPEECH_API_KEY"), env_string(env, "DEFAULT_VOICE_ID")) {
        (Some(api_key), Some(voice_id)) => Some(
            SpeechSettings::new(api_key, voice_id).with_api_url(
                env_string(env, "SPEECH_API_URL")
                    .unwrap_or_else(|| DEFAULT_SPEECH_API_URL.to_string()),
            ),
        ),
        (Some(_), None) => {
            tracing::warn!("SPEECH_API_KEY is set without DEFAULT_VOICE_ID, speech disabled");
            None
        }
        _ => None,
    };

    Settings {
        gateway_url: env_string(env, "GATEWAY_URL"),
        gateway_api_key: env_string(env, "GATEWAY_API_KEY"),
        gateway_token: env_string(env, "GATEWAY_TOKEN"),
        model: env_string(env, "MODEL").unwrap_or(defaults.model),
        max_tokens: env_u32(env, "MAX_TOKENS", defaults.max_tokens),
        system_prompt: env_string(env, "SYSTEM_PROMPT"),
        sheet,
        speech,
        response_max_age: env_u32(env, "CACHE_MAX_AGE", defaults.response_max_age),
        cors_enabled: env_bool(env, "CORS_ENABLED", defaults.cors_enabled),
    }
}
