//! API key override from the process environment.

use gist_types::Settings;

/// Environment variable that, when set and non-empty, replaces the stored API key.
pub const API_KEY_ENV: &str = "GIST_API_KEY";

/// Replace the snapshot's API key with `value` when it is non-blank.
pub fn override_api_key(settings: &mut Settings, value: Option<String>) {
    if let Some(key) = value.filter(|k| !k.trim().is_empty()) {
        settings.api_key = Some(key);
    }
}

pub(crate) fn apply_env_override(settings: &mut Settings) {
    let value = std::env::var(API_KEY_ENV).ok();
    if value.is_some() {
        tracing::debug!(var = API_KEY_ENV, "api key taken from environment");
    }
    override_api_key(settings, value);
}
