//! Upgrades for settings documents written by older releases.

use gist_types::{DEFAULT_PROFILE, Settings};
use serde_json::{Map, Value, json};

use crate::error::ConfigError;

/// Model renames, applied in order. A profile can pass through several.
const MODEL_RENAMES: &[(&str, &str)] = &[
    ("gpt-4-1106-preview", "gpt-4-turbo-preview"),
    ("gpt-4-turbo-preview", "gpt-4-turbo"),
];

/// Bring a stored settings document up to the current layout.
///
/// Returns `true` if anything changed.
pub fn migrate(doc: &mut Value) -> bool {
    let mut changed = false;
    if let Some(profiled) = profiles_from_flat(doc) {
        *doc = profiled;
        changed = true;
    }
    changed |= rename_models(doc);
    changed
}

/// Migrate and deserialize a stored document.
pub(crate) fn decode(mut doc: Value) -> Result<Settings, ConfigError> {
    if doc.is_null() {
        return Ok(Settings::default());
    }
    if !doc.is_object() {
        return Err(ConfigError::Serialization(
            "settings document must be a JSON object".into(),
        ));
    }
    if migrate(&mut doc) {
        tracing::debug!("migrated legacy settings document");
    }
    Ok(serde_json::from_value(doc)?)
}

/// The flat layout had a top-level `model` and no `profiles`.
fn profiles_from_flat(doc: &Value) -> Option<Value> {
    let obj = doc.as_object()?;
    if obj.contains_key("profiles") {
        return None;
    }
    let model = obj.get("model").and_then(Value::as_str)?;
    if model.is_empty() {
        return None;
    }

    let custom_prompts = obj
        .get("customPrompts")
        .filter(|v| v.is_array())
        .cloned()
        .unwrap_or_else(|| json!([]));

    let mut profiles = Map::new();
    profiles.insert(
        DEFAULT_PROFILE.into(),
        json!({ "model": model, "customPrompts": custom_prompts }),
    );

    Some(json!({
        "apiKey": obj.get("apiKey").and_then(Value::as_str).unwrap_or_default(),
        "defaultProfile": DEFAULT_PROFILE,
        "debug": obj.get("debug").and_then(Value::as_bool).unwrap_or(false),
        "profiles": profiles,
    }))
}

fn rename_models(doc: &mut Value) -> bool {
    let Some(profiles) = doc.get_mut("profiles").and_then(Value::as_object_mut) else {
        return false;
    };

    let mut changed = false;
    for profile in profiles.values_mut() {
        let Some(model) = profile.get_mut("model") else {
            continue;
        };
        for (from, to) in MODEL_RENAMES {
            if model.as_str() == Some(*from) {
                *model = Value::String((*to).into());
                changed = true;
            }
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_config_becomes_default_profile() {
        let mut doc = json!({
            "apiKey": "sk-old",
            "model": "gpt-3.5-turbo-16k",
            "customPrompts": ["Use bullet points."],
            "debug": true
        });
        assert!(migrate(&mut doc));
        assert_eq!(
            doc,
            json!({
                "apiKey": "sk-old",
                "defaultProfile": "default",
                "debug": true,
                "profiles": {
                    "default": {
                        "model": "gpt-3.5-turbo-16k",
                        "customPrompts": ["Use bullet points."]
                    }
                }
            })
        );
    }

    #[test]
    fn flat_config_without_prompts_gets_empty_list() {
        let mut doc = json!({"model": "gpt-4"});
        migrate(&mut doc);
        assert_eq!(doc["profiles"]["default"]["customPrompts"], json!([]));
        assert_eq!(doc["apiKey"], "");
        assert_eq!(doc["debug"], false);
    }

    #[test]
    fn profiled_config_is_left_alone() {
        let mut doc = json!({
            "apiKey": "sk",
            "defaultProfile": "work",
            "profiles": {"work": {"model": "gpt-4o", "customPrompts": []}}
        });
        let before = doc.clone();
        assert!(!migrate(&mut doc));
        assert_eq!(doc, before);
    }

    #[test]
    fn retired_models_are_renamed_in_order() {
        let mut doc = json!({
            "profiles": {
                "a": {"model": "gpt-4-1106-preview"},
                "b": {"model": "gpt-4-turbo-preview"},
                "c": {"model": "gpt-4o"}
            }
        });
        assert!(migrate(&mut doc));
        assert_eq!(doc["profiles"]["a"]["model"], "gpt-4-turbo");
        assert_eq!(doc["profiles"]["b"]["model"], "gpt-4-turbo");
        assert_eq!(doc["profiles"]["c"]["model"], "gpt-4o");
    }

    #[test]
    fn flat_config_with_retired_model_is_fully_upgraded() {
        let mut doc = json!({"model": "gpt-4-1106-preview"});
        migrate(&mut doc);
        assert_eq!(doc["profiles"]["default"]["model"], "gpt-4-turbo");
    }

    #[test]
    fn decode_null_is_default() {
        assert_eq!(decode(Value::Null).unwrap(), Settings::default());
    }

    #[test]
    fn decode_rejects_non_object() {
        let err = decode(json!([1, 2])).unwrap_err();
        assert!(matches!(err, ConfigError::Serialization(_)));
    }

    #[test]
    fn decode_reads_reasoning() {
        let settings = decode(json!({
            "apiKey": "sk",
            "profiles": {"default": {"model": "o3-mini", "reasoning": "high"}}
        }))
        .unwrap();
        let profile = settings.resolve_profile(None);
        assert_eq!(profile.model, "o3-mini");
        assert_eq!(profile.reasoning, Some(gist_types::ReasoningEffort::High));
    }
}
