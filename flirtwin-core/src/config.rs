use crate::types::Vibe;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorSettings {
    pub base_url: String,
    pub model: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Message generator fields remembered between runs.
///
/// The key names are fixed; existing preference files depend on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePreferences {
    #[serde(rename = "mg-recipient", default = "default_recipient")]
    pub recipient: String,
    #[serde(rename = "mg-vibe", default)]
    pub vibe: Vibe,
    #[serde(rename = "mg-context", default)]
    pub context: String,
}

fn default_recipient() -> String {
    "my crush".into()
}

impl Default for MessagePreferences {
    fn default() -> Self {
        Self {
            recipient: default_recipient(),
            vibe: Vibe::default(),
            context: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub generator: GeneratorSettings,
    #[serde(default)]
    pub preferences: MessagePreferences,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferences_use_fixed_keys() {
        let prefs = MessagePreferences {
            recipient: "Alex".into(),
            vibe: Vibe::Poetic,
            context: "first date tomorrow".into(),
        };
        let v = serde_json::to_value(&prefs).unwrap();
        assert_eq!(v["mg-recipient"], "Alex");
        assert_eq!(v["mg-vibe"], "poetic");
        assert_eq!(v["mg-context"], "first date tomorrow");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: AppConfig = serde_json::from_str(r#"{"preferences":{"mg-vibe":"bold"}}"#).unwrap();
        assert_eq!(cfg.preferences.recipient, "my crush");
        assert_eq!(cfg.preferences.vibe, Vibe::Bold);
        assert_eq!(cfg.generator.model, DEFAULT_MODEL);
        assert_eq!(cfg.generator.request_timeout_secs, 60);
    }
}
