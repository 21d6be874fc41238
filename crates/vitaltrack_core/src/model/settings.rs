//! User preference mapping.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const THEME_KEY: &str = "theme";
const DEFAULT_THEME: &str = "light";

/// JSON-object shaped user preferences (theme and similar).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(Map<String, Value>);

impl Default for Settings {
    fn default() -> Self {
        let mut values = Map::new();
        values.insert(THEME_KEY.to_string(), Value::String(DEFAULT_THEME.into()));
        Self(values)
    }
}

impl Settings {
    pub fn from_map(values: Map<String, Value>) -> Self {
        Self(values)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn theme(&self) -> Option<&str> {
        self.0.get(THEME_KEY).and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::Settings;
    use serde_json::json;

    #[test]
    fn default_theme_is_light() {
        assert_eq!(Settings::default().theme(), Some("light"));
    }

    #[test]
    fn serializes_as_plain_object() {
        let mut settings = Settings::default();
        settings.set("theme", json!("dark"));
        assert_eq!(serde_json::to_value(&settings).unwrap(), json!({"theme": "dark"}));
    }
}
