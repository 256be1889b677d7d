use crate::infrastructure::error::CardError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CARD_JSON: &str = "card.json";
const SCHEMA_VERSION: u8 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CardConfig {
    pub schema: u8,
    pub card_tag: String,
    /// Non-positive disables interval updates.
    pub foreground_interval_ms: i64,
    /// Non-positive stops the loop whenever the card is backgrounded.
    pub background_interval_ms: i64,
    pub wake_release_ms: u64,
    pub activity_label: String,
    pub pause_label: String,
    pub activity_color: String,
    pub pause_color: String,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            schema: SCHEMA_VERSION,
            card_tag: "pomodoro".to_string(),
            foreground_interval_ms: 1000 / 5,
            background_interval_ms: 1000,
            wake_release_ms: 3000,
            activity_label: "In activity".to_string(),
            pause_label: "In pause".to_string(),
            activity_color: "#ff6f4f".to_string(),
            pause_color: "#7cd16b".to_string(),
        }
    }
}

impl CardConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.schema != SCHEMA_VERSION {
            return Err(format!("unsupported schema {}", self.schema));
        }
        validate_non_empty(&self.card_tag, "cardTag")?;
        validate_non_empty(&self.activity_label, "activityLabel")?;
        validate_non_empty(&self.pause_label, "pauseLabel")?;
        validate_color(&self.activity_color, "activityColor")?;
        validate_color(&self.pause_color, "pauseColor")?;
        Ok(())
    }
}

fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field_name} must not be empty"));
    }
    Ok(())
}

fn validate_color(value: &str, field_name: &str) -> Result<(), String> {
    let Some(hex) = value.strip_prefix('#') else {
        return Err(format!("{field_name} must be #RRGGBB"));
    };
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("{field_name} must be #RRGGBB"));
    }
    Ok(())
}

pub fn ensure_default_config(config_dir: &Path) -> Result<(), CardError> {
    let path = config_dir.join(CARD_JSON);
    if !path.exists() {
        let formatted = serde_json::to_string_pretty(&CardConfig::default())?;
        fs::write(path, format!("{formatted}\n"))?;
    }
    Ok(())
}

pub fn load_card_config(config_dir: &Path) -> Result<CardConfig, CardError> {
    let path = config_dir.join(CARD_JSON);
    let raw = fs::read_to_string(&path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)?;
    let schema = parsed
        .get("schema")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| CardError::InvalidConfig(format!("missing schema in {}", path.display())))?;
    if schema != u64::from(SCHEMA_VERSION) {
        return Err(CardError::InvalidConfig(format!(
            "unsupported schema {} in {}",
            schema,
            path.display()
        )));
    }

    let config: CardConfig = serde_json::from_value(parsed)?;
    config
        .validate()
        .map_err(|message| CardError::InvalidConfig(format!("{message} in {}", path.display())))?;
    Ok(config)
}
