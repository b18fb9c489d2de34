//! Document-level configuration

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FileManagerError, Result};

/// Page width of the rendered notebook
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Width {
    #[default]
    Compact,
    Medium,
    Full,
    Columns,
}

impl Width {
    pub fn as_str(self) -> &'static str {
        match self {
            Width::Compact => "compact",
            Width::Medium => "medium",
            Width::Full => "full",
            Width::Columns => "columns",
        }
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Width {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "compact" | "normal" => Ok(Width::Compact),
            "medium" => Ok(Width::Medium),
            "full" => Ok(Width::Full),
            "columns" => Ok(Width::Columns),
            other => Err(format!(
                "unknown width '{}' (expected compact, medium, full or columns)",
                other
            )),
        }
    }
}

/// App-level notebook configuration
///
/// Side-file references (`layout_file`, `css_file`, `html_head_file`) are
/// relative to the notebook's directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub width: Width,
    pub app_title: Option<String>,
    pub layout_file: Option<String>,
    pub css_file: Option<String>,
    pub html_head_file: Option<String>,
    pub auto_download: Vec<String>,
}

const KNOWN_KEYS: &[&str] = &[
    "width",
    "app_title",
    "layout_file",
    "css_file",
    "html_head_file",
    "auto_download",
];

impl AppConfig {
    pub fn with_width(width: Width) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    /// Merge a partial configuration into this one
    ///
    /// `null` resets a key to its default. Unknown keys are skipped. On a
    /// type error nothing is changed.
    pub fn update(&mut self, partial: &Map<String, Value>) -> Result<()> {
        let mut merged = match serde_json::to_value(&*self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };

        for (key, value) in partial {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                log::warn!("Ignoring unknown app config key '{}'", key);
                continue;
            }
            if value.is_null() {
                merged.remove(key);
            } else {
                merged.insert(key.clone(), value.clone());
            }
        }

        let updated: AppConfig = serde_json::from_value(Value::Object(merged))
            .map_err(|e| FileManagerError::InvalidConfig(e.to_string()))?;
        *self = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn partial(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_update_sets_and_clears() {
        let mut config = AppConfig {
            layout_file: Some("layouts/nb.grid.json".to_string()),
            ..AppConfig::default()
        };

        config
            .update(&partial(json!({"width": "full", "layout_file": null})))
            .unwrap();

        assert_eq!(config.width, Width::Full);
        assert_eq!(config.layout_file, None);
    }

    #[test]
    fn test_update_ignores_unknown_keys() {
        let mut config = AppConfig::default();
        config
            .update(&partial(json!({"bogus": 1, "css_file": "custom.css"})))
            .unwrap();
        assert_eq!(config.css_file.as_deref(), Some("custom.css"));
    }

    #[test]
    fn test_update_type_error_leaves_config_untouched() {
        let mut config = AppConfig::with_width(Width::Medium);
        let err = config
            .update(&partial(json!({"app_title": "x", "width": 42})))
            .unwrap_err();

        assert!(matches!(err, FileManagerError::InvalidConfig(_)));
        assert_eq!(config, AppConfig::with_width(Width::Medium));
    }

    #[test]
    fn test_width_from_str() {
        assert_eq!("medium".parse::<Width>(), Ok(Width::Medium));
        assert_eq!("normal".parse::<Width>(), Ok(Width::Compact));
        assert!("wide".parse::<Width>().is_err());
    }
}
