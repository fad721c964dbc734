use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{CultivarError, Result};
use crate::pipeline::processing::outliers::{OutlierConfig, RuleSet, ValidationRule};

pub const DEFAULT_CONFIG_PATH: &str = "cultivar.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub extraction: ExtractionConfig,
    pub outliers: OutlierConfig,
    /// Per-field overrides layered on top of the built-in rule table
    pub validation_rules: BTreeMap<String, ValidationRule>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: String,
    pub file_prefix: String,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: "logs".to_string(),
            file_prefix: "cultivar_index.log".to_string(),
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Description blocks at or below this many characters are ignored
    pub min_description_len: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_description_len: 20,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CultivarError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads `path` when it exists, otherwise returns the built-in defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.as_ref().display());
            Ok(Self::default())
        }
    }

    pub fn rule_set(&self) -> RuleSet {
        self.validation_rules
            .iter()
            .fold(RuleSet::default(), |rules, (field, rule)| {
                rules.with_rule(field, rule.clone())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.extraction.min_description_len, 20);
        assert_eq!(config.logging.directory, "logs");
        assert_eq!(config.outliers.duplicate_min_rows, 100);
        assert!(config.validation_rules.is_empty());
    }

    #[test]
    fn rule_overrides_replace_built_in_bounds() {
        let config: Config = toml::from_str(
            r#"
            [validation_rules.thc_percentage]
            min = 0.0
            max = 40.0

            [validation_rules.terpene_percentage]
            min = 0.0
            max = 10.0
            typical = { max = 4.0 }
            "#,
        )
        .unwrap();

        let rules = config.rule_set();
        assert_eq!(rules.get("thc_percentage").unwrap().max, 40.0);
        assert!(rules.get("thc_percentage").unwrap().typical.is_none());
        assert_eq!(rules.get("terpene_percentage").unwrap().typical.unwrap().max, Some(4.0));
        assert!(rules.get("height_cm").is_some());
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = Config::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, CultivarError::Config(_)));
    }
}
