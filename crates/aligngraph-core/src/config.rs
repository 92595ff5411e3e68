//! Matching configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Settings for one matching pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Minimum similarity for a candidate to be accepted, in `[0, 1]`
    pub threshold: f64,
    /// Let name similarity consult the external thesaurus
    pub use_thesaurus: bool,
    /// Lexicon language used by the domain-restriction matcher
    pub language: String,
    /// Shard per-class work across threads (same output as sequential)
    pub parallel: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            use_thesaurus: false,
            language: "en".to_string(),
            parallel: false,
        }
    }
}

impl MatchConfig {
    pub fn new(threshold: f64) -> Result<Self, ConfigError> {
        Self::default().with_threshold(threshold)
    }

    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: MatchConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_threshold(mut self, threshold: f64) -> Result<Self, ConfigError> {
        self.threshold = threshold;
        self.validate()?;
        Ok(self)
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_thesaurus(mut self, use_thesaurus: bool) -> Self {
        self.use_thesaurus = use_thesaurus;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        if self.language.trim().is_empty() {
            return Err(ConfigError::EmptyLanguage);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = MatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.language, "en");
    }

    #[test]
    fn test_threshold_bounds() {
        assert!(MatchConfig::new(0.0).is_ok());
        assert!(MatchConfig::new(1.0).is_ok());
        assert!(matches!(
            MatchConfig::new(1.5),
            Err(ConfigError::InvalidThreshold(_))
        ));
        assert!(MatchConfig::new(f64::NAN).is_err());
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            MatchConfig::from_json_str(r#"{"threshold": 0.75, "parallel": true}"#).unwrap();
        assert_eq!(config.threshold, 0.75);
        assert!(config.parallel);
        assert!(!config.use_thesaurus);
        assert_eq!(config.language, "en");
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(matches!(
            MatchConfig::from_json_str(r#"{"threshold": -0.1}"#),
            Err(ConfigError::InvalidThreshold(_))
        ));
        assert!(matches!(
            MatchConfig::from_json_str("not json"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            MatchConfig::from_json_str(r#"{"language": " "}"#),
            Err(ConfigError::EmptyLanguage)
        ));
    }
}
