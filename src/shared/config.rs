//! Application configuration. Storage location, user namespace, analyzer thresholds.

use crate::domain::{DomainError, TensionThresholds};
use serde::Deserialize;

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_USER_ID: &str = "default";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Root directory for journals. Read from EGO_COACH_DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Journal namespace. Read from EGO_COACH_USER_ID.
    #[serde(default)]
    pub user_id: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Analyzer thresholds
    // ─────────────────────────────────────────────────────────────────────────
    /// Scores strictly above this are at least "Tension modérée". Read from EGO_COACH_MODERATE_ABOVE.
    #[serde(default)]
    pub moderate_above: Option<f32>,

    /// Scores strictly above this are "Chaleur élevée". Read from EGO_COACH_HIGH_ABOVE.
    #[serde(default)]
    pub high_above: Option<f32>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("EGO_COACH").try_parsing(true));
        if let Ok(path) = std::env::var("EGO_COACH_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        Self::from_builder(c)
    }

    /// A value of the wrong type is an error, never a silent default.
    fn from_builder(
        c: config::builder::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, config::ConfigError> {
        c.build()?.try_deserialize()
    }

    pub fn data_dir_or_default(&self) -> String {
        self.data_dir
            .clone()
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
    }

    pub fn user_id_or_default(&self) -> String {
        self.user_id
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_ID.to_string())
    }

    /// Analyzer thresholds, falling back to the built-in defaults per field.
    pub fn thresholds(&self) -> Result<TensionThresholds, DomainError> {
        TensionThresholds::new(
            self.moderate_above
                .unwrap_or(TensionThresholds::DEFAULT_MODERATE_ABOVE),
            self.high_above
                .unwrap_or(TensionThresholds::DEFAULT_HIGH_ABOVE),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.data_dir_or_default(), "./data");
        assert_eq!(cfg.user_id_or_default(), "default");
        assert_eq!(cfg.thresholds().unwrap(), TensionThresholds::default());
    }

    #[test]
    fn test_file_values_parsed() {
        let builder = config::Config::builder().add_source(config::File::from_str(
            "user_id = \"alice\"\nhigh_above = 6.5",
            config::FileFormat::Toml,
        ));
        let cfg = AppConfig::from_builder(builder).unwrap();
        assert_eq!(cfg.user_id_or_default(), "alice");
        assert_eq!(
            cfg.thresholds().unwrap(),
            TensionThresholds::new(1.0, 6.5).unwrap()
        );
    }

    #[test]
    fn test_unparsable_threshold_is_an_error() {
        let builder = config::Config::builder().add_source(config::File::from_str(
            "high_above = \"beaucoup\"",
            config::FileFormat::Toml,
        ));
        assert!(AppConfig::from_builder(builder).is_err());
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let cfg = AppConfig {
            moderate_above: Some(6.0),
            ..Default::default()
        };
        assert!(matches!(cfg.thresholds(), Err(DomainError::Config(_))));
    }
}
