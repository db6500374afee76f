//! TOML configuration for hotend, material and planner settings.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ValidationError;
use crate::models::{HotendConfig, MaterialConfig};
use crate::planner::{DEFAULT_LOOKAHEAD_WINDOW, ExtrusionPlanner};
use crate::pressure::{CompensationStrategy, DecayModel};
use crate::profiles::{HotendProfile, MaterialType};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub hotend: HotendSection,
    #[serde(default)]
    pub material: MaterialSection,
    #[serde(default)]
    pub planner: PlannerSection,
}

/// Hotend settings: a named profile, optionally overridden field by field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct HotendSection {
    #[serde(default)]
    pub profile: HotendProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_volumetric_flow: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MaterialSection {
    #[serde(default)]
    pub profile: MaterialType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shore_hardness: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlannerSection {
    #[serde(default = "default_lookahead_window")]
    pub lookahead_window: usize,
    #[serde(default)]
    pub compensation_strategy: CompensationStrategy,
    #[serde(default)]
    pub decay_model: DecayModel,
}

impl Default for PlannerSection {
    fn default() -> Self {
        Self {
            lookahead_window: default_lookahead_window(),
            compensation_strategy: CompensationStrategy::default(),
            decay_model: DecayModel::default(),
        }
    }
}

fn default_lookahead_window() -> usize {
    DEFAULT_LOOKAHEAD_WINDOW
}

/// Validated runtime objects built from a [`PlannerConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub hotend: HotendConfig,
    pub material: MaterialConfig,
    pub planner: ExtrusionPlanner,
}

impl HotendSection {
    pub fn resolve(&self) -> Result<HotendConfig, ValidationError> {
        HotendConfig::new(
            self.max_volumetric_flow
                .unwrap_or_else(|| self.profile.max_volumetric_flow()),
            self.response_time
                .unwrap_or_else(|| self.profile.response_time()),
        )
    }
}

impl MaterialSection {
    pub fn resolve(&self) -> Result<MaterialConfig, ValidationError> {
        let name = match (&self.name, self.shore_hardness) {
            (Some(name), _) => name.clone(),
            // a custom hardness no longer matches the preset's label
            (None, Some(shore)) => format!("{} (Shore {})", self.profile.display_name(), shore),
            (None, None) => self.profile.display_name().to_string(),
        };
        MaterialConfig::new(
            name,
            self.shore_hardness
                .unwrap_or_else(|| self.profile.shore_hardness()),
        )
    }
}

impl PlannerSection {
    pub fn resolve(&self) -> Result<ExtrusionPlanner, ValidationError> {
        Ok(ExtrusionPlanner::new(self.lookahead_window)?
            .with_strategy(self.compensation_strategy)
            .with_decay_model(self.decay_model))
    }
}

impl PlannerConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    pub fn resolve(&self) -> Result<ResolvedConfig, ValidationError> {
        Ok(ResolvedConfig {
            hotend: self.hotend.resolve()?,
            material: self.material.resolve()?,
            planner: self.planner.resolve()?,
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<PlannerConfig, ConfigError> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!("Failed to parse config TOML '{}': {}", path.display(), e);
                Err(ConfigError::Toml(e))
            }
        },
        Err(e) => {
            tracing::warn!("Failed to read config file '{}': {}", path.display(), e);
            Err(ConfigError::Io(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = PlannerConfig::from_toml_str("").unwrap();
        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.hotend, HotendProfile::Standard.config());
        assert_eq!(resolved.material, MaterialType::Pla.config());
        assert_eq!(resolved.planner, ExtrusionPlanner::default());
    }

    #[test]
    fn test_profiles_and_overrides() {
        let toml = r#"
            [hotend]
            profile = "induction"
            response_time = 0.02

            [material]
            profile = "tpu_shore_30"

            [planner]
            lookahead_window = 4
            compensation_strategy = "pressure_level"
            decay_model = "linear"
        "#;
        let resolved = PlannerConfig::from_toml_str(toml).unwrap().resolve().unwrap();
        assert_eq!(resolved.hotend.max_volumetric_flow(), 18.0);
        assert_eq!(resolved.hotend.response_time(), 0.02);
        assert_eq!(resolved.material.name(), "TPU Shore 30");
        assert_eq!(resolved.planner.lookahead_window(), 4);
        assert_eq!(
            resolved.planner.compensation_strategy(),
            CompensationStrategy::PressureLevel
        );
        assert_eq!(resolved.planner.decay_model(), DecayModel::Linear);
    }

    #[test]
    fn test_custom_hardness_renames_material() {
        let toml = r#"
            [material]
            profile = "petg"
            shore_hardness = 65
        "#;
        let material = PlannerConfig::from_toml_str(toml).unwrap().material.resolve().unwrap();
        assert_eq!(material.name(), "PETG (Shore 65)");
        assert_eq!(material.shore_hardness(), 65.0);
    }

    #[test]
    fn test_invalid_values_rejected_on_resolve() {
        let toml = r#"
            [hotend]
            max_volumetric_flow = -3.0
        "#;
        let err = PlannerConfig::from_toml_str(toml).unwrap().resolve().unwrap_err();
        assert_eq!(err.field(), "max_volumetric_flow");

        let toml = "[planner]\nlookahead_window = 0\n";
        let err = PlannerConfig::from_toml_str(toml).unwrap().resolve().unwrap_err();
        assert_eq!(err.field(), "lookahead_window");
    }

    #[test]
    fn test_unknown_strategy_is_parse_error() {
        let toml = "[planner]\ncompensation_strategy = \"aggressive\"\n";
        assert!(matches!(
            PlannerConfig::from_toml_str(toml),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planner.toml");
        let mut config = PlannerConfig::default();
        config.hotend.profile = HotendProfile::FastResponse;
        config.material.profile = MaterialType::TpuShore95;
        config.planner.decay_model = DecayModel::Linear;
        config.save(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("profile = \"tpu_shore_95\""));
        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
