use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::catalog::ModuleCatalog;
use super::feedback::FeedbackConfig;
use super::terrain::{default_terrain, default_zones, LunarZone, TerrainZone};
use crate::error::PlannerError;
use crate::hex::area::PlayArea;
use crate::hex::lattice::HexMetrics;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub area: PlayArea,
    pub lattice: HexMetrics,
    pub search: SearchConfig,
    pub feedback: FeedbackConfig,
    pub modules: ModuleCatalog,
    pub terrain: Vec<TerrainZone>,
    pub zones: Vec<LunarZone>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Lattice slots the placement search may visit before giving up.
    pub iteration_cap: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { iteration_cap: 512 }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            area: PlayArea::default(),
            lattice: HexMetrics::default(),
            search: SearchConfig::default(),
            feedback: FeedbackConfig::default(),
            modules: ModuleCatalog::default(),
            terrain: default_terrain(),
            zones: default_zones(),
        }
    }
}

fn config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "lunaplan")
        .map(|dirs| dirs.config_dir().join("settings.toml"))
}

impl PlannerConfig {
    /// Read the user's settings file, writing one with defaults if none
    /// exists. Unreadable or invalid files fall back to defaults.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };

        if !path.exists() {
            let config = Self::default();
            config.save();
            return config;
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{e}. Using defaults.");
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        let Some(path) = config_path() else {
            log::warn!("Could not determine config directory");
            return;
        };
        if let Err(e) = self.save_to(&path) {
            log::warn!("{e}");
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, PlannerError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PlannerError::InvalidConfig(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&contents)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), PlannerError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| PlannerError::InvalidConfig(format!("failed to create config directory: {e}")))?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| PlannerError::InvalidConfig(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, contents)
            .map_err(|e| PlannerError::InvalidConfig(format!("failed to write {}: {e}", path.display())))
    }

    /// Parse and validate a TOML document. Missing sections take defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, PlannerError> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| PlannerError::InvalidConfig(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PlannerError> {
        let invalid = |msg: String| Err(PlannerError::InvalidConfig(msg));

        if !self.area.is_valid() {
            return invalid(format!("play area {}x{} is not usable", self.area.width, self.area.height));
        }
        if !self.lattice.is_valid() {
            return invalid("lattice metrics are inconsistent".to_string());
        }
        if self.search.iteration_cap == 0 {
            return invalid("search.iteration_cap must be positive".to_string());
        }
        if self.modules.types.is_empty() {
            return invalid("module catalog is empty".to_string());
        }
        if let Some(key) = self.modules.duplicate_key() {
            return invalid(format!("module type {key} is listed twice"));
        }
        if let Some(zone) = self.terrain.iter().find(|z| z.radius.is_nan() || z.radius < 0.0) {
            return invalid(format!("terrain zone {:?} has a negative radius", zone.kind));
        }
        for (i, zone) in self.zones.iter().enumerate() {
            if self.zones[..i].iter().any(|z| z.id == zone.id) {
                return invalid(format!("landing zone {} is listed twice", zone.id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::feedback::Severity;

    #[test]
    fn test_default_config() {
        let config = PlannerConfig::default();
        assert_eq!(config.search.iteration_cap, 512);
        assert_eq!(config.area.width, 1200.0);
        assert_eq!(config.zones.len(), 3);
        assert_eq!(config.terrain.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let config = PlannerConfig::default();
        let serialized = toml::to_string_pretty(&config).expect("serialize");
        let deserialized = PlannerConfig::from_toml_str(&serialized).expect("deserialize");
        assert_eq!(deserialized, config);
    }

    #[test]
    fn partial_file_takes_defaults() {
        let config = PlannerConfig::from_toml_str(
            "[search]\niteration_cap = 64\n\n[feedback]\nmissing_power = \"warn\"\nlow_solar_threshold = 50\n",
        )
        .expect("parse");
        assert_eq!(config.search.iteration_cap, 64);
        assert_eq!(config.feedback.missing_power, Severity::Warn);
        assert_eq!(config.modules, ModuleCatalog::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = PlannerConfig::from_toml_str("[search]\niteration_cap = 0\n").unwrap_err();
        assert!(matches!(err, PlannerError::InvalidConfig(_)));

        let mut config = PlannerConfig::default();
        config.zones.push(config.zones[0].clone());
        assert!(config.validate().is_err());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("settings.toml");
        let mut config = PlannerConfig::default();
        config.search.iteration_cap = 99;
        config.save_to(&path).expect("save");
        let loaded = PlannerConfig::load_from(&path).expect("load");
        assert_eq!(loaded.search.iteration_cap, 99);
        assert!(PlannerConfig::load_from(&dir.path().join("missing.toml")).is_err());
    }
}
