//! Scene configuration.
//!
//! Loaded from YAML. Every field has a default, so a config file only needs
//! to name what it overrides:
//! ```yaml
//! logical_size: { width: 840, height: 600 }
//! cell_size: 40
//! tower_accents:
//!   cannon: "#ffb74d"
//! ```

use crate::types::{LogicalSize, Rgb};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Errors from loading or validating a [`SceneConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Thresholds for suppressing circles that are 2D HUD leftovers.
///
/// The legacy canvas API drew range rings, status icons and specks with the
/// same call as enemies. Matching circles are not turned into geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HudFilter {
    /// Unfilled circles below this radius are outlines, not bodies.
    pub outline_max_radius: f32,
    /// Game-space band along the top edge where small circles are icons.
    pub top_band: f32,
    /// Largest radius still treated as an icon inside the top band.
    pub top_band_max_radius: f32,
    /// Anything smaller is never drawn.
    pub min_radius: f32,
}

impl Default for HudFilter {
    fn default() -> Self {
        Self {
            outline_max_radius: 12.0,
            top_band: 40.0,
            top_band_max_radius: 15.0,
            min_radius: 2.0,
        }
    }
}

impl HudFilter {
    /// True if a circle with these parameters should be skipped.
    pub fn rejects(&self, y: f32, radius: f32, fill: bool) -> bool {
        (!fill && radius < self.outline_max_radius)
            || (y < self.top_band && radius <= self.top_band_max_radius)
            || radius < self.min_radius
    }
}

/// Heights above the ground plane, in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Elevations {
    /// Gap between the ground and the bottom of a circle's sphere.
    pub circle_lift: f32,
    pub line: f32,
    pub triangle: f32,
    /// Height of the 3D anchor that text labels are projected from.
    pub text: f32,
    pub range_disc: f32,
    pub invalid_marker: f32,
}

impl Default for Elevations {
    fn default() -> Self {
        Self {
            circle_lift: 2.0,
            line: 2.0,
            triangle: 1.0,
            text: 30.0,
            range_disc: 0.5,
            invalid_marker: 1.5,
        }
    }
}

/// Configuration for one scene adapter instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Identifier of the host container the render surface attaches to.
    pub container_id: String,
    pub logical_size: LogicalSize,
    pub cell_size: f32,
    /// Vertical extent of the orthographic view, in world units.
    pub view_extent: f32,
    /// Upper bound on the device pixel ratio used for the surface.
    pub max_pixel_ratio: f32,
    pub background: Rgb,
    pub ground_color: Rgb,
    pub grid_color: Rgb,
    /// Preview color for a placeable cell when no tower type is selected.
    pub accent: Rgb,
    pub invalid_color: Rgb,
    /// Preview accent per tower type.
    pub tower_accents: BTreeMap<String, Rgb>,
    pub hud_filter: HudFilter,
    pub elevations: Elevations,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            container_id: "game-container".into(),
            logical_size: LogicalSize::default(),
            cell_size: 40.0,
            view_extent: 700.0,
            max_pixel_ratio: 2.0,
            background: Rgb::new(0x1a, 0x1a, 0x2e),
            ground_color: Rgb::new(0x2d, 0x4a, 0x3e),
            grid_color: Rgb::new(0x3e, 0x63, 0x54),
            accent: Rgb::new(0x4f, 0xc3, 0xf7),
            invalid_color: Rgb::new(0xff, 0x44, 0x44),
            tower_accents: BTreeMap::new(),
            hud_filter: HudFilter::default(),
            elevations: Elevations::default(),
        }
    }
}

impl SceneConfig {
    /// Read and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!("loaded scene config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.container_id.is_empty() {
            return Err(ConfigError::Invalid("container_id is empty".into()));
        }
        if !(self.cell_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "cell_size must be positive, got {}",
                self.cell_size
            )));
        }
        let size = self.logical_size;
        if !(size.width > 0.0 && size.height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "logical_size must be positive, got {}x{}",
                size.width, size.height
            )));
        }
        if !(self.view_extent > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "view_extent must be positive, got {}",
                self.view_extent
            )));
        }
        if !(self.max_pixel_ratio >= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "max_pixel_ratio must be at least 1, got {}",
                self.max_pixel_ratio
            )));
        }
        Ok(())
    }

    /// Ground plane extents: the logical size rounded up to whole cells.
    pub fn ground_size(&self) -> (f32, f32) {
        let cell = self.cell_size;
        let size = self.logical_size;
        (
            (size.width / cell).ceil() * cell,
            (size.height / cell).ceil() * cell,
        )
    }

    /// Accent for a placeable preview of the given tower type.
    pub fn accent_for(&self, tower_type: Option<&str>) -> Rgb {
        tower_type
            .and_then(|kind| self.tower_accents.get(kind))
            .copied()
            .unwrap_or(self.accent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = SceneConfig::default();
        config.validate().unwrap();
        assert_eq!(config.container_id, "game-container");
        assert_eq!(config.ground_size(), (800.0, 600.0));
    }

    #[test]
    fn ground_size_rounds_up_to_cells() {
        let config = SceneConfig {
            logical_size: LogicalSize::new(810.0, 590.0),
            ..SceneConfig::default()
        };
        assert_eq!(config.ground_size(), (840.0, 600.0));
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = SceneConfig::from_yaml_str(
            "logical_size: { width: 840, height: 600 }\ntower_accents:\n  cannon: \"#ffb74d\"\n",
        )
        .unwrap();
        assert_eq!(config.logical_size, LogicalSize::new(840.0, 600.0));
        assert_eq!(config.cell_size, 40.0);
        assert_eq!(config.accent_for(Some("cannon")), Rgb::new(0xff, 0xb7, 0x4d));
        assert_eq!(config.accent_for(Some("laser")), config.accent);
        assert_eq!(config.accent_for(None), config.accent);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = SceneConfig::from_yaml_str("cell_size: 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = SceneConfig::from_yaml_str("background: \"blue\"").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn yaml_round_trip_through_file() {
        let mut config = SceneConfig::default();
        config.view_extent = 900.0;
        config
            .tower_accents
            .insert("frost".into(), Rgb::new(0x81, 0xd4, 0xfa));

        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(config.to_yaml_string().unwrap().as_bytes())
            .unwrap();

        let loaded = SceneConfig::load(tmp.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SceneConfig::load(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn hud_filter_thresholds() {
        let filter = HudFilter::default();
        assert!(filter.rejects(18.0, 8.0, false));
        assert!(filter.rejects(20.0, 14.0, true));
        assert!(filter.rejects(300.0, 1.0, true));
        assert!(!filter.rejects(100.0, 20.0, true));
        assert!(!filter.rejects(100.0, 12.0, false));
    }
}
