//! Scene parameters, loadable from JSON. Every field has a default, so a
//! config file only needs the values it changes.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading a scene configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Dimensions of the hut.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RondavelSizes {
    pub height: f32,
    pub radius: f32,
    pub door_height: f32,
    pub window_height: f32,
    pub window_width: f32,
    pub roof_height: f32,
    pub roof_radius: f32,
    pub radial_segments: u32,
}

impl Default for RondavelSizes {
    fn default() -> Self {
        Self {
            height: 2.2,
            radius: 2.5,
            door_height: 2.0,
            window_height: 1.0,
            window_width: 2.0,
            roof_height: 2.0,
            roof_radius: 2.65,
            radial_segments: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    pub color: String,
    pub intensity: f32,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            color: "#b9d5ff".into(),
            intensity: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoonConfig {
    pub color: String,
    pub intensity: f32,
    pub position: [f32; 3],
    pub cast_shadow: bool,
    pub shadow_map_size: u32,
}

impl Default for MoonConfig {
    fn default() -> Self {
        Self {
            color: "#ffffff".into(),
            intensity: 0.75,
            position: [4.0, 5.0, -2.0],
            cast_shadow: true,
            shadow_map_size: 512,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub enable_damping: bool,
    pub damping_factor: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 100.0,
            position: [4.0, 2.0, 5.0],
            enable_damping: true,
            damping_factor: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub clear_color: String,
    pub shadows: bool,
    /// Percentage-closer filtering over a kernel instead of a single tap.
    pub soft_shadows: bool,
    /// Upper bound applied to the host's device pixel ratio.
    pub max_pixel_ratio: f64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: "#262837".into(),
            shadows: true,
            soft_shadows: true,
            max_pixel_ratio: 2.0,
        }
    }
}

/// Everything needed to assemble the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub rondavel: RondavelSizes,
    pub body_color: String,
    pub roof_color: String,
    pub floor_color: String,
    pub floor_size: f32,
    pub ambient: AmbientConfig,
    pub moon: MoonConfig,
    pub camera: CameraConfig,
    pub renderer: RendererConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            rondavel: RondavelSizes::default(),
            body_color: "brown".into(),
            roof_color: "yellow".into(),
            floor_color: "green".into(),
            floor_size: 20.0,
            ambient: AmbientConfig::default(),
            moon: MoonConfig::default(),
            camera: CameraConfig::default(),
            renderer: RendererConfig::default(),
        }
    }
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        tracing::info!("loaded scene config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_object_gives_defaults() {
        let config = SceneConfig::from_json("{}").unwrap();
        assert_eq!(config, SceneConfig::default());
        assert_eq!(config.rondavel.radius, 2.5);
        assert_eq!(config.camera.fov_degrees, 75.0);
        assert_eq!(config.renderer.max_pixel_ratio, 2.0);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config =
            SceneConfig::from_json(r#"{ "moon": { "intensity": 0.3 }, "floor_size": 40 }"#)
                .unwrap();
        assert_eq!(config.moon.intensity, 0.3);
        assert_eq!(config.moon.position, [4.0, 5.0, -2.0]);
        assert_eq!(config.floor_size, 40.0);
    }

    #[test]
    fn json_roundtrip() {
        let config = SceneConfig::default();
        let json = config.to_json_pretty().unwrap();
        assert_eq!(SceneConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "body_color": "tan" }}"#).unwrap();
        let config = SceneConfig::load(file.path()).unwrap();
        assert_eq!(config.body_color, "tan");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SceneConfig::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn malformed_json_is_json_error() {
        assert!(matches!(
            SceneConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
