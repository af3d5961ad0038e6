//! Viewer configuration.
//!
//! Every value has a default matching the stock scene, so a config file only
//! needs the fields it changes. Command-line flags are applied on top.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::animation::DEFAULT_SPIN_STEP;
use crate::cli::Cli;
use crate::core::Layout;
use crate::math::Color;
use crate::normalize::MaterialDefaults;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub orbit: OrbitConfig,
    pub model: ModelViewConfig,
    pub fallback: FallbackViewConfig,
}

impl ViewerConfig {
    /// Read a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_json(&text).with_context(|| format!("Invalid config file: {:?}", path))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Defaults, overlaid with the config file named on the command line and then the flags
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        Ok(config)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(model) = &cli.model {
            self.model.model_path = model.clone();
        }
        if let Some(environment) = &cli.environment {
            self.model.environment_path = Some(environment.clone());
        }
        if cli.no_environment {
            self.model.environment_path = None;
        }
        if let Some(layout) = cli.layout {
            self.window.layout = layout;
        }
        if cli.no_ui {
            self.window.show_ui = false;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub layout: Layout,
    pub show_ui: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Model Viewer".to_string(),
            width: 1280,
            height: 800,
            layout: Layout::Stacked,
            show_ui: true,
        }
    }
}

/// Orbit control tuning, defaults follow three.js OrbitControls as wrapped by drei
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            enable_damping: true,
            damping_factor: 0.05,
            min_distance: 0.1,
            max_distance: 500.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 28.0,
            near: 0.1,
            far: 1000.0,
            position: [0.0, 2.0, 5.0],
            target: [0.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientLightConfig {
    pub color: Color,
    pub intensity: f32,
}

impl Default for AmbientLightConfig {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 0.2,
        }
    }
}

/// Orthographic shadow camera of the directional light
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    pub map_size: u32,
    pub near: f32,
    pub far: f32,
    /// Half width and half height of the shadow frustum
    pub extent: f32,
    pub bias: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_size: 2048,
            near: 0.5,
            far: 50.0,
            extent: 5.0,
            bias: 0.0015,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalLightConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub color: Color,
    pub intensity: f32,
    pub cast_shadow: bool,
    pub shadow: ShadowConfig,
}

impl Default for DirectionalLightConfig {
    fn default() -> Self {
        Self {
            position: [5.0, 10.0, 5.0],
            target: [0.0, 0.0, 0.0],
            color: Color::WHITE,
            intensity: 1.5,
            cast_shadow: true,
            shadow: ShadowConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HemisphereLightConfig {
    pub sky: Color,
    pub ground: Color,
    pub intensity: f32,
}

impl Default for HemisphereLightConfig {
    fn default() -> Self {
        Self {
            sky: Color::WHITE,
            ground: Color::new(0.485_150, 0.194_618, 0.014_444),
            intensity: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub ambient: AmbientLightConfig,
    pub directional: DirectionalLightConfig,
    pub hemisphere: Option<HemisphereLightConfig>,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient: AmbientLightConfig::default(),
            directional: DirectionalLightConfig::default(),
            hemisphere: Some(HemisphereLightConfig::default()),
        }
    }
}

/// The spinning, normalized model and its environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelViewConfig {
    pub model_path: PathBuf,
    pub environment_path: Option<PathBuf>,
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    pub shadows: bool,
    pub spin_step: f32,
    pub material_defaults: MaterialDefaults,
    pub background: Color,
}

impl Default for ModelViewConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("assets/ferrarifree/scene.gltf"),
            environment_path: Some(PathBuf::from("assets/music_hall_02_4k.hdr")),
            camera: CameraConfig::default(),
            lighting: LightingConfig::default(),
            shadows: true,
            spin_step: DEFAULT_SPIN_STEP,
            material_defaults: MaterialDefaults::default(),
            background: Color::new(0.01, 0.01, 0.012),
        }
    }
}

/// The standalone box view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackViewConfig {
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    pub shadows: bool,
    pub box_size: [f32; 3],
    pub color: Color,
    pub background: Color,
}

impl Default for FallbackViewConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig {
                fov: 75.0,
                position: [0.0, 0.0, 5.0],
                ..CameraConfig::default()
            },
            lighting: LightingConfig {
                ambient: AmbientLightConfig {
                    intensity: 0.5,
                    ..AmbientLightConfig::default()
                },
                directional: DirectionalLightConfig {
                    position: [10.0, 10.0, 10.0],
                    intensity: 1.0,
                    cast_shadow: false,
                    ..DirectionalLightConfig::default()
                },
                hemisphere: None,
            },
            shadows: false,
            box_size: [2.0, 3.0, 2.0],
            color: Color::PINK,
            background: Color::new(0.02, 0.02, 0.02),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults_match_stock_scene() {
        let config = ViewerConfig::default();
        assert_eq!(config.model.camera.fov, 28.0);
        assert_eq!(config.model.camera.position, [0.0, 2.0, 5.0]);
        assert_eq!(config.model.lighting.ambient.intensity, 0.2);
        assert_eq!(config.model.lighting.directional.intensity, 1.5);
        assert_eq!(config.model.lighting.directional.shadow.map_size, 2048);
        assert_eq!(config.model.lighting.directional.shadow.far, 50.0);
        assert_eq!(config.model.spin_step, 0.002);
        assert_eq!(config.model.material_defaults.roughness, 0.5);

        assert_eq!(config.fallback.camera.fov, 75.0);
        assert_eq!(config.fallback.box_size, [2.0, 3.0, 2.0]);
        assert!(!config.fallback.shadows);
    }

    #[test]
    fn test_hemisphere_ground_matches_hex() {
        let hemisphere = HemisphereLightConfig::default();
        let expected = Color::from_hex("#b97a20").unwrap();
        assert!(hemisphere.ground.approx_eq(&expected, 1e-4));
    }

    #[test]
    fn test_partial_json_keeps_other_defaults() {
        let config = ViewerConfig::from_json(
            r##"{
                "model": { "spin_step": 0.01, "material_defaults": { "metalness": 0.1 } },
                "window": { "layout": "fallback-only" }
            }"##,
        )
        .unwrap();

        assert_eq!(config.model.spin_step, 0.01);
        assert_eq!(config.model.material_defaults.metalness, 0.1);
        assert_eq!(config.model.material_defaults.roughness, 0.5);
        assert_eq!(config.model.camera.fov, 28.0);
        assert_eq!(config.window.layout, Layout::FallbackOnly);
        assert_eq!(config.window.width, 1280);
    }

    #[test]
    fn test_invalid_color_is_rejected() {
        let result = ViewerConfig::from_json(r##"{ "fallback": { "color": "#12" } }"##);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "model-viewer",
            "--model",
            "car.glb",
            "--layout",
            "model-only",
            "--no-ui",
            "--no-environment",
        ]);
        let mut config = ViewerConfig::default();
        config.apply_cli(&cli);

        assert_eq!(config.model.model_path, PathBuf::from("car.glb"));
        assert_eq!(config.model.environment_path, None);
        assert_eq!(config.window.layout, Layout::ModelOnly);
        assert!(!config.window.show_ui);
    }

    #[test]
    fn test_missing_config_file_errors() {
        let error = ViewerConfig::load("does/not/exist.json").unwrap_err();
        assert!(format!("{:#}", error).contains("Failed to read config file"));
    }
}
