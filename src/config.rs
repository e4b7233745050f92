//! Scene configuration.
//!
//! Loaded from TOML. Every section has defaults, so a partial file (or no
//! file at all) yields the stock scene: an 8×16×24 diamond sphere of radius 8
//! in front of a video plane, camera 15 units back.
//!
//! ```toml
//! seed = 42
//!
//! [field]
//! num_layers = 6
//! layer_speed = { mode = "shared", speed = 0.5 }
//!
//! [animation]
//! time_scale = 0.5
//!
//! [backdrop]
//! kind = "skybox"
//!
//! [video]
//! path = "assets/footage"
//! filter = "nearest"
//! ```

use crate::animation::AnimationParams;
use crate::backdrop::BackdropKind;
use crate::camera::{Projection, TiltMapping};
use crate::error::ConfigError;
use crate::orientation::OrientationSample;
use crate::spawn::{FieldParams, LayerSpeed};
use crate::textures::{AddressMode, FilterMode};
use crate::video::DeviceClass;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Seed for the cosmetic randomness. Random when absent.
    pub seed: Option<u64>,
    pub field: FieldConfig,
    pub animation: AnimationParams,
    pub camera: CameraConfig,
    pub backdrop: BackdropConfig,
    pub video: VideoConfig,
    pub orientation: OrientationConfig,
    pub window: WindowConfig,
}

/// Diamond sphere shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub num_layers: u32,
    pub num_rings: u32,
    pub diamonds_per_ring: u32,
    pub max_radius: f32,
    /// Octahedron radius.
    pub diamond_size: f32,
    pub layer_speed: LayerSpeed,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            num_layers: 8,
            num_rings: 16,
            diamonds_per_ring: 24,
            max_radius: 8.0,
            diamond_size: 0.3,
            layer_speed: LayerSpeed::default(),
        }
    }
}

impl FieldConfig {
    pub fn params(&self) -> Result<FieldParams, crate::error::SceneError> {
        FieldParams::new(
            self.num_layers,
            self.num_rings,
            self.diamonds_per_ring,
            self.max_radius,
        )
    }
}

/// Projection and tilt mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub distance: f32,
    pub tilt_offset: f32,
    pub smoothing: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let tilt = TiltMapping::default();
        Self {
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            distance: tilt.distance,
            tilt_offset: tilt.tilt_offset,
            smoothing: tilt.smoothing,
        }
    }
}

impl CameraConfig {
    pub fn tilt(&self) -> TiltMapping {
        TiltMapping {
            distance: self.distance,
            tilt_offset: self.tilt_offset,
            smoothing: self.smoothing,
        }
    }

    pub fn projection(&self, width: u32, height: u32) -> Projection {
        Projection::new(self.fov_y_degrees, width, height, self.near, self.far)
    }
}

/// Video backdrop placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackdropConfig {
    pub kind: BackdropKind,
    /// Distance of the plane behind the origin.
    pub plane_distance: f32,
    pub skybox_radius: f32,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            kind: BackdropKind::Plane,
            plane_distance: 15.0,
            skybox_radius: 500.0,
        }
    }
}

/// Video texture asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Directory of frames or a single image. Procedural when absent.
    pub path: Option<PathBuf>,
    /// Playback rate of an image sequence.
    pub fps: f32,
    /// Forces the mobile (interaction-gated) playback policy when set.
    pub device_class: Option<DeviceClass>,
    /// Sampler filter for every frame.
    pub filter: FilterMode,
    pub address_mode: AddressMode,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            path: None,
            fps: 30.0,
            device_class: None,
            filter: FilterMode::Linear,
            address_mode: AddressMode::ClampToEdge,
        }
    }
}

/// Which orientation source drives the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrientationKind {
    /// Pointer position emulates device tilt.
    #[default]
    Pointer,
    /// Replay `orientation.script`.
    Scripted,
    /// No orientation API.
    None,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationConfig {
    pub source: OrientationKind,
    pub script: Vec<OrientationSample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "kaleido".into(),
            width: 1280,
            height: 720,
        }
    }
}

/// Load config from a TOML file. Missing fields take their defaults.
pub fn load_from_path(path: &Path) -> Result<SceneConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::ParseError(format!("failed to read {}: {e}", path.display()))
    })?;

    let config = parse(&content)?;
    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Parse and validate a TOML string.
pub fn parse(content: &str) -> Result<SceneConfig, ConfigError> {
    let config: SceneConfig = toml::from_str(content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;
    validate(&config)?;
    Ok(config)
}

/// Run all validations, collecting every error.
pub fn validate(config: &SceneConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    let field = &config.field;
    validate_min(&mut errors, "field.num_layers", field.num_layers, 1);
    validate_min(&mut errors, "field.num_rings", field.num_rings, 2);
    validate_min(&mut errors, "field.diamonds_per_ring", field.diamonds_per_ring, 1);
    validate_positive(&mut errors, "field.max_radius", field.max_radius);
    validate_positive(&mut errors, "field.diamond_size", field.diamond_size);
    match field.layer_speed {
        LayerSpeed::Shared { speed } => {
            validate_finite(&mut errors, "field.layer_speed.speed", speed);
        }
        LayerSpeed::RandomPerLayer { min, max } => {
            validate_finite(&mut errors, "field.layer_speed.min", min);
            validate_finite(&mut errors, "field.layer_speed.max", max);
            if min > max {
                errors.push(format!("field.layer_speed: min ({min}) exceeds max ({max})"));
            }
        }
    }

    let anim = &config.animation;
    validate_positive(&mut errors, "animation.time_step", anim.time_step);
    validate_range(&mut errors, "animation.time_scale", anim.time_scale, 0.0, 100.0);
    validate_finite(&mut errors, "animation.layer_delay", anim.layer_delay);
    validate_finite(&mut errors, "animation.pulse_frequency", anim.pulse_frequency);
    validate_range(&mut errors, "animation.pulse_amplitude", anim.pulse_amplitude, 0.0, 0.99);
    validate_positive(&mut errors, "animation.scale_base", anim.scale_base);
    validate_finite(&mut errors, "animation.scale_gain", anim.scale_gain);
    validate_finite(&mut errors, "animation.spin_base", anim.spin_base);
    validate_finite(&mut errors, "animation.spin_per_layer", anim.spin_per_layer);

    let cam = &config.camera;
    validate_range(&mut errors, "camera.fov_y_degrees", cam.fov_y_degrees, 1.0, 179.0);
    validate_positive(&mut errors, "camera.near", cam.near);
    if cam.far <= cam.near {
        errors.push(format!("camera.far ({}) must exceed camera.near ({})", cam.far, cam.near));
    }
    validate_positive(&mut errors, "camera.distance", cam.distance);
    validate_finite(&mut errors, "camera.tilt_offset", cam.tilt_offset);
    if !(cam.smoothing > 0.0 && cam.smoothing <= 1.0) {
        errors.push(format!("camera.smoothing must be in (0, 1], got {}", cam.smoothing));
    }

    validate_positive(&mut errors, "backdrop.plane_distance", config.backdrop.plane_distance);
    validate_positive(
        &mut errors,
        "backdrop.skybox_radius",
        config.backdrop.skybox_radius,
    );
    validate_range(&mut errors, "video.fps", config.video.fps, 1.0, 240.0);

    let orientation = &config.orientation;
    if orientation.source == OrientationKind::Scripted && orientation.script.is_empty() {
        errors.push("orientation.script must not be empty for the scripted source".into());
    }

    validate_min(&mut errors, "window.width", config.window.width, 1);
    validate_min(&mut errors, "window.height", config.window.height, 1);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_min(errors: &mut Vec<String>, name: &str, value: u32, min: u32) {
    if value < min {
        errors.push(format!("{name} must be >= {min}, got {value}"));
    }
}

fn validate_finite(errors: &mut Vec<String>, name: &str, value: f32) {
    if !value.is_finite() {
        errors.push(format!("{name} must be finite, got {value}"));
    }
}

fn validate_positive(errors: &mut Vec<String>, name: &str, value: f32) {
    if !(value.is_finite() && value > 0.0) {
        errors.push(format!("{name} must be > 0, got {value}"));
    }
}

fn validate_range(errors: &mut Vec<String>, name: &str, value: f32, min: f32, max: f32) {
    if !(min..=max).contains(&value) {
        errors.push(format!("{name} must be between {min} and {max}, got {value}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::SpinMode;
    use std::io::Write;

    #[test]
    fn default_config_validates() {
        assert!(validate(&SceneConfig::default()).is_ok());
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config, SceneConfig::default());
        assert_eq!(config.field.num_layers, 8);
        assert_eq!(config.animation.layer_delay, 0.5);
        assert_eq!(config.camera.fov_y_degrees, 75.0);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = parse(
            r#"
            seed = 7

            [field]
            num_layers = 4
            layer_speed = { mode = "shared", speed = 0.5 }

            [animation]
            spin_mode = "accumulated"

            [backdrop]
            kind = "skybox"

            [video]
            filter = "nearest"
            address_mode = "mirror_repeat"

            [orientation]
            source = "scripted"
            script = [{ alpha = 0.0, beta = 10.0, gamma = -5.0 }]
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(7));
        assert_eq!(config.video.filter, FilterMode::Nearest);
        assert_eq!(config.video.address_mode, AddressMode::MirrorRepeat);
        assert_eq!(config.video.fps, 30.0);
        assert_eq!(config.field.num_layers, 4);
        assert_eq!(config.field.num_rings, 16);
        assert_eq!(config.field.layer_speed, LayerSpeed::Shared { speed: 0.5 });
        assert_eq!(config.animation.spin_mode, SpinMode::Accumulated);
        assert_eq!(config.animation.time_step, 0.01);
        assert_eq!(config.backdrop.kind, BackdropKind::Skybox);
        assert_eq!(config.orientation.script.len(), 1);
    }

    #[test]
    fn validation_collects_all_errors() {
        let mut config = SceneConfig::default();
        config.field.num_rings = 1;
        config.field.max_radius = -1.0;
        config.camera.smoothing = 0.0;

        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("field.num_rings"));
        assert!(err.contains("field.max_radius"));
        assert!(err.contains("camera.smoothing"));
    }

    #[test]
    fn scripted_source_requires_script() {
        let err = parse("[orientation]\nsource = \"scripted\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = parse("[field\nnum_layers = ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_missing_path() {
        let err = load_from_path(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[camera]\ndistance = 20.0").unwrap();
        let config = load_from_path(file.path()).unwrap();
        assert_eq!(config.camera.distance, 20.0);
        assert_eq!(config.camera.tilt().distance, 20.0);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let mut config = SceneConfig::default();
        config.seed = Some(3);
        config.video.path = Some(PathBuf::from("assets/footage"));
        let text = toml::to_string(&config).unwrap();
        assert_eq!(parse(&text).unwrap(), config);
    }
}
