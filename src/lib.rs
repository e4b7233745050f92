//! # kaleido
//!
//! A sphere of spinning, video-textured diamonds in front of a video
//! backdrop, viewed through a camera that follows device tilt.
//!
//! ## Quick Start
//!
//! ```ignore
//! use kaleido::prelude::*;
//!
//! fn main() -> Result<(), SceneError> {
//!     let (source, feed) = LiveOrientation::new();
//!     Simulation::new()
//!         .with_config(SceneConfig::default())
//!         .with_orientation_source(source)
//!         .with_pointer_feed(feed)
//!         .run()
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### The field
//!
//! [`spawn::DiamondField::generate`] places `num_layers × num_rings ×
//! diamonds_per_ring` octahedra on concentric spherical shells. Positions are
//! fully determined by the shape parameters; only the initial rotations and
//! the per-layer revolve speeds come from the seed.
//!
//! ### Animation
//!
//! [`animation::advance`] is a pure step from one [`animation::SimState`] to
//! the next. Each layer pulses toward the origin with a phase delay, so the
//! inner shells collapse first and the outer ones follow.
//!
//! ### Camera
//!
//! Until orientation permission is granted the camera rests on the +Z axis.
//! Afterwards its position is offset by the latest tilt sample while it keeps
//! looking at the origin. See [`orientation`] for the sources of samples.
//!
//! ### Video
//!
//! [`video::VideoSource`] loops a directory of frames (or a still image, or a
//! generated pattern). Both the diamonds and the backdrop sample the current
//! frame. On mobile-class devices playback waits for the first interaction.

pub mod animation;
pub mod backdrop;
pub mod camera;
pub mod config;
pub mod error;
mod gpu;
pub mod input;
pub mod mesh;
pub mod orientation;
pub mod scene;
pub mod shader;
mod simulation;
pub mod spawn;
pub mod textures;
pub mod time;
pub mod video;

pub use glam::{Vec2, Vec3, Vec4};

pub use animation::{advance, AnimationParams, DiamondTransform, FrameInput, SimState, SpinMode};
pub use backdrop::{Backdrop, BackdropKind};
pub use camera::{CameraPose, Projection, TiltMapping};
pub use config::SceneConfig;
pub use error::{ConfigError, GpuError, SceneError, VideoError};
pub use orientation::{
    CameraMode, LiveOrientation, OrientationFeed, OrientationSample, OrientationSource,
    PermissionGate, PermissionStatus, ScriptedOrientation, UnsupportedOrientation,
};
pub use scene::{DebugSnapshot, Scene};
pub use simulation::Simulation;
pub use spawn::{Diamond, DiamondField, FieldParams, LayerSpeed};
pub use textures::{AddressMode, FilterMode, TextureConfig};
pub use video::{DeviceClass, PlaybackPolicy, PlaybackState, VideoSource};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use kaleido::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::SceneConfig;
    pub use crate::error::SceneError;
    pub use crate::orientation::{
        LiveOrientation, OrientationSample, OrientationSource, PermissionStatus,
        ScriptedOrientation, UnsupportedOrientation,
    };
    pub use crate::scene::Scene;
    pub use crate::simulation::Simulation;
    pub use crate::{Vec2, Vec3, Vec4};
}
