//! The complete scene, independent of any window or GPU.
//!
//! [`Scene`] owns the generated field, the animation state and the camera,
//! and exposes the handful of operations the runner drives: advance one
//! frame, ask for orientation permission, resize, and read back what to draw.

use crate::animation::{advance, AnimationParams, FrameInput, SimState};
use crate::backdrop::Backdrop;
use crate::camera::{Projection, TiltMapping};
use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::orientation::{CameraMode, OrientationSource, PermissionGate, PermissionStatus};
use crate::shader::DiamondInstance;
use crate::spawn::DiamondField;
use glam::Mat4;
use std::fmt;
use tracing::info;

/// Debug readout of the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugSnapshot {
    pub mode: CameraMode,
    pub camera_y: f32,
    pub frame: u64,
    pub time: f64,
    pub diamonds: usize,
    pub permission: Option<PermissionStatus>,
}

impl fmt::Display for DebugSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            CameraMode::AwaitingPermission => "click to enable device motion",
            CameraMode::OrientationActive => "device motion",
        };
        write!(
            f,
            "{mode} | camera y {:.2} | frame {} | {} diamonds",
            self.camera_y, self.frame, self.diamonds
        )
    }
}

pub struct Scene {
    field: DiamondField,
    params: AnimationParams,
    tilt: TiltMapping,
    projection: Projection,
    backdrop: Backdrop,
    gate: PermissionGate,
    diamond_size: f32,
    seed: u64,
    state: SimState,
}

impl Scene {
    /// Generate the field and set up the camera for the configured window.
    pub fn new(config: &SceneConfig) -> Result<Self, SceneError> {
        crate::config::validate(config)?;

        let params = config.field.params()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let field = DiamondField::generate(params, config.field.layer_speed, seed);
        info!(
            "generated {} diamonds in {} layers (seed {seed})",
            field.len(),
            params.num_layers()
        );

        let tilt = config.camera.tilt();
        let projection = config
            .camera
            .projection(config.window.width, config.window.height);
        let backdrop = Backdrop::new(&config.backdrop, &projection);
        let state = SimState::initial(&field, &config.animation, tilt.resting_pose());

        Ok(Self {
            field,
            params: config.animation,
            tilt,
            projection,
            backdrop,
            gate: PermissionGate::new(),
            diamond_size: config.field.diamond_size,
            seed,
            state,
        })
    }

    /// Advance one frame, reading the latest sample once orientation is on.
    pub fn frame(&mut self, source: &mut dyn OrientationSource) {
        let sample = if self.gate.is_active() {
            source.poll()
        } else {
            None
        };

        let input = FrameInput {
            field: &self.field,
            params: &self.params,
            tilt: &self.tilt,
            sample,
        };
        self.state = advance(std::mem::take(&mut self.state), input);
    }

    /// Ask `source` for orientation access. Idempotent once granted.
    pub fn request_permission(&mut self, source: &mut dyn OrientationSource) -> CameraMode {
        let mode = self.gate.request(source);
        self.state.mode = mode;
        mode
    }

    /// New viewport size. Diamond transforms are unaffected.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
        self.backdrop.fit(&self.projection);
    }

    pub fn snapshot(&self) -> DebugSnapshot {
        DebugSnapshot {
            mode: self.state.mode,
            camera_y: self.state.camera.position.y,
            frame: self.state.frame,
            time: self.state.time,
            diamonds: self.field.len(),
            permission: self.gate.last_status(),
        }
    }

    /// Combined projection and view matrix.
    pub fn view_proj(&self) -> Mat4 {
        self.projection.matrix() * self.state.camera.view_matrix()
    }

    /// Fill `out` with one instance per diamond.
    pub fn write_instances(&self, out: &mut Vec<DiamondInstance>) {
        out.clear();
        out.extend(self.state.transforms.iter().map(DiamondInstance::from));
    }

    #[inline]
    pub fn state(&self) -> &SimState {
        &self.state
    }

    #[inline]
    pub fn field(&self) -> &DiamondField {
        &self.field
    }

    #[inline]
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    #[inline]
    pub fn backdrop(&self) -> &Backdrop {
        &self.backdrop
    }

    #[inline]
    pub fn mode(&self) -> CameraMode {
        self.state.mode
    }

    /// Octahedron radius.
    #[inline]
    pub fn diamond_size(&self) -> f32 {
        self.diamond_size
    }

    /// Seed the field was generated with.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}
