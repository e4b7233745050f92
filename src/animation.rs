//! Per-frame animation of the diamond field.
//!
//! All frame state lives in [`SimState`]. [`advance`] is a pure function from
//! one state to the next: it steps simulation time, moves the camera from the
//! latest orientation sample, and recomputes every diamond transform from its
//! initial position. Nothing here touches the GPU.
//!
//! Each layer pulses toward the origin on a delayed sine:
//!
//! ```text
//! convergence = max(0, sin(time * 1.5 - layer * 0.5) * 0.9)    in [0, 0.9]
//! position    = rotate_z(initial, time * layer_speed) * (1 - convergence)
//! scale       = 0.9 + convergence * 0.2                          in [0.9, 1.1]
//! ```

use crate::camera::{CameraPose, TiltMapping};
use crate::orientation::{CameraMode, OrientationSample};
use crate::spawn::{Diamond, DiamondField};
use crate::Vec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// How a diamond's own orientation evolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinMode {
    /// `initial_rotation + spin_speed * frame`.
    #[default]
    Derived,
    /// `rotation += spin_speed` every frame.
    Accumulated,
}

/// Tunable constants of the animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationParams {
    /// Simulation time added per frame before scaling.
    pub time_step: f32,
    /// Slow-down/speed-up multiplier on `time_step`.
    pub time_scale: f32,
    /// Phase delay between consecutive layers.
    pub layer_delay: f32,
    /// Angular frequency of the convergence pulse.
    pub pulse_frequency: f32,
    /// Peak convergence. Must stay in `[0, 1)`.
    pub pulse_amplitude: f32,
    /// Scale of a diamond at rest.
    pub scale_base: f32,
    /// Extra scale at full convergence, per unit of convergence.
    pub scale_gain: f32,
    /// Self-rotation per frame for layer 0.
    pub spin_base: f32,
    /// Additional self-rotation per frame per layer.
    pub spin_per_layer: f32,
    pub spin_mode: SpinMode,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            time_step: 0.01,
            time_scale: 1.0,
            layer_delay: 0.5,
            pulse_frequency: 1.5,
            pulse_amplitude: 0.9,
            scale_base: 0.9,
            scale_gain: 0.2,
            spin_base: 0.02,
            spin_per_layer: 0.003,
            spin_mode: SpinMode::Derived,
        }
    }
}

impl AnimationParams {
    /// Simulation time added by one frame.
    #[inline]
    pub fn step(&self) -> f64 {
        f64::from(self.time_step) * f64::from(self.time_scale)
    }

    /// Pulsing collapse amount for a layer, in `[0, pulse_amplitude]`.
    #[inline]
    pub fn convergence(&self, time: f64, layer_index: u32) -> f32 {
        let delay = f64::from(layer_index) * f64::from(self.layer_delay);
        let phase = time * f64::from(self.pulse_frequency) - delay;
        (phase.sin() * f64::from(self.pulse_amplitude)).max(0.0) as f32
    }

    /// Radial multiplier applied to rotated positions, in `[1 - amplitude, 1]`.
    #[inline]
    pub fn convergence_scale(&self, time: f64, layer_index: u32) -> f32 {
        1.0 - self.convergence(time, layer_index)
    }

    /// Self-rotation per frame for a layer.
    #[inline]
    pub fn spin_speed(&self, layer_index: u32) -> f32 {
        self.spin_base + layer_index as f32 * self.spin_per_layer
    }
}

/// Transient per-frame transform of one diamond.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiamondTransform {
    pub position: Vec3,
    /// Euler angles (XYZ order) in radians, each in `[0, 2π)`.
    pub rotation: Vec3,
    pub scale: f32,
}

/// Everything that changes from frame to frame.
#[derive(Debug, Clone, Default)]
pub struct SimState {
    /// Simulation time. Kept in `f64` so the step stays exact in long sessions.
    pub time: f64,
    /// Frames advanced so far.
    pub frame: u64,
    pub camera: CameraPose,
    pub mode: CameraMode,
    pub transforms: Vec<DiamondTransform>,
}

impl SimState {
    /// State before the first frame: every diamond evaluated at time zero.
    pub fn initial(field: &DiamondField, params: &AnimationParams, camera: CameraPose) -> Self {
        let transforms = field
            .diamonds()
            .iter()
            .map(|d| {
                diamond_transform(
                    params,
                    0.0,
                    0,
                    d,
                    d.initial_rotation,
                    field.layer_speed(d.layer_index),
                )
            })
            .collect();

        Self {
            time: 0.0,
            frame: 0,
            camera,
            mode: CameraMode::AwaitingPermission,
            transforms,
        }
    }
}

/// Rotate a point about the Z axis, keeping `z`.
#[inline]
pub fn rotate_z(p: Vec3, angle: f32) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    Vec3::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos, p.z)
}

#[inline]
fn wrap_angle(angle: f64) -> f32 {
    angle.rem_euclid(TAU) as f32
}

fn wrap_euler(base: Vec3, delta: f64) -> Vec3 {
    Vec3::new(
        wrap_angle(f64::from(base.x) + delta),
        wrap_angle(f64::from(base.y) + delta),
        wrap_angle(f64::from(base.z) + delta),
    )
}

/// Transform of one diamond at simulation time `time`.
///
/// `previous_rotation` is only read in [`SpinMode::Accumulated`].
pub fn diamond_transform(
    params: &AnimationParams,
    time: f64,
    frame: u64,
    diamond: &Diamond,
    previous_rotation: Vec3,
    layer_speed: f32,
) -> DiamondTransform {
    let layer = diamond.layer_index;
    let convergence = params.convergence(time, layer);
    let orbit = wrap_angle(time * f64::from(layer_speed));
    let rotated = rotate_z(diamond.initial_position, orbit);

    let spin = f64::from(params.spin_speed(layer));
    let rotation = match params.spin_mode {
        SpinMode::Derived => wrap_euler(diamond.initial_rotation, spin * frame as f64),
        SpinMode::Accumulated => wrap_euler(previous_rotation, spin),
    };

    DiamondTransform {
        position: rotated * (1.0 - convergence),
        rotation,
        scale: params.scale_base + convergence * params.scale_gain,
    }
}

/// Input to one animation step.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub field: &'a DiamondField,
    pub params: &'a AnimationParams,
    pub tilt: &'a TiltMapping,
    /// Latest orientation sample, if the source produced one.
    pub sample: Option<OrientationSample>,
}

/// Advance the simulation by one frame.
pub fn advance(mut state: SimState, input: FrameInput<'_>) -> SimState {
    state.time += input.params.step();
    state.frame += 1;

    state.camera = match (state.mode, input.sample) {
        (CameraMode::OrientationActive, Some(sample)) => {
            input.tilt.follow(&state.camera, &sample)
        }
        (CameraMode::OrientationActive, None) => state.camera,
        (CameraMode::AwaitingPermission, _) => input.tilt.resting_pose(),
    };

    let (time, frame) = (state.time, state.frame);
    for (transform, diamond) in state.transforms.iter_mut().zip(input.field.diamonds()) {
        *transform = diamond_transform(
            input.params,
            time,
            frame,
            diamond,
            transform.rotation,
            input.field.layer_speed(diamond.layer_index),
        );
    }

    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawn::{FieldParams, LayerSpeed};

    fn field() -> DiamondField {
        DiamondField::generate(
            FieldParams::new(8, 16, 24, 8.0).unwrap(),
            LayerSpeed::Shared { speed: 0.5 },
            11,
        )
    }

    #[test]
    fn test_convergence_scale_bounds() {
        let params = AnimationParams::default();
        for layer in 0..8 {
            for step in 0..5000 {
                let t = f64::from(step) * 0.013;
                let s = params.convergence_scale(t, layer);
                assert!((0.1 - 1e-6..=1.0).contains(&s), "scale {s} at t={t}");
            }
        }
    }

    #[test]
    fn test_convergence_zero_at_start_for_first_layer() {
        let params = AnimationParams::default();
        assert_eq!(params.convergence(0.0, 0), 0.0);
        assert_eq!(params.convergence_scale(0.0, 0), 1.0);
        // Later layers start in the negative half of the sine.
        assert_eq!(params.convergence(0.0, 3), 0.0);
    }

    #[test]
    fn test_convergence_peak() {
        let params = AnimationParams::default();
        // sin peaks at time * 1.5 = π/2
        let t = std::f64::consts::FRAC_PI_2 / 1.5;
        assert!((params.convergence(t, 0) - 0.9).abs() < 1e-5);
        assert!((params.convergence_scale(t, 0) - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_rotate_z() {
        let p = rotate_z(Vec3::new(1.0, 0.0, 3.0), std::f32::consts::FRAC_PI_2);
        assert!((p - Vec3::new(0.0, 1.0, 3.0)).length() < 1e-6);
    }

    #[test]
    fn test_transform_at_time_zero_is_initial_position() {
        let params = AnimationParams::default();
        let field = field();
        for d in field.diamonds().iter().filter(|d| d.layer_index == 0) {
            let speed = field.layer_speed(d.layer_index);
            let t = diamond_transform(&params, 0.0, 0, d, d.initial_rotation, speed);
            assert_eq!(t.position, d.initial_position);
            assert_eq!(t.rotation, d.initial_rotation);
            assert!((t.scale - 0.9).abs() < 1e-6);
        }
    }

    #[test]
    fn test_advance_steps_time_and_frame() {
        let field = field();
        let params = AnimationParams {
            time_scale: 0.5,
            ..AnimationParams::default()
        };
        let tilt = TiltMapping::default();
        let mut state = SimState::initial(&field, &params, tilt.resting_pose());
        for _ in 0..10 {
            state = advance(
                state,
                FrameInput {
                    field: &field,
                    params: &params,
                    tilt: &tilt,
                    sample: None,
                },
            );
        }
        assert_eq!(state.frame, 10);
        assert!((state.time - 0.05).abs() < 1e-6);
        assert_eq!(state.transforms.len(), field.len());
    }

    #[test]
    fn test_awaiting_permission_ignores_samples() {
        let field = field();
        let params = AnimationParams::default();
        let tilt = TiltMapping::default();
        let state = SimState::initial(&field, &params, tilt.resting_pose());
        let state = advance(
            state,
            FrameInput {
                field: &field,
                params: &params,
                tilt: &tilt,
                sample: Some(OrientationSample::new(0.0, 45.0, 45.0)),
            },
        );
        assert_eq!(state.camera, tilt.resting_pose());
    }

    #[test]
    fn test_active_camera_follows_sample() {
        let field = field();
        let params = AnimationParams::default();
        let tilt = TiltMapping::default();
        let mut state = SimState::initial(&field, &params, tilt.resting_pose());
        state.mode = CameraMode::OrientationActive;

        let sample = OrientationSample::new(0.0, 45.0, -45.0);
        let input = FrameInput {
            field: &field,
            params: &params,
            tilt: &tilt,
            sample: Some(sample),
        };
        let state = advance(state, input);
        let first = state.camera;
        assert_eq!(first, tilt.target_pose(&sample));

        let state = advance(state, input);
        assert_eq!(state.camera, first);

        // No new sample keeps the last pose.
        let state = advance(state, FrameInput { sample: None, ..input });
        assert_eq!(state.camera, first);
    }

    #[test]
    fn test_spin_modes_agree() {
        let field = field();
        let tilt = TiltMapping::default();
        let derived = AnimationParams::default();
        let accumulated = AnimationParams {
            spin_mode: SpinMode::Accumulated,
            ..AnimationParams::default()
        };

        let mut a = SimState::initial(&field, &derived, tilt.resting_pose());
        let mut b = a.clone();
        let input = FrameInput {
            field: &field,
            params: &derived,
            tilt: &tilt,
            sample: None,
        };
        for _ in 0..50 {
            a = advance(a, input);
            b = advance(
                b,
                FrameInput {
                    params: &accumulated,
                    ..input
                },
            );
        }
        for (ta, tb) in a.transforms.iter().zip(&b.transforms) {
            assert!((ta.rotation - tb.rotation).length() < 1e-3);
            assert_eq!(ta.position, tb.position);
        }
    }

    #[test]
    fn test_positions_shrink_by_convergence_scale() {
        let field = field();
        let params = AnimationParams::default();
        let time = 0.7;
        for d in field.diamonds().iter().step_by(97) {
            let speed = field.layer_speed(d.layer_index);
            let t = diamond_transform(&params, time, 70, d, d.initial_rotation, speed);
            let scale = params.convergence_scale(time, d.layer_index);
            let expected = d.initial_position.length() * scale;
            assert!((t.position.length() - expected).abs() < 1e-4);
            assert!((0.9 - 1e-6..=1.1 + 1e-6).contains(&t.scale));
        }
    }

    #[test]
    fn test_initial_state_matches_time_zero() {
        let field = field();
        let params = AnimationParams::default();
        let resting = TiltMapping::default().resting_pose();
        let state = SimState::initial(&field, &params, resting);
        for (t, d) in state.transforms.iter().zip(field.diamonds()) {
            let speed = field.layer_speed(d.layer_index);
            let expected = diamond_transform(&params, 0.0, 0, d, d.initial_rotation, speed);
            assert_eq!(*t, expected);
        }
        assert!(state.transforms.iter().all(|t| (t.scale - 0.9).abs() < 1e-6));
    }

    #[test]
    fn test_time_keeps_advancing_in_long_sessions() {
        let field = field();
        let params = AnimationParams::default();
        let tilt = TiltMapping::default();
        for start in [65_536.0, 262_144.0, 4_194_304.0] {
            let mut state = SimState::initial(&field, &params, tilt.resting_pose());
            state.time = start;
            state.frame = (start / params.step()) as u64;
            for _ in 0..100 {
                state = advance(
                    state,
                    FrameInput {
                        field: &field,
                        params: &params,
                        tilt: &tilt,
                        sample: None,
                    },
                );
            }
            let elapsed = state.time - start;
            assert!((elapsed - 1.0).abs() < 1e-6, "advanced {elapsed} from {start}");
        }
    }

    #[test]
    fn test_rotations_stay_wrapped_after_many_frames() {
        let field = field();
        let params = AnimationParams::default();
        let tau = std::f32::consts::TAU;
        for d in field.diamonds().iter().step_by(131) {
            let speed = field.layer_speed(d.layer_index);
            let frame = 1_000_000_000;
            let t = diamond_transform(&params, 1.0e7, frame, d, d.initial_rotation, speed);
            for angle in t.rotation.to_array() {
                assert!((0.0..=tau).contains(&angle), "angle {angle}");
            }
            assert!(t.position.is_finite());
        }
    }
}
