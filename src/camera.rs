//! Camera pose and projection.
//!
//! The camera always looks at the origin. Device tilt only offsets its
//! position: `gamma` (left/right) moves it along X and `beta`
//! (front/back) along Y, while it stays at a fixed distance in Z.

use crate::orientation::OrientationSample;
use glam::{Mat4, Vec3};

/// Where the camera is and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    /// Static pose used until orientation is enabled.
    pub fn resting(distance: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, distance),
            target: Vec3::ZERO,
        }
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }
}

/// Tilt-to-position mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiltMapping {
    /// Distance from the origin along +Z.
    pub distance: f32,
    /// World units of offset for a full ±90° tilt.
    pub tilt_offset: f32,
    /// Fraction of the way to move toward the target pose each frame.
    /// `1.0` snaps immediately.
    pub smoothing: f32,
}

impl Default for TiltMapping {
    fn default() -> Self {
        Self {
            distance: 15.0,
            tilt_offset: 4.0,
            smoothing: 1.0,
        }
    }
}

impl TiltMapping {
    /// Dimensionless look offsets, roughly `[-1, 1]` for typical tilts.
    #[inline]
    pub fn look_offsets(sample: &OrientationSample) -> (f32, f32) {
        (-sample.gamma / 90.0, sample.beta / 90.0)
    }

    /// Pose for a sample, ignoring smoothing.
    pub fn target_pose(&self, sample: &OrientationSample) -> CameraPose {
        let (look_x, look_y) = Self::look_offsets(sample);
        CameraPose {
            position: Vec3::new(
                look_x * self.tilt_offset,
                look_y * self.tilt_offset,
                self.distance,
            ),
            target: Vec3::ZERO,
        }
    }

    /// Move from `previous` toward the pose for `sample`.
    pub fn follow(&self, previous: &CameraPose, sample: &OrientationSample) -> CameraPose {
        let target = self.target_pose(sample);
        let s = self.smoothing.clamp(0.0, 1.0);
        if s >= 1.0 {
            return target;
        }
        CameraPose {
            position: previous.position.lerp(target.position, s),
            target: Vec3::ZERO,
        }
    }

    #[inline]
    pub fn resting_pose(&self) -> CameraPose {
        CameraPose::resting(self.distance)
    }
}

/// Perspective projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn new(fov_y_degrees: f32, width: u32, height: u32, near: f32, far: f32) -> Self {
        let mut projection = Self {
            fov_y_degrees,
            aspect: 1.0,
            near,
            far,
        };
        projection.resize(width, height);
        projection
    }

    /// Recompute the aspect ratio. Zero-sized viewports are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    #[inline]
    pub fn fov_y_radians(&self) -> f32 {
        self.fov_y_degrees.to_radians()
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_radians(), self.aspect, self.near, self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_device_is_resting_pose() {
        let mapping = TiltMapping::default();
        let pose = mapping.target_pose(&OrientationSample::default());
        assert_eq!(pose, mapping.resting_pose());
    }

    #[test]
    fn test_tilt_offsets_position() {
        let mapping = TiltMapping {
            distance: 10.0,
            tilt_offset: 2.0,
            smoothing: 1.0,
        };
        let pose = mapping.target_pose(&OrientationSample::new(0.0, 45.0, 90.0));
        assert!((pose.position.x - (-2.0)).abs() < 1e-6);
        assert!((pose.position.y - 1.0).abs() < 1e-6);
        assert_eq!(pose.position.z, 10.0);
        assert_eq!(pose.target, Vec3::ZERO);
    }

    #[test]
    fn test_follow_without_smoothing_does_not_drift() {
        let mapping = TiltMapping::default();
        let sample = OrientationSample::new(12.0, 30.0, -20.0);
        let first = mapping.follow(&mapping.resting_pose(), &sample);
        let second = mapping.follow(&first, &sample);
        assert_eq!(first, second);
    }

    #[test]
    fn test_follow_with_smoothing_converges() {
        let mapping = TiltMapping {
            smoothing: 0.1,
            ..TiltMapping::default()
        };
        let sample = OrientationSample::new(0.0, 90.0, 0.0);
        let target = mapping.target_pose(&sample);
        let mut pose = mapping.resting_pose();
        for _ in 0..200 {
            pose = mapping.follow(&pose, &sample);
        }
        assert!((pose.position - target.position).length() < 1e-3);
    }

    #[test]
    fn test_projection_resize() {
        let mut projection = Projection::new(75.0, 1280, 720, 0.1, 1000.0);
        assert!((projection.aspect - 1280.0 / 720.0).abs() < 1e-6);

        projection.resize(600, 800);
        assert!((projection.aspect - 0.75).abs() < 1e-6);

        projection.resize(0, 800);
        assert!((projection.aspect - 0.75).abs() < 1e-6);
    }
}
