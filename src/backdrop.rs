//! Video backdrop behind the diamond sphere.
//!
//! Either a plane far enough back to sit behind every diamond and sized to
//! exactly fill the view, or a large sphere around the whole scene seen from
//! inside.

use crate::camera::Projection;
use crate::config::BackdropConfig;
use crate::mesh::{self, Vertex};
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Backdrop geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackdropKind {
    /// View-filling plane.
    #[default]
    Plane,
    /// Enclosing inward-facing sphere.
    Skybox,
}

const SKYBOX_SEGMENTS: u32 = 60;
const SKYBOX_RINGS: u32 = 40;

/// Placement of the backdrop mesh in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backdrop {
    kind: BackdropKind,
    plane_distance: f32,
    skybox_radius: f32,
    /// Plane width and height in world units.
    size: (f32, f32),
}

impl Backdrop {
    pub fn new(config: &BackdropConfig, projection: &Projection) -> Self {
        let mut backdrop = Self {
            kind: config.kind,
            plane_distance: config.plane_distance,
            skybox_radius: config.skybox_radius,
            size: (1.0, 1.0),
        };
        backdrop.fit(projection);
        backdrop
    }

    #[inline]
    pub fn kind(&self) -> BackdropKind {
        self.kind
    }

    /// Plane size `(width, height)` in world units.
    #[inline]
    pub fn plane_size(&self) -> (f32, f32) {
        self.size
    }

    /// Recompute the plane so it fills a view with this projection.
    pub fn fit(&mut self, projection: &Projection) {
        let height = 2.0 * (projection.fov_y_radians() / 2.0).tan() * self.plane_distance;
        self.size = (height * projection.aspect, height);
    }

    /// Unscaled mesh for this backdrop.
    pub fn mesh(&self) -> Vec<Vertex> {
        match self.kind {
            BackdropKind::Plane => mesh::plane(),
            BackdropKind::Skybox => mesh::inward_sphere(SKYBOX_SEGMENTS, SKYBOX_RINGS),
        }
    }

    /// Model matrix placing [`Backdrop::mesh`] in the world.
    pub fn model_matrix(&self) -> Mat4 {
        match self.kind {
            BackdropKind::Plane => Mat4::from_scale_rotation_translation(
                Vec3::new(self.size.0, self.size.1, 1.0),
                glam::Quat::IDENTITY,
                Vec3::new(0.0, 0.0, -self.plane_distance),
            ),
            BackdropKind::Skybox => Mat4::from_scale(Vec3::splat(self.skybox_radius)),
        }
    }
}
