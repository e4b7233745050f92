//! Diamond field generation.
//!
//! Builds the fixed spherical arrangement of diamonds: `num_layers` concentric
//! shells, each swept by `num_rings` latitude rings of `diamonds_per_ring`
//! slots. Positions are fully deterministic; only the cosmetic initial
//! rotation and (optionally) the per-layer rotation speed are random, and
//! both come from a seeded RNG so scenes are reproducible.
//!
//! ```ignore
//! use kaleido::spawn::{DiamondField, FieldParams, LayerSpeed};
//!
//! let params = FieldParams::new(8, 16, 24, 8.0)?;
//! let field = DiamondField::generate(params, LayerSpeed::default(), 42);
//! assert_eq!(field.len(), 3072);
//! ```

use crate::error::SceneError;
use crate::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// Shape of the generated sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldParams {
    num_layers: u32,
    num_rings: u32,
    diamonds_per_ring: u32,
    max_radius: f32,
}

impl FieldParams {
    /// Validate and build field parameters.
    ///
    /// Requires `num_layers >= 1`, `num_rings >= 2`, `diamonds_per_ring >= 1`
    /// and a finite `max_radius > 0`.
    pub fn new(
        num_layers: u32,
        num_rings: u32,
        diamonds_per_ring: u32,
        max_radius: f32,
    ) -> Result<Self, SceneError> {
        if num_layers < 1 {
            return Err(SceneError::InvalidField("num_layers must be >= 1".into()));
        }
        if num_rings < 2 {
            return Err(SceneError::InvalidField("num_rings must be >= 2".into()));
        }
        if diamonds_per_ring < 1 {
            return Err(SceneError::InvalidField(
                "diamonds_per_ring must be >= 1".into(),
            ));
        }
        if !(max_radius.is_finite() && max_radius > 0.0) {
            return Err(SceneError::InvalidField(format!(
                "max_radius must be a positive number, got {max_radius}"
            )));
        }
        Ok(Self {
            num_layers,
            num_rings,
            diamonds_per_ring,
            max_radius,
        })
    }

    #[inline]
    pub fn num_layers(&self) -> u32 {
        self.num_layers
    }

    #[inline]
    pub fn num_rings(&self) -> u32 {
        self.num_rings
    }

    #[inline]
    pub fn diamonds_per_ring(&self) -> u32 {
        self.diamonds_per_ring
    }

    #[inline]
    pub fn max_radius(&self) -> f32 {
        self.max_radius
    }

    /// Total number of diamonds in the field.
    pub fn count(&self) -> usize {
        self.num_layers as usize * self.num_rings as usize * self.diamonds_per_ring as usize
    }

    /// Radius of the shell for a given layer.
    #[inline]
    pub fn layer_radius(&self, layer: u32) -> f32 {
        (layer + 1) as f32 * (self.max_radius / self.num_layers as f32)
    }

    /// Recover the layer of a diamond from its position in generation order.
    #[inline]
    pub fn layer_of(&self, flat_index: usize) -> u32 {
        (flat_index / (self.diamonds_per_ring as usize * self.num_rings as usize)) as u32
    }
}

/// How fast each layer revolves about the Z axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LayerSpeed {
    /// Every layer uses the same angular speed.
    Shared { speed: f32 },
    /// Each layer draws a uniform speed in `[min, max)` once at generation.
    RandomPerLayer { min: f32, max: f32 },
}

impl Default for LayerSpeed {
    fn default() -> Self {
        LayerSpeed::RandomPerLayer { min: 0.3, max: 0.8 }
    }
}

/// One octahedral unit on a generated shell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diamond {
    /// Position at creation, never modified.
    pub initial_position: Vec3,
    /// Radial layer, derived from generation order.
    pub layer_index: u32,
    /// Random Euler angles in `[0, π)` applied at creation.
    pub initial_rotation: Vec3,
}

/// The immutable output of the generator.
#[derive(Debug, Clone)]
pub struct DiamondField {
    params: FieldParams,
    diamonds: Vec<Diamond>,
    layer_speeds: Vec<f32>,
}

impl DiamondField {
    /// Run the (layer, ring, slot) sweep and build every diamond.
    pub fn generate(params: FieldParams, speed: LayerSpeed, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);

        let layer_speeds: Vec<f32> = (0..params.num_layers)
            .map(|_| match speed {
                LayerSpeed::Shared { speed } => speed,
                LayerSpeed::RandomPerLayer { min, max } if max > min => rng.gen_range(min..max),
                LayerSpeed::RandomPerLayer { min, .. } => min,
            })
            .collect();

        let mut diamonds = Vec::with_capacity(params.count());
        for layer in 0..params.num_layers {
            let radius = params.layer_radius(layer);

            for ring in 0..params.num_rings {
                let phi = PI * (ring as f32 / (params.num_rings - 1) as f32);

                for slot in 0..params.diamonds_per_ring {
                    let theta = (slot as f32 / params.diamonds_per_ring as f32) * TAU;

                    diamonds.push(Diamond {
                        initial_position: spherical_to_cartesian(radius, phi, theta),
                        layer_index: layer,
                        initial_rotation: random_rotation(&mut rng),
                    });
                }
            }
        }

        tracing::debug!(
            count = diamonds.len(),
            layers = params.num_layers,
            seed,
            "generated diamond field"
        );

        Self {
            params,
            diamonds,
            layer_speeds,
        }
    }

    #[inline]
    pub fn params(&self) -> &FieldParams {
        &self.params
    }

    #[inline]
    pub fn diamonds(&self) -> &[Diamond] {
        &self.diamonds
    }

    /// Angular speed of a layer (radians per unit of simulation time).
    #[inline]
    pub fn layer_speed(&self, layer: u32) -> f32 {
        self.layer_speeds[layer as usize]
    }

    #[inline]
    pub fn layer_speeds(&self) -> &[f32] {
        &self.layer_speeds
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.diamonds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.diamonds.is_empty()
    }
}

/// `x = r sinφ cosθ, y = r sinφ sinθ, z = r cosφ`.
#[inline]
pub fn spherical_to_cartesian(radius: f32, phi: f32, theta: f32) -> Vec3 {
    Vec3::new(
        radius * phi.sin() * theta.cos(),
        radius * phi.sin() * theta.sin(),
        radius * phi.cos(),
    )
}

fn random_rotation(rng: &mut SmallRng) -> Vec3 {
    Vec3::new(
        rng.gen_range(0.0..PI),
        rng.gen_range(0.0..PI),
        rng.gen_range(0.0..PI),
    )
}
