//! Triangle meshes with texture coordinates.
//!
//! All meshes are non-indexed triangle lists of [`Vertex`] with
//! counter-clockwise front faces. Texture `v` runs top-down, as wgpu samples
//! it.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

/// Mesh vertex: position plus texture coordinate.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub fn new(position: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            uv: uv.to_array(),
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Spherical texture coordinate of a direction.
fn spherical_uv(dir: Vec3) -> Vec2 {
    let dir = dir.normalize_or_zero();
    let u = dir.z.atan2(-dir.x) / TAU + 0.5;
    let v = (-dir.y).atan2(Vec2::new(dir.x, dir.z).length()) / PI + 0.5;
    Vec2::new(u, v)
}

/// Regular octahedron with vertices at distance `radius` on each axis.
///
/// Eight faces, 24 vertices. Texture coordinates wrap the image around the
/// shape like a globe.
pub fn octahedron(radius: f32) -> Vec<Vertex> {
    let top = Vec3::Y;
    let bottom = Vec3::NEG_Y;
    let ring = [Vec3::X, Vec3::NEG_Z, Vec3::NEG_X, Vec3::Z];

    let mut vertices = Vec::with_capacity(24);
    for i in 0..4 {
        let a = ring[i];
        let b = ring[(i + 1) % 4];

        let mut ua = spherical_uv(a);
        let mut ub = spherical_uv(b);
        // Keep each face on one side of the seam.
        if (ua.x - ub.x).abs() > 0.5 {
            if ua.x > ub.x {
                ua.x -= 1.0;
            } else {
                ub.x -= 1.0;
            }
        }
        let pole_u = (ua.x + ub.x) * 0.5;

        vertices.push(Vertex::new(top * radius, Vec2::new(pole_u, 0.0)));
        vertices.push(Vertex::new(a * radius, ua));
        vertices.push(Vertex::new(b * radius, ub));

        vertices.push(Vertex::new(bottom * radius, Vec2::new(pole_u, 1.0)));
        vertices.push(Vertex::new(b * radius, ub));
        vertices.push(Vertex::new(a * radius, ua));
    }
    vertices
}

/// Unit quad in the XY plane, centred on the origin, facing +Z.
///
/// Scale it to the backdrop size in the vertex shader.
pub fn plane() -> Vec<Vertex> {
    let bl = Vertex::new(Vec3::new(-0.5, -0.5, 0.0), Vec2::new(0.0, 1.0));
    let br = Vertex::new(Vec3::new(0.5, -0.5, 0.0), Vec2::new(1.0, 1.0));
    let tr = Vertex::new(Vec3::new(0.5, 0.5, 0.0), Vec2::new(1.0, 0.0));
    let tl = Vertex::new(Vec3::new(-0.5, 0.5, 0.0), Vec2::new(0.0, 0.0));
    vec![bl, br, tr, bl, tr, tl]
}

/// UV sphere of unit radius whose faces point inward, for viewing from
/// inside.
pub fn inward_sphere(segments: u32, rings: u32) -> Vec<Vertex> {
    let segments = segments.max(3);
    let rings = rings.max(2);

    let point = |seg: u32, ring: u32| -> Vertex {
        let u = seg as f32 / segments as f32;
        let v = ring as f32 / rings as f32;
        let theta = v * PI;
        let phi = u * TAU;
        let position = Vec3::new(
            -phi.cos() * theta.sin(),
            theta.cos(),
            phi.sin() * theta.sin(),
        );
        Vertex::new(position, Vec2::new(u, v))
    };

    let mut vertices = Vec::with_capacity((segments * rings * 6) as usize);
    for ring in 0..rings {
        for seg in 0..segments {
            let a = point(seg, ring);
            let b = point(seg + 1, ring);
            let c = point(seg + 1, ring + 1);
            let d = point(seg, ring + 1);
            // Wound clockwise from outside, so counter-clockwise from inside.
            vertices.extend_from_slice(&[a, b, c, a, c, d]);
        }
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_normal(tri: &[Vertex]) -> Vec3 {
        let p = |v: &Vertex| Vec3::from_array(v.position);
        (p(&tri[1]) - p(&tri[0])).cross(p(&tri[2]) - p(&tri[0]))
    }

    fn centroid(tri: &[Vertex]) -> Vec3 {
        tri.iter().map(|v| Vec3::from_array(v.position)).sum::<Vec3>() / 3.0
    }

    #[test]
    fn test_octahedron_shape() {
        let verts = octahedron(0.3);
        assert_eq!(verts.len(), 24);
        for v in &verts {
            let len = Vec3::from_array(v.position).length();
            assert!((len - 0.3).abs() < 1e-6);
        }
    }

    #[test]
    fn test_octahedron_faces_outward() {
        for tri in octahedron(1.0).chunks(3) {
            assert!(triangle_normal(tri).dot(centroid(tri)) > 0.0);
        }
    }

    #[test]
    fn test_octahedron_uvs_do_not_straddle_seam() {
        for tri in octahedron(1.0).chunks(3) {
            let us: Vec<f32> = tri.iter().map(|v| v.uv[0]).collect();
            let span = us.iter().cloned().fold(f32::MIN, f32::max)
                - us.iter().cloned().fold(f32::MAX, f32::min);
            assert!(span <= 0.25 + 1e-6, "face spans {span}");
        }
    }

    #[test]
    fn test_plane_faces_camera() {
        let verts = plane();
        assert_eq!(verts.len(), 6);
        for tri in verts.chunks(3) {
            assert!(triangle_normal(tri).z > 0.0);
        }
    }

    #[test]
    fn test_inward_sphere_faces_in() {
        let verts = inward_sphere(16, 8);
        assert_eq!(verts.len(), 16 * 8 * 6);
        for tri in verts.chunks(3) {
            let n = triangle_normal(tri);
            // Degenerate pole triangles have no orientation.
            if n.length() > 1e-6 {
                assert!(n.dot(centroid(tri)) < 0.0);
            }
        }
    }

    #[test]
    fn test_vertex_layout_stride() {
        assert_eq!(std::mem::size_of::<Vertex>(), 20);
        assert_eq!(Vertex::layout().array_stride, 20);
    }
}
