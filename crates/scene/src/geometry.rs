use glam::Vec3;
use std::f32::consts::TAU;

/// Parametric primitive shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    /// Frustum along the Y axis, centred on the origin. A zero top radius
    /// gives a cone.
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        radial_segments: u32,
    },
    /// Rectangle in the XY plane facing +Z, centred on the origin.
    Plane { width: f32, height: f32 },
}

impl Geometry {
    pub fn cylinder(radius: f32, height: f32, radial_segments: u32) -> Self {
        Self::Cylinder {
            radius_top: radius,
            radius_bottom: radius,
            height,
            radial_segments,
        }
    }

    pub fn cone(radius: f32, height: f32, radial_segments: u32) -> Self {
        Self::Cylinder {
            radius_top: 0.0,
            radius_bottom: radius,
            height,
            radial_segments,
        }
    }

    pub fn plane(width: f32, height: f32) -> Self {
        Self::Plane { width, height }
    }

    /// Triangulate into counter-clockwise, outward-facing triangles.
    pub fn tessellate(&self) -> MeshData {
        match *self {
            Self::Cylinder {
                radius_top,
                radius_bottom,
                height,
                radial_segments,
            } => cylinder_mesh(radius_top, radius_bottom, height, radial_segments),
            Self::Plane { width, height } => plane_mesh(width, height),
        }
    }
}

/// CPU-side triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn push(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position.to_array());
        self.normals.push(normal.to_array());
        index
    }
}

fn cylinder_mesh(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> MeshData {
    let segments = segments.max(3);
    let half = height * 0.5;
    let ring = segments + 1;
    let mut mesh = MeshData::with_capacity((ring * 2 + ring * 2 + 2) as usize, (segments * 12) as usize);

    // Side normals tilt outward by the taper.
    let slope = if height > 0.0 {
        (radius_bottom - radius_top) / height
    } else {
        0.0
    };
    for (y, radius) in [(-half, radius_bottom), (half, radius_top)] {
        for seg in 0..=segments {
            let (sin, cos) = (seg as f32 / segments as f32 * TAU).sin_cos();
            mesh.push(
                Vec3::new(radius * cos, y, radius * sin),
                Vec3::new(cos, slope, sin).normalize(),
            );
        }
    }
    for seg in 0..segments {
        let a = seg;
        let b = seg + ring;
        mesh.indices
            .extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
    }

    if radius_top > 0.0 {
        add_cap(&mut mesh, segments, radius_top, half, true);
    }
    if radius_bottom > 0.0 {
        add_cap(&mut mesh, segments, radius_bottom, -half, false);
    }
    mesh
}

fn add_cap(mesh: &mut MeshData, segments: u32, radius: f32, y: f32, top: bool) {
    let normal = if top { Vec3::Y } else { Vec3::NEG_Y };
    let center = mesh.push(Vec3::new(0.0, y, 0.0), normal);
    for seg in 0..=segments {
        let (sin, cos) = (seg as f32 / segments as f32 * TAU).sin_cos();
        mesh.push(Vec3::new(radius * cos, y, radius * sin), normal);
    }
    for seg in 0..segments {
        let (p0, p1) = (center + 1 + seg, center + 2 + seg);
        if top {
            mesh.indices.extend_from_slice(&[center, p1, p0]);
        } else {
            mesh.indices.extend_from_slice(&[center, p0, p1]);
        }
    }
}

fn plane_mesh(width: f32, height: f32) -> MeshData {
    let (hw, hh) = (width * 0.5, height * 0.5);
    let mut mesh = MeshData::with_capacity(4, 6);
    let a = mesh.push(Vec3::new(-hw, -hh, 0.0), Vec3::Z);
    let b = mesh.push(Vec3::new(hw, -hh, 0.0), Vec3::Z);
    let c = mesh.push(Vec3::new(-hw, hh, 0.0), Vec3::Z);
    let d = mesh.push(Vec3::new(hw, hh, 0.0), Vec3::Z);
    mesh.indices.extend_from_slice(&[a, b, d, a, d, c]);
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_normal(mesh: &MeshData, tri: usize) -> Vec3 {
        let p = |i: usize| Vec3::from(mesh.positions[mesh.indices[tri * 3 + i] as usize]);
        (p(1) - p(0)).cross(p(2) - p(0))
    }

    #[test]
    fn cylinder_has_sides_and_two_caps() {
        let mesh = Geometry::cylinder(2.5, 2.2, 100).tessellate();
        // 100 side quads + 2 caps of 100 triangles
        assert_eq!(mesh.triangle_count(), 200 + 200);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
        let max_y = mesh.positions.iter().map(|p| p[1]).fold(f32::MIN, f32::max);
        assert!((max_y - 1.1).abs() < 1e-6);
    }

    #[test]
    fn cone_drops_the_top_cap() {
        let mesh = Geometry::cone(2.65, 2.0, 100).tessellate();
        assert_eq!(mesh.triangle_count(), 200 + 100);
    }

    #[test]
    fn side_triangles_face_outward() {
        let mesh = Geometry::cylinder(1.0, 1.0, 8).tessellate();
        for tri in 0..16 {
            let centroid = (0..3)
                .map(|i| Vec3::from(mesh.positions[mesh.indices[tri * 3 + i] as usize]))
                .sum::<Vec3>()
                / 3.0;
            let outward = Vec3::new(centroid.x, 0.0, centroid.z);
            assert!(triangle_normal(&mesh, tri).dot(outward) > 0.0, "triangle {tri}");
        }
    }

    #[test]
    fn caps_face_away_from_body() {
        let mesh = Geometry::cylinder(1.0, 1.0, 8).tessellate();
        // top cap triangles follow the 16 side triangles
        assert!(triangle_normal(&mesh, 16).y > 0.0);
        assert!(triangle_normal(&mesh, mesh.triangle_count() - 1).y < 0.0);
    }

    #[test]
    fn cone_normals_tilt_up() {
        let mesh = Geometry::cone(1.0, 1.0, 4).tessellate();
        assert!(mesh.normals[0][1] > 0.0);
        assert!((Vec3::from(mesh.normals[0]).length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn plane_faces_positive_z() {
        let mesh = Geometry::plane(20.0, 20.0).tessellate();
        assert_eq!(mesh.vertex_count(), 4);
        assert!(triangle_normal(&mesh, 0).z > 0.0);
        assert!(triangle_normal(&mesh, 1).z > 0.0);
        assert_eq!(mesh.positions[3], [10.0, 10.0, 0.0]);
    }
}
