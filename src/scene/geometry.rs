use glam::Vec3;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GEOMETRY_ID: AtomicU64 = AtomicU64::new(1);

/// Indexed triangle list shared between mesh nodes
#[derive(Debug)]
pub struct Geometry {
    id: u64,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl Geometry {
    /// Build from explicit attributes. Normals must match positions in length.
    pub fn new(positions: Vec<[f32; 3]>, normals: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        debug_assert_eq!(positions.len(), normals.len());
        Self {
            id: NEXT_GEOMETRY_ID.fetch_add(1, Ordering::Relaxed),
            positions,
            normals,
            indices,
        }
    }

    /// Build from positions only, generating sequential indices when none are given
    /// and area-weighted vertex normals
    pub fn from_positions(positions: Vec<[f32; 3]>, indices: Option<Vec<u32>>) -> Self {
        let indices = indices.unwrap_or_else(|| (0..positions.len() as u32).collect());
        let normals = compute_normals(&positions, &indices);
        Self::new(positions, normals, indices)
    }

    /// Axis-aligned box centered on the origin, 24 vertices so faces stay flat
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let h = Vec3::new(width, height, depth) * 0.5;
        let faces: [(Vec3, Vec3, Vec3); 6] = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];

        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (normal, u, v) in faces {
            let base = positions.len() as u32;
            let center = normal * h;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let corner = center + u * h * su + v * h * sv;
                positions.push(corner.to_array());
                normals.push(normal.to_array());
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self::new(positions, normals, indices)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

fn compute_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut accumulated = vec![Vec3::ZERO; positions.len()];

    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let p0 = Vec3::from_array(positions[a]);
        let p1 = Vec3::from_array(positions[b]);
        let p2 = Vec3::from_array(positions[c]);
        let face = (p1 - p0).cross(p2 - p0);
        accumulated[a] += face;
        accumulated[b] += face;
        accumulated[c] += face;
    }

    accumulated
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuboid_counts() {
        let cuboid = Geometry::cuboid(2.0, 3.0, 2.0);
        assert_eq!(cuboid.vertex_count(), 24);
        assert_eq!(cuboid.triangle_count(), 12);
    }

    #[test]
    fn test_cuboid_extents() {
        let cuboid = Geometry::cuboid(2.0, 3.0, 2.0);
        let max_y = cuboid.positions.iter().map(|p| p[1]).fold(f32::MIN, f32::max);
        let min_x = cuboid.positions.iter().map(|p| p[0]).fold(f32::MAX, f32::min);
        assert_eq!(max_y, 1.5);
        assert_eq!(min_x, -1.0);
    }

    #[test]
    fn test_cuboid_faces_wind_outward() {
        let cuboid = Geometry::cuboid(1.0, 1.0, 1.0);
        for triangle in cuboid.indices.chunks_exact(3) {
            let p0 = Vec3::from_array(cuboid.positions[triangle[0] as usize]);
            let p1 = Vec3::from_array(cuboid.positions[triangle[1] as usize]);
            let p2 = Vec3::from_array(cuboid.positions[triangle[2] as usize]);
            let face = (p1 - p0).cross(p2 - p0).normalize();
            let normal = Vec3::from_array(cuboid.normals[triangle[0] as usize]);
            assert!(face.abs_diff_eq(normal, 1e-5));
        }
    }

    #[test]
    fn test_from_positions_generates_indices_and_normals() {
        let geometry = Geometry::from_positions(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            None,
        );
        assert_eq!(geometry.indices, vec![0, 1, 2]);
        for normal in &geometry.normals {
            assert!(Vec3::from_array(*normal).abs_diff_eq(Vec3::Z, 1e-6));
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Geometry::cuboid(1.0, 1.0, 1.0);
        let b = Geometry::cuboid(1.0, 1.0, 1.0);
        assert_ne!(a.id(), b.id());
    }
}
