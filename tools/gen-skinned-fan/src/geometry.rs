//! Triangle-fan geometry on the unit circle

use glam::Vec3;
use std::f32::consts::TAU;

/// Fan mesh: vertex 0 is the shared apex at the origin
#[derive(Debug, Clone, PartialEq)]
pub struct FanMesh {
    pub positions: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

impl FanMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Positions as plain arrays for buffer packing
    pub fn position_arrays(&self) -> Vec<[f32; 3]> {
        self.positions.iter().map(|p| p.to_array()).collect()
    }

    /// Flattened triangle list
    pub fn indices(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }
}

/// Generate a closed fan of `divisions` triangles in the XY plane.
///
/// Vertex `k` (1..=N) sits at angle `TAU * (k - 1) / N`; triangle `i` is
/// `(0, i + 1, (i + 1) % N + 1)`, so every triangle winds counter-clockwise
/// seen from +Z.
///
/// `divisions` must be at least 3; the config layer enforces this.
pub fn generate_fan(divisions: u32) -> FanMesh {
    let n = divisions as usize;
    let mut positions = Vec::with_capacity(n + 1);
    let mut triangles = Vec::with_capacity(n);

    positions.push(Vec3::ZERO);
    for i in 0..divisions {
        let theta = TAU * i as f32 / divisions as f32;
        positions.push(Vec3::new(theta.cos(), theta.sin(), 0.0));
        triangles.push([0, i + 1, (i + 1) % divisions + 1]);
    }

    tracing::debug!(
        "Generated fan: {} vertices, {} triangles",
        positions.len(),
        triangles.len()
    );

    FanMesh {
        positions,
        triangles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn counts_and_index_bounds() {
        for divisions in [3u32, 4, 6, 7, 32, 100] {
            let fan = generate_fan(divisions);
            assert_eq!(fan.vertex_count(), divisions as usize + 1);
            assert_eq!(fan.triangle_count(), divisions as usize);
            assert!(fan.indices().iter().all(|&i| i <= divisions));
        }
    }

    #[test]
    fn covers_full_circle_once() {
        for divisions in [3u32, 5, 6, 17] {
            let fan = generate_fan(divisions);
            let total: f32 = fan
                .triangles
                .iter()
                .map(|[apex, a, b]| {
                    let apex = fan.positions[*apex as usize];
                    let a = fan.positions[*a as usize] - apex;
                    let b = fan.positions[*b as usize] - apex;
                    a.angle_between(b)
                })
                .sum();
            assert!((total - TAU).abs() < 1e-4, "divisions {}: {}", divisions, total);
        }
    }

    #[test]
    fn consistent_winding() {
        let fan = generate_fan(8);
        for [apex, a, b] in &fan.triangles {
            let apex = fan.positions[*apex as usize];
            let a = fan.positions[*a as usize] - apex;
            let b = fan.positions[*b as usize] - apex;
            assert!(a.cross(b).z > 0.0);
        }
    }

    #[test]
    fn six_division_layout() {
        let fan = generate_fan(6);
        assert_eq!(fan.positions[0], Vec3::ZERO);
        assert!(fan.positions[1].abs_diff_eq(Vec3::X, EPSILON));
        assert!(fan.positions[4].abs_diff_eq(Vec3::new(-1.0, 0.0, 0.0), EPSILON));
        assert_eq!(fan.triangles[0], [0, 1, 2]);
        assert_eq!(fan.triangles[5], [0, 6, 1]);
    }
}
