use glam::Vec3;

/// Subdivided plane in the XY plane, facing +Z.
///
/// UVs run from (0, 0) at the bottom-left corner to (1, 1) at the top-right,
/// so `uv.y` grows with height. The smoke shader relies on that to fade the
/// column in at the base and out at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneGeometry {
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl PlaneGeometry {
    pub fn new(width: f32, height: f32, width_segments: u32, height_segments: u32) -> Self {
        let grid_x = width_segments.max(1);
        let grid_y = height_segments.max(1);
        let grid_x1 = grid_x + 1;
        let segment_width = width / grid_x as f32;
        let segment_height = height / grid_y as f32;

        let mut positions = Vec::with_capacity((grid_x1 * (grid_y + 1)) as usize);
        let mut uvs = Vec::with_capacity(positions.capacity());
        for iy in 0..=grid_y {
            let y = iy as f32 * segment_height - height / 2.0;
            for ix in 0..=grid_x {
                let x = ix as f32 * segment_width - width / 2.0;
                positions.push([x, -y, 0.0]);
                uvs.push([ix as f32 / grid_x as f32, 1.0 - iy as f32 / grid_y as f32]);
            }
        }

        let mut indices = Vec::with_capacity((grid_x * grid_y * 6) as usize);
        for iy in 0..grid_y {
            for ix in 0..grid_x {
                let a = ix + grid_x1 * iy;
                let b = ix + grid_x1 * (iy + 1);
                let c = (ix + 1) + grid_x1 * (iy + 1);
                let d = (ix + 1) + grid_x1 * iy;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Self {
            positions,
            uvs,
            indices,
        }
    }

    pub fn translate(&mut self, offset: Vec3) -> &mut Self {
        for p in &mut self.positions {
            *p = (Vec3::from_array(*p) + offset).to_array();
        }
        self
    }

    pub fn scale(&mut self, factor: Vec3) -> &mut Self {
        for p in &mut self.positions {
            *p = (Vec3::from_array(*p) * factor).to_array();
        }
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Line-list indices covering every triangle edge, for wireframe drawing.
    pub fn wireframe_indices(&self) -> Vec<u32> {
        self.indices
            .chunks_exact(3)
            .flat_map(|t| [t[0], t[1], t[1], t[2], t[2], t[0]])
            .collect()
    }

    /// Axis-aligned bounds as `(min, max)`.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        self.positions.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), p| {
                let p = Vec3::from_array(*p);
                (min.min(p), max.max(p))
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_and_index_counts() {
        let plane = PlaneGeometry::new(1.0, 1.0, 16, 64);
        assert_eq!(plane.vertex_count(), 17 * 65);
        assert_eq!(plane.triangle_count(), 16 * 64 * 2);
        assert!(plane.indices.iter().all(|&i| (i as usize) < plane.vertex_count()));
    }

    #[test]
    fn unit_plane_is_centered() {
        let plane = PlaneGeometry::new(1.0, 1.0, 2, 2);
        let (min, max) = plane.bounds();
        assert_eq!(min, Vec3::new(-0.5, -0.5, 0.0));
        assert_eq!(max, Vec3::new(0.5, 0.5, 0.0));
    }

    #[test]
    fn uv_v_grows_upward() {
        let plane = PlaneGeometry::new(1.0, 1.0, 1, 1);
        // First row is the top edge.
        assert_eq!(plane.positions[0], [-0.5, 0.5, 0.0]);
        assert_eq!(plane.uvs[0], [0.0, 1.0]);
        assert_eq!(plane.positions[3], [0.5, -0.5, 0.0]);
        assert_eq!(plane.uvs[3], [1.0, 0.0]);
    }

    #[test]
    fn translate_then_scale_builds_smoke_column() {
        let mut plane = PlaneGeometry::new(1.0, 1.0, 16, 64);
        plane.translate(Vec3::new(0.0, 0.5, 0.0)).scale(Vec3::new(1.5, 6.0, 1.5));
        let (min, max) = plane.bounds();
        assert!((min.y - 0.0).abs() < 1e-5);
        assert!((max.y - 6.0).abs() < 1e-5);
        assert!((max.x - 0.75).abs() < 1e-5);
    }

    #[test]
    fn wireframe_has_three_edges_per_triangle() {
        let plane = PlaneGeometry::new(1.0, 1.0, 1, 1);
        let lines = plane.wireframe_indices();
        assert_eq!(lines.len(), plane.triangle_count() * 6);
        assert_eq!(&lines[..6], &[0, 2, 2, 1, 1, 0]);
    }
}
