use crate::linalg::{mix, vec3, Vec3};
use crate::project::{geo_to_flat, geo_to_sphere, Coordinate, FLAT_SCALE, GLOBE_RADIUS};

/// Radial factor lifting the overlay just off the globe surface.
pub const SPHERE_OFFSET: f32 = 1.003;
/// Height of the overlay above the flat map plane.
pub const FLAT_OFFSET: f32 = 0.005;
/// Quad columns in the default overlay grid.
pub const DEFAULT_SEGMENTS: u32 = 64;

/// Full-surface carrier mesh for the density texture. Vertices come in
/// sphere and flat pairs, with UVs matching the density grid's mapping.
#[derive(Clone, Debug, Default)]
pub struct OverlayMesh {
    pub sphere_positions: Vec<Vec3>,
    pub flat_positions: Vec<Vec3>,
    /// Two components per vertex.
    pub uvs: Vec<f32>,
    pub indices: Vec<u32>,
}

impl OverlayMesh {
    pub fn vertex_count(&self) -> usize {
        self.sphere_positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Position buffer at morph progress `t`, three floats per vertex.
    /// Exact at both endpoints.
    pub fn interpolated_positions(&self, t: f32) -> Vec<f32> {
        let t = t.clamp(0.0, 1.0);
        let mut buffer = Vec::with_capacity(self.sphere_positions.len() * 3);
        for (&sphere, &flat) in self.sphere_positions.iter().zip(&self.flat_positions) {
            buffer.extend(mix(sphere, flat, t).into_array());
        }
        buffer
    }
}

/// Builds a lat/long grid covering the whole surface: `segments` quad columns
/// by `segments / 2` quad rows. Row 0 sits at lat +90 and the `v` UV runs
/// 1 -> 0 top to bottom, so texels line up with the density grid's
/// south-origin rows. Fewer than two segments yields an empty mesh.
pub fn overlay_grid(segments: u32) -> OverlayMesh {
    let rows = segments / 2;
    if rows == 0 {
        return OverlayMesh::default();
    }
    let columns = segments + 1;
    let vertex_count = (columns * (rows + 1)) as usize;

    let mut mesh = OverlayMesh {
        sphere_positions: Vec::with_capacity(vertex_count),
        flat_positions: Vec::with_capacity(vertex_count),
        uvs: Vec::with_capacity(vertex_count * 2),
        indices: Vec::with_capacity((segments * rows * 6) as usize),
    };

    for row in 0..=rows {
        let lat = 90.0 - 180.0 * row as f32 / rows as f32;
        for column in 0..=segments {
            let long = 360.0 * column as f32 / segments as f32 - 180.0;
            let coordinate = Coordinate { lat, long };
            mesh.sphere_positions
                .push(geo_to_sphere(coordinate, GLOBE_RADIUS * SPHERE_OFFSET));
            let [x, y, _] = geo_to_flat(coordinate, FLAT_SCALE).into_array();
            mesh.flat_positions.push(vec3(x, y, FLAT_OFFSET));
            mesh.uvs.push(column as f32 / segments as f32);
            mesh.uvs.push(1.0 - row as f32 / rows as f32);
        }
    }

    for row in 0..rows {
        for column in 0..segments {
            let a = row * columns + column;
            let b = a + 1;
            let c = a + columns;
            let d = c + 1;
            mesh.indices.extend([a, c, b, b, c, d]);
        }
    }

    mesh
}
