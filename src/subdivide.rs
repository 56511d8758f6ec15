use std::collections::HashMap;

use crate::morph::{MorphableGeometry, MorphablePosition};
use crate::project::Coordinate;

/// Longest geographical edge (in degrees) a triangle may keep. Anything
/// longer chords visibly through the sphere instead of following it.
pub const MAX_EDGE_LENGTH_DEG: f32 = 10.0;

/// Upper bound on subdivision passes over a mesh, bounding the work on
/// pathological input such as polygons crossing the antimeridian.
pub const MAX_SUBDIVISION_PASSES: usize = 4;

/// Edge length in degree space, treating longitude and latitude as planar
/// axes. Longitude differences wrap across the antimeridian, so an edge from
/// 179°E to 179°W measures 2 degrees rather than 358. Latitude never wraps.
pub fn geo_edge_length(a: Coordinate, b: Coordinate) -> f32 {
    let mut d_long = (a.long - b.long).abs();
    if d_long > 180.0 {
        d_long = 360.0 - d_long;
    }
    let d_lat = a.lat - b.lat;
    (d_long * d_long + d_lat * d_lat).sqrt()
}

/// Splits every triangle whose longest geographical edge exceeds
/// [`MAX_EDGE_LENGTH_DEG`] into four using its three edge midpoints, and
/// repeats until the mesh conforms or [`MAX_SUBDIVISION_PASSES`] passes have
/// run.
///
/// Midpoints are taken in geo space and pushed through the projector, so new
/// vertices land on the sphere instead of cutting through it. The position
/// list only grows: existing indices stay valid and triangles sharing an
/// edge share the appended midpoint.
pub fn subdivide_geometry(geometry: &mut MorphableGeometry) {
    let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();

    for _ in 0..MAX_SUBDIVISION_PASSES {
        let mut next_indices = Vec::with_capacity(geometry.indices.len());
        let mut split_any = false;

        for triangle in geometry.indices.chunks_exact(3) {
            let [i0, i1, i2] = [triangle[0], triangle[1], triangle[2]];
            let (p0, p1, p2) = match (
                geometry.positions.get(i0 as usize),
                geometry.positions.get(i1 as usize),
                geometry.positions.get(i2 as usize),
            ) {
                (Some(&p0), Some(&p1), Some(&p2)) => (p0, p1, p2),
                // Out of range index, drop the triangle
                _ => continue,
            };

            let e01 = geo_edge_length(p0.geo, p1.geo);
            let e12 = geo_edge_length(p1.geo, p2.geo);
            let e20 = geo_edge_length(p2.geo, p0.geo);

            if e01.max(e12).max(e20) > MAX_EDGE_LENGTH_DEG {
                let m01 = midpoint_index(&mut midpoints, &mut geometry.positions, i0, i1);
                let m12 = midpoint_index(&mut midpoints, &mut geometry.positions, i1, i2);
                let m20 = midpoint_index(&mut midpoints, &mut geometry.positions, i2, i0);
                next_indices.extend([i0, m01, m20]);
                next_indices.extend([m01, i1, m12]);
                next_indices.extend([m20, m12, i2]);
                next_indices.extend([m01, m12, m20]);
                split_any = true;
            } else {
                // No side is too long
                next_indices.extend([i0, i1, i2]);
            }
        }

        geometry.indices = next_indices;
        if !split_any {
            break;
        }
    }
}

/// Index of the midpoint vertex for the undirected edge `(i, j)`, appending
/// the vertex on first use.
fn midpoint_index(
    midpoints: &mut HashMap<(u32, u32), u32>,
    positions: &mut Vec<MorphablePosition>,
    i: u32,
    j: u32,
) -> u32 {
    let edge = (i.min(j), i.max(j));
    if let Some(&index) = midpoints.get(&edge) {
        return index;
    }
    let a = positions[i as usize].geo;
    let b = positions[j as usize].geo;
    let midpoint = Coordinate {
        lat: (a.lat + b.lat) / 2.0,
        long: (a.long + b.long) / 2.0,
    };
    let index = positions.len() as u32;
    positions.push(MorphablePosition::from_geo(midpoint));
    midpoints.insert(edge, index);
    index
}
