use geojson::GeoJson;
use globe_morph::geo::border_rings;
use globe_morph::linalg::{mix, vec3, Vec3};
use globe_morph::project::{geo_to_flat, geo_to_sphere, Coordinate, FLAT_SCALE, GLOBE_RADIUS};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use total_float_wrap::TotalF32;

/// Radial factor keeping borders from z-fighting the fill mesh.
const SPHERE_OFFSET: f32 = 1.001;
/// Border height above the flat map plane.
const FLAT_OFFSET: f32 = 0.001;

fn parse_geojson(path: impl AsRef<Path>) -> GeoJson {
    let geojson_str = fs::read_to_string(path).unwrap();
    geojson_str.parse::<GeoJson>().unwrap()
}

/// The structur this program outputs (in JSON format).
#[derive(Debug, serde::Serialize)]
struct Output {
    /// A vector with vertice float values for OpenGL to render. each group of three
    /// floats is one vertice. So `(positions[x], positions[x+1], positions[x+2])` is
    /// one vertice.
    positions: Vec<f32>,
    /// Every pair of indices is one line segment.
    indices: Vec<u32>,
}

fn main() {
    env_logger::init();
    let mut args = std::env::args();
    let geo = parse_geojson(args.nth(1).unwrap());
    let morph: f32 = args.next().map(|raw| raw.parse().unwrap()).unwrap_or(0.0);

    let mut rings = Vec::new();
    match geo {
        GeoJson::FeatureCollection(ref ctn) => {
            for feature in &ctn.features {
                if let Some(geometry) = &feature.geometry {
                    rings.extend(border_rings(geometry));
                }
            }
        }
        GeoJson::Feature(ref feature) => {
            if let Some(geometry) = &feature.geometry {
                rings.extend(border_rings(geometry));
            }
        }
        GeoJson::Geometry(ref geometry) => rings.extend(border_rings(geometry)),
    }

    let mut seen_vertices: HashMap<(TotalF32, TotalF32), u32> = HashMap::new();
    let mut output = Output {
        positions: Vec::new(),
        indices: Vec::new(),
    };
    let mut next_index: u32 = 0;
    for mut ring in rings {
        if ring.len() >= 3 {
            // Rings arrive without their closing duplicate, so put it back
            // to close the border loop
            ring.push(ring[0]);
        }
        for segment in ring.windows(2) {
            for &coordinate in segment {
                let key = (TotalF32(coordinate.lat), TotalF32(coordinate.long));
                match seen_vertices.entry(key) {
                    Entry::Occupied(entry) => {
                        // This vertex is already in `output.positions`,
                        // just push the index
                        output.indices.push(*entry.get());
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(next_index);
                        output.indices.push(next_index);
                        output
                            .positions
                            .extend(border_position(coordinate, morph).into_array());
                        next_index = next_index.checked_add(1).unwrap();
                    }
                }
            }
        }
    }

    let stdout = std::io::stdout().lock();
    serde_json::to_writer(stdout, &output).unwrap();
}

/// A border vertex blended to the given morph progress, floated just off
/// the surface on both ends of the morph.
fn border_position(coordinate: Coordinate, morph: f32) -> Vec3 {
    let sphere = geo_to_sphere(coordinate, GLOBE_RADIUS * SPHERE_OFFSET);
    let [x, y, _] = geo_to_flat(coordinate, FLAT_SCALE).into_array();
    let flat = vec3(x, y, FLAT_OFFSET);
    mix(sphere, flat, morph.clamp(0.0, 1.0))
}
