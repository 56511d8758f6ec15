use clap::Parser;
use geojson::GeoJson;
use globe_morph::geo::geojson_to_geometries;
use globe_morph::morph::{
    flat_positions, interpolated_positions, sphere_positions, MorphableGeometry,
};
use globe_morph::subdivide::subdivide_geometry;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use total_float_wrap::TotalF32;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the GeoJSON input file to process
    #[arg(short, long)]
    geojson: PathBuf,

    /// If the output should be pretty json or not
    #[arg(long)]
    pretty: bool,

    /// If triangles with long geographical edges should be subdivided or not
    #[arg(long)]
    subdivide: bool,

    /// Morph progress baked into the `positions` buffer. 0 is the globe,
    /// 1 the flat map
    #[arg(long, default_value_t = 0.0)]
    morph: f32,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let geojson = parse_geojson(&args.geojson);
    let mut geometries = geojson_to_geometries(&geojson);
    log::info!(
        "Parsed and earcutrd GeoJson has {} features",
        geometries.len()
    );

    if args.subdivide {
        for geometry in &mut geometries {
            subdivide_geometry(geometry);
        }
    }
    let num_triangles: usize = geometries
        .iter()
        .map(MorphableGeometry::triangle_count)
        .sum();
    log::info!(
        "Prepared {} triangles across {} features",
        num_triangles,
        geometries.len()
    );

    let num_raw_vertices: usize = geometries
        .iter()
        .map(|geometry| geometry.positions.len())
        .sum();
    log::info!("Total vertices: {}", num_raw_vertices);

    let mut output = Output {
        features: Vec::with_capacity(geometries.len()),
    };
    for geometry in &geometries {
        output.features.push(feature_buffers(geometry, args.morph));
    }

    let num_welded_vertices: usize = output
        .features
        .iter()
        .map(|feature| feature.sphere_positions.len() / 3)
        .sum();
    eprintln!(
        "Vertices after removing duplicates: {}",
        num_welded_vertices
    );
    eprintln!(
        "Ratio: {}",
        num_welded_vertices as f32 / num_raw_vertices as f32
    );

    let stdout = std::io::stdout().lock();
    if args.pretty {
        serde_json::to_writer_pretty(stdout, &output).unwrap();
    } else {
        serde_json::to_writer(stdout, &output).unwrap();
    }
}

#[derive(Debug, serde::Serialize)]
struct Output {
    features: Vec<FeatureBuffers>,
}

/// Render-ready buffers for one feature. Each group of three floats in the
/// position vectors is one vertice.
#[derive(Debug, serde::Serialize)]
struct FeatureBuffers {
    feature_id: String,
    /// Blended to the requested morph progress.
    positions: Vec<f32>,
    sphere_positions: Vec<f32>,
    flat_positions: Vec<f32>,
    indices: Vec<u32>,
}

/// Welds vertices sharing a geographical coordinate and derives the final
/// attribute buffers for one feature.
fn feature_buffers(geometry: &MorphableGeometry, morph: f32) -> FeatureBuffers {
    let mut seen_vertices: HashMap<(TotalF32, TotalF32), u32> = HashMap::new();
    let mut welded = MorphableGeometry::empty(geometry.feature_id.clone());
    let mut remap = Vec::with_capacity(geometry.positions.len());
    let mut next_index: u32 = 0;
    for &position in &geometry.positions {
        let key = (TotalF32(position.geo.lat), TotalF32(position.geo.long));
        match seen_vertices.entry(key) {
            Entry::Occupied(entry) => {
                remap.push(*entry.get());
            }
            Entry::Vacant(entry) => {
                entry.insert(next_index);
                remap.push(next_index);
                welded.positions.push(position);
                next_index = next_index.checked_add(1).unwrap();
            }
        }
    }
    welded.indices = geometry
        .indices
        .iter()
        .map(|&index| remap[index as usize])
        .collect();

    FeatureBuffers {
        feature_id: welded.feature_id.clone(),
        positions: interpolated_positions(&welded, morph),
        sphere_positions: sphere_positions(&welded),
        flat_positions: flat_positions(&welded),
        indices: welded.indices,
    }
}

fn parse_geojson(path: impl AsRef<Path>) -> GeoJson {
    let geojson_str = fs::read_to_string(path).unwrap();
    geojson_str.parse::<GeoJson>().unwrap()
}
