use clap::Parser;
use globe_morph::heatmap::{clustered_points, rasterize, HeatmapConfig};
use globe_morph::project::Coordinate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;

/// Cluster centers for the bundled demo data set, one per metropolis.
const DEMO_CENTERS: [Coordinate; 6] = [
    Coordinate { lat: 40.0, long: -74.0 },
    Coordinate { lat: 34.0, long: -118.0 },
    Coordinate { lat: 51.0, long: 0.0 },
    Coordinate { lat: 35.0, long: 116.0 },
    Coordinate { lat: 20.0, long: 77.0 },
    Coordinate { lat: -23.0, long: -46.0 },
];
const DEMO_POINTS_PER_CLUSTER: usize = 30;
const DEMO_SPREAD: f32 = 15.0;
const DEMO_INTENSITY_RANGE: (f32, f32) = (0.3, 1.0);

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a JSON file with `[{ "position": { "lat", "long" }, "intensity" }]` samples
    #[arg(short, long, conflicts_with = "demo")]
    points: Option<PathBuf>,

    /// Generate the demo data set of clustered city samples instead of reading a file
    #[arg(long)]
    demo: bool,

    /// Seed for the demo generator
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Side length of the square density grid in cells
    #[arg(long, default_value_t = 256)]
    resolution: usize,

    /// Influence radius of a sample in degrees of arc
    #[arg(long, default_value_t = 8.0)]
    radius: f32,

    /// Kernel softness. Higher values spread the falloff wider
    #[arg(long, default_value_t = 0.4)]
    blur: f32,

    /// Normalization ceiling. Zero or less normalizes against the observed maximum
    #[arg(long, default_value_t = 1.0)]
    max_intensity: f32,

    /// Emit the grid as bytes (0-255) instead of floats
    #[arg(long)]
    bytes: bool,

    /// If the output should be pretty json or not
    #[arg(long)]
    pretty: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let points = if args.demo {
        let mut rng = StdRng::seed_from_u64(args.seed);
        clustered_points(
            &DEMO_CENTERS,
            DEMO_POINTS_PER_CLUSTER,
            DEMO_SPREAD,
            DEMO_INTENSITY_RANGE,
            &mut rng,
        )
    } else {
        let path = args.points.expect("either --points or --demo is required");
        let raw = fs::read_to_string(path).unwrap();
        serde_json::from_str(&raw).unwrap()
    };
    log::info!("Rasterizing {} samples", points.len());

    let config = HeatmapConfig {
        resolution: args.resolution,
        radius: args.radius,
        blur: args.blur,
        max_intensity: args.max_intensity,
    };
    let grid = rasterize(&points, &config);

    let stdout = std::io::stdout().lock();
    if args.bytes {
        let output = BytesOutput {
            resolution: grid.resolution(),
            cells: grid.to_bytes(),
        };
        write_json(stdout, &output, args.pretty);
    } else {
        write_json(stdout, &grid, args.pretty);
    }
}

#[derive(Debug, serde::Serialize)]
struct BytesOutput {
    resolution: usize,
    cells: Vec<u8>,
}

fn write_json(writer: impl std::io::Write, value: &impl serde::Serialize, pretty: bool) {
    if pretty {
        serde_json::to_writer_pretty(writer, value).unwrap();
    } else {
        serde_json::to_writer(writer, value).unwrap();
    }
}
