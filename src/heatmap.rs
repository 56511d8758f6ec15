use std::f32::consts::TAU;

use rand::Rng;

use crate::project::Coordinate;

/// A weighted sample at a geographical position.
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HeatmapPoint {
    pub position: Coordinate,
    pub intensity: f32,
}

/// Rasterization parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HeatmapConfig {
    /// Side length of the square grid in cells.
    pub resolution: usize,
    /// Influence radius of a point in degrees of arc.
    pub radius: f32,
    /// Kernel softness. Higher values spread the falloff wider.
    pub blur: f32,
    /// Normalization ceiling. Non-positive switches to the observed maximum.
    pub max_intensity: f32,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        HeatmapConfig {
            resolution: 256,
            radius: 8.0,
            blur: 0.4,
            max_intensity: 1.0,
        }
    }
}

/// A square density grid of normalized [0, 1] intensities. Rows run south to
/// north: cell (u, v) sits at `cells[v * resolution + u]` with u mapped from
/// longitude and v from latitude.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct DensityGrid {
    resolution: usize,
    cells: Vec<f32>,
}

impl DensityGrid {
    fn zero(resolution: usize) -> Self {
        DensityGrid {
            resolution,
            cells: vec![0.0; resolution * resolution],
        }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    /// Cell value at column `u`, row `v`. Both must be inside the grid.
    pub fn get(&self, u: usize, v: usize) -> f32 {
        self.cells[v * self.resolution + u]
    }

    /// 8-bit rendition for texture upload: `floor(cell * 255)` per cell.
    /// The real-valued grid stays the authoritative data.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.cells.iter().map(|&cell| (cell * 255.0) as u8).collect()
    }
}

/// Rasterizes weighted samples into a density grid with a Gaussian kernel.
///
/// Longitude wraps, so density near ±180° bleeds across to the other side of
/// the grid. Latitude does not wrap and rows past the poles are clipped.
/// Every point's footprint is cut off beyond `radius` degrees. Cells come
/// out normalized into [0, 1] against `max_intensity` when it is positive,
/// else against the observed maximum; an all-zero grid stays zero.
pub fn rasterize(points: &[HeatmapPoint], config: &HeatmapConfig) -> DensityGrid {
    let resolution = config.resolution;
    let mut grid = DensityGrid::zero(resolution);
    if points.is_empty() || config.radius <= 0.0 {
        return grid;
    }

    let radius_norm = config.radius / 180.0;
    let radius_sq = radius_norm * radius_norm;
    // Blur is floored so sigma stays positive
    let sigma = radius_norm * config.blur.max(0.1);
    let two_sigma_sq = 2.0 * sigma * sigma;
    let kernel_radius = (radius_norm * resolution as f32).ceil() as isize;
    let res = resolution as isize;

    for point in points {
        let u = (point.position.long + 180.0) / 360.0;
        let v = (point.position.lat + 90.0) / 180.0;
        let cx = (u * resolution as f32).floor() as isize;
        let cy = (v * resolution as f32).floor() as isize;

        for dy in -kernel_radius..=kernel_radius {
            let py = cy + dy;
            if py < 0 || py >= res {
                continue;
            }
            for dx in -kernel_radius..=kernel_radius {
                let px = (cx + dx).rem_euclid(res);
                let dist_x = dx as f32 / resolution as f32;
                let dist_y = dy as f32 / resolution as f32;
                let dist_sq = dist_x * dist_x + dist_y * dist_y;
                if dist_sq > radius_sq {
                    continue;
                }
                let weight = (-dist_sq / two_sigma_sq).exp();
                grid.cells[(py * res + px) as usize] += point.intensity * weight;
            }
        }
    }

    normalize(&mut grid, config.max_intensity);
    grid
}

fn normalize(grid: &mut DensityGrid, max_intensity: f32) {
    let observed_max = grid.cells.iter().fold(0.0f32, |max, &cell| max.max(cell));
    let norm = if max_intensity > 0.0 {
        max_intensity
    } else {
        observed_max
    };
    if norm > 0.0 {
        for cell in &mut grid.cells {
            *cell = (*cell / norm).min(1.0);
        }
    }
}

/// Uniform random samples across the globe, avoiding the exact poles.
pub fn random_points(
    count: usize,
    intensity_range: (f32, f32),
    rng: &mut impl Rng,
) -> Vec<HeatmapPoint> {
    (0..count)
        .map(|_| HeatmapPoint {
            position: Coordinate {
                lat: rng.random::<f32>() * 170.0 - 85.0,
                long: rng.random::<f32>() * 360.0 - 180.0,
            },
            intensity: sample_intensity(intensity_range, rng),
        })
        .collect()
}

/// Gaussian clusters of samples around the given centers. `spread` is the
/// cluster's standard deviation in degrees. Longitude wraps into [-180, 180)
/// and latitude clamps to [-85, 85].
pub fn clustered_points(
    centers: &[Coordinate],
    points_per_cluster: usize,
    spread: f32,
    intensity_range: (f32, f32),
    rng: &mut impl Rng,
) -> Vec<HeatmapPoint> {
    let mut points = Vec::with_capacity(centers.len() * points_per_cluster);
    for center in centers {
        for _ in 0..points_per_cluster {
            let angle = rng.random::<f32>() * TAU;
            let distance = (gaussian(rng) * spread).abs();
            let long = center.long + angle.cos() * distance;
            let lat = (center.lat + angle.sin() * distance).clamp(-85.0, 85.0);
            points.push(HeatmapPoint {
                position: Coordinate {
                    lat,
                    long: (long + 180.0).rem_euclid(360.0) - 180.0,
                },
                intensity: sample_intensity(intensity_range, rng),
            });
        }
    }
    points
}

fn sample_intensity(range: (f32, f32), rng: &mut impl Rng) -> f32 {
    range.0 + rng.random::<f32>() * (range.1 - range.0)
}

/// Box-Muller transform for a standard Gaussian sample.
fn gaussian(rng: &mut impl Rng) -> f32 {
    // 1 - random() lands in (0, 1], keeping the log finite
    let u = 1.0 - rng.random::<f32>();
    let v = rng.random::<f32>();
    (-2.0 * u.ln()).sqrt() * (TAU * v).cos()
}
