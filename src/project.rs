use crate::linalg::{vec3, Vec3};

/// Radius of the globe in scene units.
pub const GLOBE_RADIUS: f32 = 1.0;

/// Half the width of the unrolled map in scene units. The full flat map spans
/// `2 * FLAT_SCALE` wide by `FLAT_SCALE` tall, keeping the 2:1 aspect ratio
/// of an equirectangular world.
pub const FLAT_SCALE: f32 = 2.0;

/// A geographical coordinate in degrees.
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    pub lat: f32,
    pub long: f32,
}

/// Maps a geographical coordinate in degrees onto a sphere with the given
/// radius. The north pole maps to +Y and (0°N, 0°E) lands on +X, facing the
/// default camera.
pub fn geo_to_sphere(c: Coordinate, radius: f32) -> Vec3 {
    // Polar angle. 0 <= φ <= PI = colatitude in geography
    let phi = (90.0 - c.lat).to_radians();
    // Azimuthal angle = longitude. 0 <= θ <= 2*PI
    let theta = (c.long + 180.0).to_radians();
    let x = -(phi.sin() * theta.cos()) * radius;
    let z = phi.sin() * theta.sin() * radius;
    let y = phi.cos() * radius;
    vec3(x, y, z)
}

/// Lays the same coordinate out on the flat map plane at z = 0. Longitude
/// runs along x and latitude along y, so the world fills
/// `[-scale, scale] x [-scale/2, scale/2]`.
pub fn geo_to_flat(c: Coordinate, scale: f32) -> Vec3 {
    let x = c.long / 180.0 * scale;
    let y = c.lat / 90.0 * scale * 0.5;
    vec3(x, y, 0.0)
}

/// Recovers the geographical coordinate from a point on a sphere of any
/// radius, inverting [`geo_to_sphere`] up to float rounding. Longitude comes
/// out normalized to [-180, 180). The zero vector carries no direction and
/// maps to (0, 0) by convention.
pub fn sphere_to_geo(v: Vec3) -> Coordinate {
    let radius = v.length();
    if radius == 0.0 {
        return Coordinate { lat: 0.0, long: 0.0 };
    }
    let [x, y, z] = v.into_array();
    // The quotient can drift a ulp outside [-1, 1] near the poles.
    let phi = (y / radius).clamp(-1.0, 1.0).acos();
    let lat = 90.0 - phi.to_degrees();
    let mut long = z.atan2(-x).to_degrees() - 180.0;
    if long < -180.0 {
        long += 360.0;
    }
    Coordinate { lat, long }
}
