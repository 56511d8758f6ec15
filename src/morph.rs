use crate::linalg::{mix, normalize_or_zero, vec3, Vec3};
use crate::project::{self, Coordinate, FLAT_SCALE, GLOBE_RADIUS};

/// Distance from an endpoint below which hit-test geometry snaps to it.
const SNAP_MARGIN: f32 = 0.05;

/// A vertex that can travel between the globe and the flat map. Both
/// embeddings are precomputed from the same geographical coordinate, so a
/// renderer only ever blends between them.
#[derive(Copy, Clone, Debug)]
pub struct MorphablePosition {
    pub sphere: Vec3,
    pub flat: Vec3,
    pub geo: Coordinate,
}

impl MorphablePosition {
    /// Derives the sphere and flat embeddings with the shared scene constants.
    pub fn from_geo(geo: Coordinate) -> Self {
        MorphablePosition {
            sphere: project::geo_to_sphere(geo, GLOBE_RADIUS),
            flat: project::geo_to_flat(geo, FLAT_SCALE),
            geo,
        }
    }
}

/// An indexed triangle mesh of morphable vertices for one map feature.
/// Every index is smaller than `positions.len()`.
#[derive(Clone, Debug)]
pub struct MorphableGeometry {
    pub positions: Vec<MorphablePosition>,
    pub indices: Vec<u32>,
    pub feature_id: String,
}

impl MorphableGeometry {
    /// The nothing-to-render geometry produced for degenerate input.
    pub fn empty(feature_id: impl Into<String>) -> Self {
        MorphableGeometry {
            positions: Vec::new(),
            indices: Vec::new(),
            feature_id: feature_id.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Blends a vertex between its sphere (t = 0) and flat (t = 1) embedding.
/// `t` is clamped into [0, 1] and the endpoints reproduce the stored
/// positions exactly.
pub fn interpolate_position(p: MorphablePosition, t: f32) -> Vec3 {
    mix(p.sphere, p.flat, t.clamp(0.0, 1.0))
}

/// Flattens the interpolated position of every vertex into 3 floats per
/// vertex, in vertex order, ready for upload as a position attribute.
pub fn interpolated_positions(geometry: &MorphableGeometry, t: f32) -> Vec<f32> {
    let t = t.clamp(0.0, 1.0);
    let mut buffer = Vec::with_capacity(geometry.positions.len() * 3);
    for position in &geometry.positions {
        buffer.extend(mix(position.sphere, position.flat, t).into_array());
    }
    buffer
}

/// The sphere endpoint of every vertex as a flat attribute array, for
/// renderers that do the blend in a vertex stage.
pub fn sphere_positions(geometry: &MorphableGeometry) -> Vec<f32> {
    let mut buffer = Vec::with_capacity(geometry.positions.len() * 3);
    for position in &geometry.positions {
        buffer.extend(position.sphere.into_array());
    }
    buffer
}

/// The flat map endpoint of every vertex as a flat attribute array.
pub fn flat_positions(geometry: &MorphableGeometry) -> Vec<f32> {
    let mut buffer = Vec::with_capacity(geometry.positions.len() * 3);
    for position in &geometry.positions {
        buffer.extend(position.flat.into_array());
    }
    buffer
}

/// Surface normal of a morphing vertex. On the globe the normal points out
/// from the center, on the flat map it is +Z, and in between the two
/// directions are blended and renormalized.
pub fn morph_normal(sphere_position: Vec3, t: f32) -> Vec3 {
    let t = t.clamp(0.0, 1.0);
    let sphere_normal = normalize_or_zero(sphere_position);
    normalize_or_zero(mix(sphere_normal, vec3(0.0, 0.0, 1.0), t))
}

/// Per-vertex morphed normals as a flat attribute array.
pub fn interpolated_normals(geometry: &MorphableGeometry, t: f32) -> Vec<f32> {
    let mut buffer = Vec::with_capacity(geometry.positions.len() * 3);
    for position in &geometry.positions {
        buffer.extend(morph_normal(position.sphere, t).into_array());
    }
    buffer
}

/// Hit-test fast path. Rebuilding collider geometry every frame of a morph
/// is wasted work, so colliders resync only at the endpoints: inside the
/// snap margin this returns the endpoint to rebuild at, in mid-morph it
/// returns `None` and the caller keeps the previous collider. Render
/// positions always use the exact `t`.
pub fn snap_endpoint(t: f32) -> Option<f32> {
    if t < SNAP_MARGIN {
        Some(0.0)
    } else if t > 1.0 - SNAP_MARGIN {
        Some(1.0)
    } else {
        None
    }
}

/// Which of the two endpoint layouts the scene is closest to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ViewMode {
    Globe,
    Flat,
}

/// Owner of the single interpolation parameter the whole scene derives from.
/// 0 renders the globe, 1 the flat map.
#[derive(Clone, Debug, Default)]
pub struct MorphState {
    progress: f32,
}

impl MorphState {
    pub fn new() -> Self {
        MorphState { progress: 0.0 }
    }

    /// Current interpolation parameter, always in [0, 1].
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Sets the interpolation parameter, clamping into [0, 1].
    pub fn set_progress(&mut self, progress: f32) {
        self.progress = progress.clamp(0.0, 1.0);
    }

    /// Jumps straight to the exact endpoint of the requested mode.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.progress = match mode {
            ViewMode::Globe => 0.0,
            ViewMode::Flat => 1.0,
        };
    }

    pub fn view_mode(&self) -> ViewMode {
        if self.progress < 0.5 {
            ViewMode::Globe
        } else {
            ViewMode::Flat
        }
    }
}
