//! Buffer generation for a world map that morphs between a globe and a flat
//! map. GeoJSON geometry is triangulated and subdivided in lat/long space,
//! then leaves as paired sphere/flat vertex buffers a renderer can blend
//! with a single progress value. Density overlays, border strips and the
//! day/night shading reference live here too.

pub mod geo;
pub mod heatmap;
pub mod linalg;
pub mod morph;
pub mod overlay;
pub mod project;
pub mod shading;
pub mod subdivide;
