use geojson::{Feature, GeoJson, Geometry, PolygonType, Value};

use crate::linalg::{vec3, Vec3};
use crate::morph::{MorphableGeometry, MorphablePosition};
use crate::project::Coordinate;

/// Property keys tried in order when resolving a feature id.
const FEATURE_ID_KEYS: [&str; 3] = ["iso_a3", "ISO_A3", "name"];

/// Triangulates every feature of a parsed GeoJSON document into one
/// morphable geometry each.
pub fn geojson_to_geometries(geojson: &GeoJson) -> Vec<MorphableGeometry> {
    match *geojson {
        GeoJson::FeatureCollection(ref collection) => collection
            .features
            .iter()
            .enumerate()
            .map(|(index, feature)| feature_to_geometry(feature, &format!("feature-{index}")))
            .collect(),
        GeoJson::Feature(ref feature) => vec![feature_to_geometry(feature, "feature-0")],
        GeoJson::Geometry(ref geometry) => vec![geometry_to_morphable(geometry, "feature-0")],
    }
}

/// Triangulates one feature, labeling the result with its resolved id.
/// Features without geometry come out empty.
pub fn feature_to_geometry(feature: &Feature, fallback_id: &str) -> MorphableGeometry {
    let feature_id = resolve_feature_id(feature, fallback_id);
    match feature.geometry {
        Some(ref geometry) => geometry_to_morphable(geometry, &feature_id),
        None => MorphableGeometry::empty(feature_id),
    }
}

/// A meaningful feature id: ISO alpha-3 code or name from the properties
/// when present, else the GeoJSON id, else the caller's fallback.
fn resolve_feature_id(feature: &Feature, fallback: &str) -> String {
    if let Some(ref properties) = feature.properties {
        for key in FEATURE_ID_KEYS {
            if let Some(value) = properties.get(key).and_then(|value| value.as_str()) {
                return value.to_owned();
            }
        }
    }
    match feature.id {
        Some(geojson::feature::Id::String(ref id)) => id.clone(),
        Some(geojson::feature::Id::Number(ref id)) => id.to_string(),
        None => fallback.to_owned(),
    }
}

/// Triangulates a GeoJSON geometry. Only polygons carry fillable area;
/// every other geometry type comes out empty.
pub fn geometry_to_morphable(geometry: &Geometry, feature_id: &str) -> MorphableGeometry {
    match &geometry.value {
        Value::Polygon(polygon) => {
            log::debug!("Matched a Polygon");
            triangulate_polygon(polygon, feature_id)
        }
        Value::MultiPolygon(polygons) => {
            log::debug!("Matched a MultiPolygon");
            let mut combined = MorphableGeometry::empty(feature_id);
            for polygon in polygons {
                let part = triangulate_polygon(polygon, feature_id);
                let offset = combined.positions.len() as u32;
                combined.positions.extend(part.positions);
                combined
                    .indices
                    .extend(part.indices.iter().map(|&index| index + offset));
            }
            combined
        }
        // Point, LineString, their Multi- counterparts and nested collections
        _ => {
            log::debug!("Skipping unsupported geometry type for {}", feature_id);
            MorphableGeometry::empty(feature_id)
        }
    }
}

/// Triangulates one polygon (outer ring plus holes) with ear clipping in raw
/// longitude/latitude space. Ring coordinates become the vertex list in ring
/// order and the returned indices point into it. Degenerate polygons and ear
/// cutting failures produce an empty geometry.
pub fn triangulate_polygon(polygon: &PolygonType, feature_id: &str) -> MorphableGeometry {
    let mut coordinates: Vec<Coordinate> = Vec::new();
    let mut flat_vertices: Vec<f32> = Vec::new();
    let mut hole_indices: Vec<usize> = Vec::new();

    for (ring_index, ring) in polygon.iter().enumerate() {
        let ring = ring_without_closing_point(ring);
        if ring.len() < 3 {
            if ring_index == 0 {
                // Nothing to fill without a complete outer ring
                return MorphableGeometry::empty(feature_id);
            }
            log::debug!("Skipping degenerate hole ring in {}", feature_id);
            continue;
        }
        if ring_index > 0 {
            hole_indices.push(coordinates.len());
        }
        for position in ring {
            // Lower resolution to f32 and use for the rest of the program
            let long = position[0] as f32;
            let lat = position[1] as f32;
            coordinates.push(Coordinate { lat, long });
            flat_vertices.push(long);
            flat_vertices.push(lat);
        }
    }

    let triangle_indices = match earcutr::earcut(&flat_vertices, &hole_indices, 2) {
        Ok(indices) => indices,
        Err(error) => {
            log::warn!("Ear cutting failed for {}: {:?}", feature_id, error);
            return MorphableGeometry::empty(feature_id);
        }
    };

    MorphableGeometry {
        positions: coordinates
            .into_iter()
            .map(MorphablePosition::from_geo)
            .collect(),
        indices: triangle_indices
            .into_iter()
            .map(|index| index as u32)
            .collect(),
        feature_id: feature_id.to_owned(),
    }
}

/// GeoJSON rings repeat the first position as the last one. The duplicate
/// would triangulate as a zero length edge, so it is dropped.
fn ring_without_closing_point(ring: &[Vec<f64>]) -> &[Vec<f64>] {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if ring.len() >= 2 && first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}

/// Outer rings of every polygon in a geometry, open (no closing duplicate),
/// for border line rendering. Holes never contribute to borders.
pub fn border_rings(geometry: &Geometry) -> Vec<Vec<Coordinate>> {
    let mut rings = Vec::new();
    match &geometry.value {
        Value::Polygon(polygon) => rings.extend(outer_ring(polygon)),
        Value::MultiPolygon(polygons) => {
            for polygon in polygons {
                rings.extend(outer_ring(polygon));
            }
        }
        _ => log::debug!("No border rings in unsupported geometry type"),
    }
    rings
}

fn outer_ring(polygon: &PolygonType) -> Option<Vec<Coordinate>> {
    let ring = ring_without_closing_point(polygon.first()?);
    if ring.len() < 2 {
        return None;
    }
    Some(
        ring.iter()
            .map(|position| Coordinate {
                lat: position[1] as f32,
                long: position[0] as f32,
            })
            .collect(),
    )
}

/// Cartesian centroid of the sphere embeddings, for anchoring labels above
/// the globe. Empty input averages to the origin.
pub fn centroid(positions: &[MorphablePosition]) -> Vec3 {
    if positions.is_empty() {
        return vec3(0.0, 0.0, 0.0);
    }
    let mut sum = vec3(0.0, 0.0, 0.0);
    for position in positions {
        sum = sum + position.sphere;
    }
    sum / positions.len() as f32
}

/// Mean geographical coordinate, for camera focus targets.
pub fn geo_centroid(coordinates: &[Coordinate]) -> Coordinate {
    if coordinates.is_empty() {
        return Coordinate { lat: 0.0, long: 0.0 };
    }
    let mut lat = 0.0;
    let mut long = 0.0;
    for c in coordinates {
        lat += c.lat;
        long += c.long;
    }
    let count = coordinates.len() as f32;
    Coordinate {
        lat: lat / count,
        long: long / count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morph;
    use crate::subdivide::{self, MAX_EDGE_LENGTH_DEG};
    use geojson::JsonObject;
    use pretty_assertions::assert_eq;

    fn square_ring(origin: (f64, f64), size: f64) -> Vec<Vec<f64>> {
        let (x, y) = origin;
        vec![
            vec![x, y],
            vec![x + size, y],
            vec![x + size, y + size],
            vec![x, y + size],
            vec![x, y],
        ]
    }

    fn polygon_geometry(polygon: PolygonType) -> Geometry {
        Geometry::new(Value::Polygon(polygon))
    }

    #[test]
    fn square_triangulates_into_two_triangles() {
        let geometry = triangulate_polygon(&vec![square_ring((0.0, 0.0), 20.0)], "square");
        assert_eq!(geometry.positions.len(), 4);
        assert_eq!(geometry.triangle_count(), 2);
        assert!(geometry.indices.iter().all(|&index| index < 4));
    }

    #[test]
    fn closing_duplicate_is_dropped_from_the_vertex_list() {
        let ring = square_ring((10.0, 10.0), 5.0);
        assert_eq!(ring.len(), 5);
        let geometry = triangulate_polygon(&vec![ring], "square");
        assert_eq!(geometry.positions.len(), 4);
    }

    #[test]
    fn degenerate_outer_ring_yields_empty_geometry() {
        let line = vec![vec![0.0, 0.0], vec![10.0, 0.0], vec![0.0, 0.0]];
        let geometry = triangulate_polygon(&vec![line], "line");
        assert!(geometry.is_empty());
        assert_eq!(geometry.feature_id, "line");
    }

    #[test]
    fn unsupported_geometry_yields_empty_geometry() {
        let point = Geometry::new(Value::Point(vec![4.9, 52.4]));
        let geometry = geometry_to_morphable(&point, "point");
        assert!(geometry.is_empty());
    }

    #[test]
    fn hole_vertices_join_the_vertex_list() {
        let polygon = vec![square_ring((0.0, 0.0), 20.0), square_ring((8.0, 8.0), 4.0)];
        let geometry = triangulate_polygon(&polygon, "donut");
        assert_eq!(geometry.positions.len(), 8);
        // n + 2h - 2 triangles for a polygon with h holes
        assert_eq!(geometry.triangle_count(), 8);
        assert!(geometry.indices.iter().all(|&index| index < 8));
    }

    #[test]
    fn degenerate_hole_ring_is_skipped() {
        let polygon = vec![square_ring((0.0, 0.0), 20.0), vec![vec![5.0, 5.0], vec![5.0, 5.0]]];
        let geometry = triangulate_polygon(&polygon, "square");
        assert_eq!(geometry.positions.len(), 4);
        assert_eq!(geometry.triangle_count(), 2);
    }

    #[test]
    fn multi_polygon_concatenates_with_offset_indices() {
        let multi = Geometry::new(Value::MultiPolygon(vec![
            vec![square_ring((0.0, 0.0), 5.0)],
            vec![square_ring((30.0, 30.0), 5.0)],
        ]));
        let geometry = geometry_to_morphable(&multi, "islands");
        assert_eq!(geometry.positions.len(), 8);
        assert_eq!(geometry.triangle_count(), 4);
        // The second polygon's triangles index only its own vertices.
        assert!(geometry.indices[6..].iter().all(|&index| (4..8).contains(&index)));
        assert!(geometry.indices[..6].iter().all(|&index| index < 4));
    }

    #[test]
    fn feature_id_prefers_iso_code_properties() {
        let mut properties = JsonObject::new();
        properties.insert("iso_a3".to_owned(), serde_json::json!("SWE"));
        properties.insert("name".to_owned(), serde_json::json!("Sweden"));
        let feature = Feature {
            bbox: None,
            geometry: Some(polygon_geometry(vec![square_ring((11.0, 55.0), 5.0)])),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        };
        assert_eq!(feature_to_geometry(&feature, "feature-0").feature_id, "SWE");
    }

    #[test]
    fn feature_id_falls_back_to_geojson_id_then_caller() {
        let with_id = Feature {
            bbox: None,
            geometry: None,
            id: Some(geojson::feature::Id::String("greenland".to_owned())),
            properties: None,
            foreign_members: None,
        };
        assert_eq!(feature_to_geometry(&with_id, "feature-3").feature_id, "greenland");

        let bare = Feature {
            bbox: None,
            geometry: None,
            id: None,
            properties: None,
            foreign_members: None,
        };
        let geometry = feature_to_geometry(&bare, "feature-3");
        assert_eq!(geometry.feature_id, "feature-3");
        assert!(geometry.is_empty());
    }

    #[test]
    fn border_rings_keep_outer_rings_only() {
        let polygon = vec![square_ring((0.0, 0.0), 20.0), square_ring((8.0, 8.0), 4.0)];
        let rings = border_rings(&polygon_geometry(polygon));
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 4);
    }

    #[test]
    fn border_rings_cover_every_multi_polygon_part() {
        let multi = Geometry::new(Value::MultiPolygon(vec![
            vec![square_ring((0.0, 0.0), 5.0)],
            vec![square_ring((30.0, 30.0), 5.0)],
        ]));
        let rings = border_rings(&multi);
        assert_eq!(rings.len(), 2);
    }

    #[test]
    fn centroid_of_opposing_points_cancels_out() {
        let positions: Vec<MorphablePosition> = [0.0f32, 90.0, 180.0, -90.0]
            .iter()
            .map(|&long| MorphablePosition::from_geo(Coordinate { lat: 0.0, long }))
            .collect();
        let center = centroid(&positions).into_array();
        for component in center {
            assert!(component.abs() < 1e-6);
        }
        assert_eq!(centroid(&[]).into_array(), [0.0; 3]);
    }

    #[test]
    fn geo_centroid_averages_in_degree_space() {
        let coordinates = [
            Coordinate { lat: 10.0, long: 20.0 },
            Coordinate { lat: 30.0, long: 40.0 },
        ];
        let center = geo_centroid(&coordinates);
        assert_eq!(center, Coordinate { lat: 20.0, long: 30.0 });
        assert_eq!(geo_centroid(&[]), Coordinate { lat: 0.0, long: 0.0 });
    }

    // The full pipeline the renderer runs: triangulate a 20 degree square,
    // subdivide, and derive upload buffers.
    #[test]
    fn square_pipeline_from_rings_to_buffers() {
        let run = || {
            let mut geometry = triangulate_polygon(&vec![square_ring((0.0, 0.0), 20.0)], "square");
            assert_eq!(geometry.positions.len(), 4);
            assert_eq!(geometry.triangle_count(), 2);
            subdivide::subdivide_geometry(&mut geometry);
            geometry
        };

        let geometry = run();
        assert_eq!(geometry.positions.len(), 25);
        assert_eq!(geometry.triangle_count(), 32);
        assert_eq!(geometry.indices.len(), 96);
        for triangle in geometry.indices.chunks_exact(3) {
            for (a, b) in [
                (triangle[0], triangle[1]),
                (triangle[1], triangle[2]),
                (triangle[2], triangle[0]),
            ] {
                let a = geometry.positions[a as usize].geo;
                let b = geometry.positions[b as usize].geo;
                assert!(subdivide::geo_edge_length(a, b) <= MAX_EDGE_LENGTH_DEG);
            }
        }

        let halfway = morph::interpolated_positions(&geometry, 0.5);
        assert_eq!(halfway.len(), 75);
        assert!(halfway.iter().all(|value| value.is_finite()));

        // Identical input produces identical buffers on every run.
        let again = run();
        assert_eq!(again.indices, geometry.indices);
        assert_eq!(morph::interpolated_positions(&again, 0.5), halfway);
    }
}
