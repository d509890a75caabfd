//! Geographic coordinates onto a render sphere.
//!
//! Scene convention: `+Y` is the north pole, longitude is offset by 180 degrees
//! so the prime meridian faces `+X`, and `+Z` points at 90 degrees west.

use core::f64::consts::PI;

use super::Vec3;
use crate::geo::{GeoCoordinate, GeoGeometry};

/// A point on a sphere of a known radius, `|p| == radius`.
pub type SpherePoint = Vec3;

/// Projects `(lat, lon)` in degrees onto a sphere of `radius`.
///
/// `lat = ±90` collapses onto the pole regardless of longitude. Longitude is not
/// normalized; out-of-range values still land on the sphere because the map is
/// periodic.
pub fn project(lat_deg: f64, lon_deg: f64, radius: f64) -> SpherePoint {
    let phi = (90.0 - lat_deg) * (PI / 180.0);
    let theta = (lon_deg + 180.0) * (PI / 180.0);

    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();

    let x = -radius * sin_phi * cos_theta;
    let y = radius * cos_phi;
    let z = radius * sin_phi * sin_theta;

    // At the poles sin(phi) is ~1e-16 rather than 0; pin the collapse exactly.
    if lat_deg.abs() == 90.0 {
        return Vec3::new(0.0, y, 0.0);
    }

    Vec3::new(x, y, z)
}

pub fn project_coordinate(coord: GeoCoordinate, radius: f64) -> SpherePoint {
    project(coord.lat_deg, coord.lon_deg, radius)
}

/// One projected ring of a boundary outline.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<SpherePoint>,
    pub closed: bool,
}

impl Polyline {
    /// Number of straight chords drawn for this ring.
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }
}

/// Outline of one boundary feature on the sphere. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundaryGeometry {
    pub polylines: Vec<Polyline>,
}

impl BoundaryGeometry {
    pub fn vertex_count(&self) -> usize {
        self.polylines.iter().map(|p| p.points.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.polylines.is_empty()
    }
}

/// Projects every vertex of every ring independently.
///
/// No simplification and no densification: consecutive vertices become straight
/// chords through the sphere, which is an accepted approximation for outlines.
pub fn project_boundary(geometry: &GeoGeometry, radius: f64) -> BoundaryGeometry {
    let polylines = geometry
        .rings()
        .into_iter()
        .map(|ring| Polyline {
            points: ring
                .coordinates
                .iter()
                .map(|c| project_coordinate(*c, radius))
                .collect(),
            closed: ring.closed,
        })
        .collect();

    BoundaryGeometry { polylines }
}

#[cfg(test)]
mod tests {
    use super::{project, project_boundary};
    use crate::geo::{GeoCoordinate, GeoGeometry};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn points_land_on_the_sphere() {
        for radius in [0.5, 2.0, 2.1, 100.0] {
            for lat in [-90.0, -63.2, -10.0, 0.0, 33.3, 71.0, 90.0] {
                for lon in [-180.0, -97.5, 0.0, 12.25, 179.9, 180.0, 400.0] {
                    let p = project(lat, lon, radius);
                    assert_close(p.length(), radius, 1e-9 * radius);
                }
            }
        }
    }

    #[test]
    fn poles_collapse_regardless_of_longitude() {
        assert_eq!(project(90.0, 0.0, 2.0), project(90.0, 123.0, 2.0));
        assert_eq!(project(-90.0, -45.0, 2.0), project(-90.0, 170.0, 2.0));

        let north = project(90.0, 10.0, 2.0);
        assert_eq!(north.x, 0.0);
        assert_eq!(north.z, 0.0);
        assert_close(north.y, 2.0, 1e-12);
    }

    #[test]
    fn equator_prime_meridian_is_pinned() {
        // phi = 90 deg, theta = 180 deg: x = -2 * 1 * cos(180 deg) = 2.
        let p = project(0.0, 0.0, 2.0);
        assert_close(p.x, 2.0, 1e-12);
        assert_close(p.y, 0.0, 1e-12);
        assert_close(p.z, 0.0, 1e-12);
        assert_eq!(p, project(0.0, 0.0, 2.0));
    }

    #[test]
    fn equator_quadrants() {
        let west = project(0.0, -90.0, 1.0);
        assert_close(west.x, 0.0, 1e-12);
        assert_close(west.z, 1.0, 1e-12);

        let east = project(0.0, 90.0, 1.0);
        assert_close(east.x, 0.0, 1e-12);
        assert_close(east.z, -1.0, 1e-12);

        let antimeridian = project(0.0, -180.0, 1.0);
        assert_close(antimeridian.x, -1.0, 1e-12);
        assert_close(antimeridian.z, 0.0, 1e-12);
    }

    #[test]
    fn boundary_keeps_topology_and_vertex_count() {
        let ring = vec![
            GeoCoordinate::new(0.0, 0.0),
            GeoCoordinate::new(0.0, 90.0),
            GeoCoordinate::new(45.0, 45.0),
            GeoCoordinate::new(0.0, 0.0),
        ];
        let line = vec![GeoCoordinate::new(-10.0, -10.0), GeoCoordinate::new(10.0, 10.0)];

        let poly = project_boundary(&GeoGeometry::Polygon(vec![ring]), 2.0);
        assert_eq!(poly.polylines.len(), 1);
        assert!(poly.polylines[0].closed);
        assert_eq!(poly.vertex_count(), 4);
        assert_eq!(poly.polylines[0].segment_count(), 3);
        assert_eq!(poly.polylines[0].points[0], poly.polylines[0].points[3]);

        let open = project_boundary(&GeoGeometry::LineString(line), 2.0);
        assert!(!open.polylines[0].closed);
        for p in &open.polylines[0].points {
            assert_close(p.length(), 2.0, 1e-12);
        }
    }

    #[test]
    fn long_edges_are_chords_not_arcs() {
        let line = GeoGeometry::LineString(vec![
            GeoCoordinate::new(0.0, -90.0),
            GeoCoordinate::new(0.0, 90.0),
        ]);
        let geom = project_boundary(&line, 1.0);
        let pts = &geom.polylines[0].points;
        assert_eq!(pts.len(), 2);
        let mid = (pts[0] + pts[1]) * 0.5;
        assert!(mid.length() < 0.5);
    }
}
