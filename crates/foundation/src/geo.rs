/// Geographic coordinate in degrees.
///
/// Latitude is expected in `[-90, 90]` and longitude in `[-180, 180]`; values
/// outside those ranges are carried as-is (projection stays periodic).
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct GeoCoordinate {
    pub lat_deg: f64,
    pub lon_deg: f64,
}

impl GeoCoordinate {
    pub fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self { lat_deg, lon_deg }
    }

    pub fn is_finite(&self) -> bool {
        self.lat_deg.is_finite() && self.lon_deg.is_finite()
    }

    /// `(0, 0)` is the "no location" sentinel in animal data.
    pub fn is_null_island(&self) -> bool {
        self.lat_deg == 0.0 && self.lon_deg == 0.0
    }
}

/// Outline geometry of one boundary feature.
///
/// Every variant decomposes into rings; polygon holes are just more rings.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoGeometry {
    LineString(Vec<GeoCoordinate>),
    MultiLineString(Vec<Vec<GeoCoordinate>>),
    Polygon(Vec<Vec<GeoCoordinate>>),
    MultiPolygon(Vec<Vec<Vec<GeoCoordinate>>>),
}

/// A borrowed ring plus whether it closes back on itself.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoRing<'a> {
    pub coordinates: &'a [GeoCoordinate],
    pub closed: bool,
}

impl<'a> GeoRing<'a> {
    fn open(coordinates: &'a [GeoCoordinate]) -> Self {
        Self {
            coordinates,
            closed: false,
        }
    }

    fn closed(coordinates: &'a [GeoCoordinate]) -> Self {
        Self {
            coordinates,
            closed: true,
        }
    }
}

impl GeoGeometry {
    /// Rings in document order: lines are open, polygon rings are closed.
    pub fn rings(&self) -> Vec<GeoRing<'_>> {
        match self {
            GeoGeometry::LineString(line) => vec![GeoRing::open(line)],
            GeoGeometry::MultiLineString(lines) => lines.iter().map(|l| GeoRing::open(l)).collect(),
            GeoGeometry::Polygon(rings) => rings.iter().map(|r| GeoRing::closed(r)).collect(),
            GeoGeometry::MultiPolygon(polys) => polys
                .iter()
                .flatten()
                .map(|r| GeoRing::closed(r))
                .collect(),
        }
    }

    pub fn ring_count(&self) -> usize {
        match self {
            GeoGeometry::LineString(_) => 1,
            GeoGeometry::MultiLineString(lines) => lines.len(),
            GeoGeometry::Polygon(rings) => rings.len(),
            GeoGeometry::MultiPolygon(polys) => polys.iter().map(Vec::len).sum(),
        }
    }
}
