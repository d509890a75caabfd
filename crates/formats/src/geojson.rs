use foundation::geo::{GeoCoordinate, GeoGeometry};
use foundation::math::{BoundaryGeometry, project_boundary};
use serde_json::Value;

/// One outline-bearing feature of a boundary document.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub geometry: GeoGeometry,
}

/// Outline features parsed from a GeoJSON document, in document order.
///
/// Accepts a `FeatureCollection`, a single `Feature` or a bare geometry.
/// Features with a `null` geometry and point geometries carry no outline and
/// are dropped; `GeometryCollection`s are flattened into their members.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundaryDocument {
    pub features: Vec<BoundaryFeature>,
}

#[derive(Debug)]
pub enum GeoJsonError {
    Json(serde_json::Error),
    NotGeoJson { found: Option<String> },
    InvalidFeature { index: usize, reason: String },
}

impl std::fmt::Display for GeoJsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoJsonError::Json(e) => write!(f, "JSON parse error: {e}"),
            GeoJsonError::NotGeoJson { found: Some(ty) } => {
                write!(f, "unexpected GeoJSON type: {ty}")
            }
            GeoJsonError::NotGeoJson { found: None } => {
                write!(f, "expected a GeoJSON object with a type")
            }
            GeoJsonError::InvalidFeature { index, reason } => {
                write!(f, "invalid feature at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for GeoJsonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeoJsonError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl BoundaryDocument {
    pub fn from_geojson_str(payload: &str) -> Result<Self, GeoJsonError> {
        let value: Value = serde_json::from_str(payload).map_err(GeoJsonError::Json)?;
        Self::from_geojson_value(&value)
    }

    pub fn from_geojson_value(value: &Value) -> Result<Self, GeoJsonError> {
        let obj = value
            .as_object()
            .ok_or(GeoJsonError::NotGeoJson { found: None })?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(GeoJsonError::NotGeoJson { found: None })?;

        let mut features = Vec::new();
        match ty {
            "FeatureCollection" => {
                let items = obj
                    .get("features")
                    .and_then(|v| v.as_array())
                    .ok_or_else(|| GeoJsonError::NotGeoJson {
                        found: Some("FeatureCollection without features".to_string()),
                    })?;
                for (index, item) in items.iter().enumerate() {
                    let parsed = parse_feature(item)
                        .map_err(|reason| GeoJsonError::InvalidFeature { index, reason })?;
                    features.extend(parsed);
                }
            }
            "Feature" => {
                let parsed = parse_feature(value)
                    .map_err(|reason| GeoJsonError::InvalidFeature { index: 0, reason })?;
                features.extend(parsed);
            }
            _ => {
                let mut geometries = Vec::new();
                collect_geometries(value, &mut geometries)
                    .map_err(|reason| GeoJsonError::InvalidFeature { index: 0, reason })?;
                features.extend(
                    geometries
                        .into_iter()
                        .map(|geometry| BoundaryFeature { geometry }),
                );
            }
        }

        Ok(Self { features })
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Total number of rings across all features.
    pub fn ring_count(&self) -> usize {
        self.features.iter().map(|f| f.geometry.ring_count()).sum()
    }

    /// Projects every feature onto a sphere of `radius`, one geometry per feature.
    pub fn project(&self, radius: f64) -> Vec<BoundaryGeometry> {
        self.features
            .iter()
            .map(|f| project_boundary(&f.geometry, radius))
            .collect()
    }
}

/// A feature may expand to several outline features (geometry collections)
/// or to none (null or point geometry).
fn parse_feature(value: &Value) -> Result<Vec<BoundaryFeature>, String> {
    let obj = value
        .as_object()
        .ok_or("feature must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("feature missing type".to_string())?;
    if ty != "Feature" {
        return Err(format!("unexpected feature type: {ty}"));
    }

    let mut geometries = Vec::new();
    match obj.get("geometry") {
        None | Some(Value::Null) => {}
        Some(geometry) => collect_geometries(geometry, &mut geometries)?,
    }

    Ok(geometries
        .into_iter()
        .map(|geometry| BoundaryFeature { geometry })
        .collect())
}

fn collect_geometries(value: &Value, out: &mut Vec<GeoGeometry>) -> Result<(), String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;

    if ty == "GeometryCollection" {
        let members = obj
            .get("geometries")
            .and_then(|v| v.as_array())
            .ok_or("GeometryCollection missing geometries".to_string())?;
        for member in members {
            collect_geometries(member, out)?;
        }
        return Ok(());
    }

    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;

    match ty {
        "Point" | "MultiPoint" => {}
        "LineString" => out.push(GeoGeometry::LineString(parse_positions(coords)?)),
        "MultiLineString" => out.push(GeoGeometry::MultiLineString(parse_rings(coords)?)),
        "Polygon" => out.push(GeoGeometry::Polygon(parse_rings(coords)?)),
        "MultiPolygon" => out.push(GeoGeometry::MultiPolygon(parse_polygons(coords)?)),
        other => return Err(format!("unsupported geometry type: {other}")),
    }
    Ok(())
}

/// GeoJSON positions are `[lon, lat]`, optionally followed by an altitude.
fn parse_position(coords: &Value) -> Result<GeoCoordinate, String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]".to_string());
    }
    let lon = arr[0].as_f64().ok_or("lon must be a number".to_string())?;
    let lat = arr[1].as_f64().ok_or("lat must be a number".to_string())?;
    Ok(GeoCoordinate::new(lat, lon))
}

fn parse_positions(coords: &Value) -> Result<Vec<GeoCoordinate>, String> {
    let arr = coords
        .as_array()
        .ok_or("coordinates must be an array".to_string())?;
    arr.iter().map(parse_position).collect()
}

fn parse_rings(coords: &Value) -> Result<Vec<Vec<GeoCoordinate>>, String> {
    let arr = coords
        .as_array()
        .ok_or("coordinates must be an array of rings".to_string())?;
    arr.iter().map(parse_positions).collect()
}

fn parse_polygons(coords: &Value) -> Result<Vec<Vec<Vec<GeoCoordinate>>>, String> {
    let arr = coords
        .as_array()
        .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
    arr.iter().map(parse_rings).collect()
}
