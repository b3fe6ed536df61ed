use casnow_utils::error::{DashboardError, Result};
use geo::{Area, Coord, LineString, Polygon, Simplify};
use geojson::{Feature, JsonValue, Value};
use serde::Serialize;

/// Attribute column holding the regional grouping key.
pub const REGION_COLUMN: &str = "REGION";
/// Attribute column holding the basin name.
pub const BASIN_COLUMN: &str = "BASIN";
/// Attribute column holding the unique basin (gauge) code.
pub const CODE_COLUMN: &str = "CODE";
/// Attribute column holding the river name of the basin outlet gauge.
pub const RIVER_COLUMN: &str = "gauges_RIVER";
/// Attribute column holding the basin area in square kilometers.
pub const AREA_COLUMN: &str = "area_km2";

/// A river basin outline with its identifying attributes.
///
/// The polygon is a single ring set in WGS84 lon/lat degrees. Multi-part
/// source geometries are reduced to their largest part on load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Basin {
    /// Gauge code, unique across the basin set (e.g. "16152")
    pub code: String,
    /// Regional grouping key (e.g. "SYR_DARYA")
    pub region: String,
    /// Basin name as given by the source dataset
    pub basin_name: String,
    /// River at the outlet gauge, if known
    pub river_name: Option<String>,
    /// Basin area in km²
    pub area_km2: f64,
    /// Simplified outline, lon/lat degrees
    #[serde(skip)]
    pub polygon: Polygon<f64>,
    /// Picker label, "{code} - {river_name}"
    pub label: String,
}

impl Basin {
    /// Build the picker label for a basin.
    pub fn make_label(code: &str, river_name: Option<&str>) -> String {
        match river_name {
            Some(river) => format!("{} - {}", code, river),
            None => code.to_string(),
        }
    }

    /// Convert one GeoJSON feature into a normalized Basin.
    ///
    /// Identifying attributes are coerced to strings so that numeric-looking
    /// gauge codes survive untouched. Multi-part geometries keep only their
    /// largest part (first one wins on equal area) and the outline is
    /// simplified with `tolerance` degrees.
    pub fn from_feature(feature: &Feature, tolerance: f64) -> Result<Basin> {
        let code = required_string(feature, CODE_COLUMN)?;
        let region = required_string(feature, REGION_COLUMN)?;
        let basin_name = property_string(feature, BASIN_COLUMN).unwrap_or_default();
        let river_name = property_string(feature, RIVER_COLUMN);
        let area_km2 = property_f64(feature, AREA_COLUMN).ok_or_else(|| {
            DashboardError::data_load(
                "basin geometry",
                format!("basin {} has no numeric `{}`", code, AREA_COLUMN),
            )
        })?;

        let geometry = feature.geometry.as_ref().ok_or_else(|| {
            DashboardError::data_load("basin geometry", format!("basin {} has no geometry", code))
        })?;
        let polygon = match &geometry.value {
            Value::Polygon(rings) => polygon_from_rings(rings, &code)?,
            Value::MultiPolygon(parts) => {
                let polygons = parts
                    .iter()
                    .map(|rings| polygon_from_rings(rings, &code))
                    .collect::<Result<Vec<_>>>()?;
                largest_part(polygons).ok_or_else(|| {
                    DashboardError::data_load(
                        "basin geometry",
                        format!("basin {} has an empty MultiPolygon", code),
                    )
                })?
            }
            _ => {
                return Err(DashboardError::data_load(
                    "basin geometry",
                    format!("basin {} is neither a Polygon nor a MultiPolygon", code),
                ))
            }
        };

        let label = Basin::make_label(&code, river_name.as_deref());
        Ok(Basin {
            code,
            region,
            basin_name,
            river_name,
            area_km2,
            polygon: simplify_polygon(&polygon, tolerance),
            label,
        })
    }
}

/// Pick the part with the largest planar area. Ties keep the earliest part.
pub fn largest_part(polygons: Vec<Polygon<f64>>) -> Option<Polygon<f64>> {
    let mut best: Option<(f64, Polygon<f64>)> = None;
    for polygon in polygons {
        let area = polygon.unsigned_area();
        match &best {
            Some((best_area, _)) if area <= *best_area => {}
            _ => best = Some((area, polygon)),
        }
    }
    best.map(|(_, polygon)| polygon)
}

/// Ramer–Douglas–Peucker simplification that never collapses a ring.
///
/// An exterior ring reduced below four coordinates is no longer a polygon;
/// in that case the input outline is kept as is.
pub fn simplify_polygon(polygon: &Polygon<f64>, tolerance: f64) -> Polygon<f64> {
    if tolerance <= 0.0 {
        return polygon.clone();
    }
    let simplified = polygon.simplify(&tolerance);
    if simplified.exterior().0.len() < 4 {
        polygon.clone()
    } else {
        simplified
    }
}

fn polygon_from_rings(rings: &[Vec<Vec<f64>>], code: &str) -> Result<Polygon<f64>> {
    let mut line_strings = rings
        .iter()
        .map(|ring| ring_to_line_string(ring, code))
        .collect::<Result<Vec<_>>>()?;
    if line_strings.is_empty() {
        return Err(DashboardError::data_load(
            "basin geometry",
            format!("basin {} has a polygon without rings", code),
        ));
    }
    let exterior = line_strings.remove(0);
    Ok(Polygon::new(exterior, line_strings))
}

fn ring_to_line_string(ring: &[Vec<f64>], code: &str) -> Result<LineString<f64>> {
    let coords = ring
        .iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => Err(DashboardError::data_load(
                "basin geometry",
                format!("basin {} has a position with fewer than two ordinates", code),
            )),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(LineString::from(coords))
}

/// Read a property as a string regardless of its JSON type.
///
/// `null` and absent properties yield `None`.
pub fn property_string(feature: &Feature, key: &str) -> Option<String> {
    match feature.property(key)? {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    }
}

fn required_string(feature: &Feature, key: &str) -> Result<String> {
    property_string(feature, key)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            DashboardError::data_load("basin geometry", format!("feature without `{}`", key))
        })
}

fn property_f64(feature: &Feature, key: &str) -> Option<f64> {
    match feature.property(key)? {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
