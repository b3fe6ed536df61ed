//! Canonical basin collection loaded once at startup.
//!
//! The store is an immutable snapshot: basins are normalized, labeled and
//! sorted by area (largest first) on load. Selection highlighting is never
//! written back here; views recombine the snapshot with the active selection
//! at render time.

use crate::basin::Basin;
use crate::region::{group_regions, Region};
use casnow_utils::error::{DashboardError, Result};
use geojson::GeoJson;
use std::collections::HashSet;
use std::path::Path;

/// Outline simplification tolerance in degrees.
pub const SIMPLIFY_TOLERANCE_DEG: f64 = 0.005;

#[derive(Debug, Clone, PartialEq)]
pub struct GeometryStore {
    basins: Vec<Basin>,
    regions: Vec<Region>,
}

impl GeometryStore {
    /// Load a GeoJSON basin dataset from disk with the default tolerance.
    ///
    /// Any failure is a `DataLoad` error; callers treat it as fatal.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| DashboardError::data_load(path.display().to_string(), e))?;
        Self::from_geojson_str(&text, SIMPLIFY_TOLERANCE_DEG).map_err(|e| match e {
            DashboardError::DataLoad { reason, .. } => {
                DashboardError::data_load(path.display().to_string(), reason)
            }
            other => other,
        })
    }

    /// Parse a GeoJSON FeatureCollection of basin polygons.
    pub fn from_geojson_str(text: &str, tolerance: f64) -> Result<Self> {
        let geojson = text
            .parse::<GeoJson>()
            .map_err(|e| DashboardError::data_load("basin geometry", e))?;
        let collection = match geojson {
            GeoJson::FeatureCollection(fc) => fc,
            _ => {
                return Err(DashboardError::data_load(
                    "basin geometry",
                    "expected a FeatureCollection",
                ))
            }
        };
        let basins = collection
            .features
            .iter()
            .map(|feature| Basin::from_feature(feature, tolerance))
            .collect::<Result<Vec<_>>>()?;
        let store = Self::from_basins(basins)?;
        log::info!(
            "Loaded {} basins in {} regions",
            store.basins.len(),
            store.regions.len()
        );
        Ok(store)
    }

    /// Build a store from already normalized basins.
    ///
    /// Basins are stably sorted by descending area so that small basins are
    /// drawn last, on top of the large ones they overlap.
    pub fn from_basins(mut basins: Vec<Basin>) -> Result<Self> {
        let mut seen = HashSet::new();
        for basin in &basins {
            if !seen.insert(basin.code.as_str()) {
                return Err(DashboardError::data_load(
                    "basin geometry",
                    format!("duplicate basin code {}", basin.code),
                ));
            }
        }
        basins.sort_by(|a, b| b.area_km2.total_cmp(&a.area_km2));
        let regions = group_regions(&basins);
        Ok(Self { basins, regions })
    }

    /// Basins in area-descending order.
    pub fn basins(&self) -> &[Basin] {
        &self.basins
    }

    /// Regions ordered by id.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.basins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.basins.is_empty()
    }

    pub fn basin_by_code(&self, code: &str) -> Option<&Basin> {
        self.basins.iter().find(|b| b.code == code)
    }

    pub fn basin_by_label(&self, label: &str) -> Option<&Basin> {
        self.basins.iter().find(|b| b.label == label)
    }

    pub fn region(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    /// Picker options in sub-basin mode.
    pub fn labels(&self) -> Vec<String> {
        self.basins.iter().map(|b| b.label.clone()).collect()
    }

    /// Picker options in regional mode.
    pub fn region_ids(&self) -> Vec<String> {
        self.regions.iter().map(|r| r.id.clone()).collect()
    }

    /// River name of a basin; `None` for unknown codes or unnamed rivers.
    pub fn river_name(&self, code: &str) -> Option<&str> {
        self.basin_by_code(code)?.river_name.as_deref()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const BASINS_GEOJSON: &str = r#"{
      "type": "FeatureCollection",
      "features": [
        {"type":"Feature","properties":{"REGION":"SYR_DARYA","BASIN":"Naryn","CODE":"16100","gauges_RIVER":"Naryn","area_km2":5000},
         "geometry":{"type":"Polygon","coordinates":[[[72,41],[76,41],[76,43],[72,43],[72,41]]]}},
        {"type":"Feature","properties":{"REGION":"SYR_DARYA","BASIN":"Naryn","CODE":16152,"gauges_RIVER":"Kokemeren","area_km2":800},
         "geometry":{"type":"Polygon","coordinates":[[[73,41.5],[74,41.5],[74,42.5],[73,42.5],[73,41.5]]]}},
        {"type":"Feature","properties":{"REGION":"AMU_DARYA","BASIN":"Vakhsh","CODE":"17050","gauges_RIVER":"Vakhsh","area_km2":3000},
         "geometry":{"type":"Polygon","coordinates":[[[69,37],[71,37],[71,39],[69,39],[69,37]]]}}
      ]
    }"#;

    #[test]
    fn loads_and_sorts_by_area_descending() {
        let store = GeometryStore::from_geojson_str(BASINS_GEOJSON, SIMPLIFY_TOLERANCE_DEG).unwrap();
        let codes: Vec<&str> = store.basins().iter().map(|b| b.code.as_str()).collect();
        assert_eq!(codes, vec!["16100", "17050", "16152"]);
        assert_eq!(store.region_ids(), vec!["AMU_DARYA", "SYR_DARYA"]);
    }

    #[test]
    fn loading_twice_is_deterministic() {
        let first = GeometryStore::from_geojson_str(BASINS_GEOJSON, SIMPLIFY_TOLERANCE_DEG).unwrap();
        let second = GeometryStore::from_geojson_str(BASINS_GEOJSON, SIMPLIFY_TOLERANCE_DEG).unwrap();
        assert_eq!(first.labels(), second.labels());
        assert_eq!(first, second);
        // Re-sorting an already sorted set changes nothing
        let resorted = GeometryStore::from_basins(first.basins().to_vec()).unwrap();
        assert_eq!(resorted.labels(), first.labels());
    }

    #[test]
    fn lookups_by_code_and_label() {
        let store = GeometryStore::from_geojson_str(BASINS_GEOJSON, SIMPLIFY_TOLERANCE_DEG).unwrap();
        assert_eq!(store.river_name("16152"), Some("Kokemeren"));
        assert_eq!(store.basin_by_label("17050 - Vakhsh").unwrap().code, "17050");
        assert!(store.basin_by_code("99999").is_none());
        assert_eq!(store.region("SYR_DARYA").unwrap().basin_codes.len(), 2);
    }

    #[test]
    fn duplicate_codes_are_rejected() {
        let dup = BASINS_GEOJSON.replace("\"CODE\":\"17050\"", "\"CODE\":\"16100\"");
        let err = GeometryStore::from_geojson_str(&dup, SIMPLIFY_TOLERANCE_DEG).unwrap_err();
        assert!(err.to_string().contains("duplicate basin code 16100"));
    }

    #[test]
    fn malformed_input_is_a_load_error() {
        assert!(GeometryStore::from_geojson_str("not json", SIMPLIFY_TOLERANCE_DEG)
            .unwrap_err()
            .is_data_load());
        let point = r#"{"type":"Point","coordinates":[1,2]}"#;
        assert!(GeometryStore::from_geojson_str(point, SIMPLIFY_TOLERANCE_DEG).is_err());
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = GeometryStore::load("/definitely/not/here/basins.geojson").unwrap_err();
        assert!(err.is_data_load());
        assert!(err.to_string().contains("/definitely/not/here/basins.geojson"));
    }
}
