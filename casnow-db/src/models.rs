//! Query result structs.
//!
//! All structs derive `Serialize` so they can be handed to D3.js as JSON.

use casnow_data::aggregate::Threshold;
use casnow_data::Variable;
use serde::Serialize;

/// Latest status of one basin or region.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BasinStatus {
    pub basin_id: String,
    /// `subbasin` or `region`
    pub level: String,
    pub date: String,
    pub current_swe: Option<f64>,
    pub current_hs: Option<f64>,
    pub q5_swe: Option<f64>,
    pub q5_hs: Option<f64>,
    pub climate_swe: Option<f64>,
    pub climate_hs: Option<f64>,
    pub q95_swe: Option<f64>,
    pub q95_hs: Option<f64>,
    pub swe_threshold: String,
    pub hs_threshold: String,
}

impl BasinStatus {
    /// Threshold for `variable`. Runoff is never classified.
    pub fn threshold(&self, variable: Variable) -> Option<Threshold> {
        let raw = match variable {
            Variable::Swe => &self.swe_threshold,
            Variable::Hs => &self.hs_threshold,
            Variable::Rof => return None,
        };
        raw.parse().ok()
    }
}

/// Number of basins at one threshold.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ThresholdCount {
    pub threshold: String,
    pub count: i64,
}
