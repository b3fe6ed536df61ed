//! Dashboard settings.

use casnow_basins::store::SIMPLIFY_TOLERANCE_DEG;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Base URL or directory of the per-basin series files.
    pub data_url: String,
    /// Index into the area-sorted basin list selected when switching to
    /// sub-basin view.
    pub default_subbasin_index: usize,
    pub simplify_tolerance_deg: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_url: "./data".to_string(),
            default_subbasin_index: 0,
            simplify_tolerance_deg: SIMPLIFY_TOLERANCE_DEG,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: DashboardConfig =
            serde_json::from_str(r#"{"data_url": "https://example.org/mcass"}"#).unwrap();
        assert_eq!(config.data_url, "https://example.org/mcass");
        assert_eq!(config.default_subbasin_index, 0);
        assert_eq!(config.simplify_tolerance_deg, 0.005);
    }
}
