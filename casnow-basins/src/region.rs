use crate::basin::Basin;
use serde::Serialize;
use std::collections::BTreeMap;

/// The regional basins the dashboard knows a display name for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RegionName {
    AmuDarya,
    ChuTalas,
    Issykul,
    MurghabHarirud,
    SyrDarya,
}

impl RegionName {
    pub const ALL: [RegionName; 5] = [
        RegionName::AmuDarya,
        RegionName::ChuTalas,
        RegionName::Issykul,
        RegionName::MurghabHarirud,
        RegionName::SyrDarya,
    ];

    /// Region code as used in the geometry dataset and data file names.
    pub fn code(&self) -> &'static str {
        match self {
            RegionName::AmuDarya => "AMU_DARYA",
            RegionName::ChuTalas => "CHU_TALAS",
            RegionName::Issykul => "ISSYKUL",
            RegionName::MurghabHarirud => "MURGHAB_HARIRUD",
            RegionName::SyrDarya => "SYR_DARYA",
        }
    }

    /// Human-readable name for chart titles.
    pub fn display_name(&self) -> &'static str {
        match self {
            RegionName::AmuDarya => "Amu Darya",
            RegionName::ChuTalas => "Chu-Talas",
            RegionName::Issykul => "Issykul",
            RegionName::MurghabHarirud => "Murghab-Harirud",
            RegionName::SyrDarya => "Syr Darya",
        }
    }

    pub fn from_code(code: &str) -> Option<RegionName> {
        RegionName::ALL.into_iter().find(|r| r.code() == code)
    }
}

/// Display name for a region code, falling back to the code itself.
///
/// Unknown codes are a lookup miss: logged, never an error.
pub fn display_name_or_code(code: &str) -> String {
    match RegionName::from_code(code) {
        Some(name) => name.display_name().to_string(),
        None => {
            log::warn!("No display name for region code {}, using the code", code);
            code.to_string()
        }
    }
}

/// A grouping of basins sharing the same `region` key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    pub id: String,
    pub display_name: String,
    /// Member basin codes in basin-store order
    pub basin_codes: Vec<String>,
    pub area_km2: f64,
}

/// Group basins by region, ordered by region id.
pub fn group_regions(basins: &[Basin]) -> Vec<Region> {
    let mut grouped: BTreeMap<&str, Vec<&Basin>> = BTreeMap::new();
    for basin in basins {
        grouped.entry(basin.region.as_str()).or_default().push(basin);
    }
    grouped
        .into_iter()
        .map(|(id, members)| Region {
            id: id.to_string(),
            display_name: RegionName::from_code(id)
                .map(|r| r.display_name().to_string())
                .unwrap_or_else(|| id.to_string()),
            basin_codes: members.iter().map(|b| b.code.clone()).collect(),
            area_km2: members.iter().map(|b| b.area_km2).sum(),
        })
        .collect()
}
