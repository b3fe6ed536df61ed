//! Map-click hit-testing.
//!
//! A click arrives in Web Mercator meters. The locator reprojects it into
//! UTM zone 42N, tests strict containment against every basin outline
//! (also held in UTM 42N) and resolves overlaps by taking the last match in
//! store order. Because the store is sorted by descending area, the last
//! match is the smallest basin, which is also the one drawn on top.

use crate::projection::{UtmProjection, CENTRAL_ASIA_UTM_ZONE};
use crate::store::GeometryStore;
use casnow_utils::error::{user_message, Result};
use geo::{Contains, Point, Polygon};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Map granularity: whole regions or individual sub-basins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    Regional,
    SubBasin,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Regional => "Regional",
            ViewMode::SubBasin => "Sub-basin",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regional" | "region" => Ok(ViewMode::Regional),
            "sub-basin" | "subbasin" | "basin" => Ok(ViewMode::SubBasin),
            other => Err(format!("unknown view mode `{}`", other)),
        }
    }
}

/// What a click or picker choice resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Identifier {
    /// Region id, e.g. "SYR_DARYA"
    Region(String),
    /// Basin code, e.g. "16152"
    Basin(String),
}

impl Identifier {
    /// The id used to name this basin's or region's data files.
    pub fn id(&self) -> &str {
        match self {
            Identifier::Region(id) | Identifier::Basin(id) => id,
        }
    }

    pub fn mode(&self) -> ViewMode {
        match self {
            Identifier::Region(_) => ViewMode::Regional,
            Identifier::Basin(_) => ViewMode::SubBasin,
        }
    }
}

/// Result of a click once failures have been turned into messages.
#[derive(Debug, Clone, PartialEq)]
pub enum LocateOutcome {
    Found(Identifier),
    /// The click hit no polygon
    Nothing,
    /// Reprojection failed; carries a user-facing diagnostic
    Failed(String),
}

struct ProjectedBasin {
    code: String,
    region: String,
    polygon: Polygon<f64>,
}

/// Resolves map clicks against a reprojected copy of the basin outlines.
pub struct SpatialLocator {
    projection: UtmProjection,
    basins: Vec<ProjectedBasin>,
}

impl SpatialLocator {
    /// Reproject every basin of `store` into UTM zone 42N.
    pub fn new(store: &GeometryStore) -> Result<Self> {
        let projection = UtmProjection::utm_north(CENTRAL_ASIA_UTM_ZONE)?;
        let basins = store
            .basins()
            .iter()
            .map(|basin| {
                Ok(ProjectedBasin {
                    code: basin.code.clone(),
                    region: basin.region.clone(),
                    polygon: projection.project_polygon(&basin.polygon)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { projection, basins })
    }

    /// Store index of the top-most basin containing the click, if any.
    pub fn locate_index(&self, x: f64, y: f64) -> Result<Option<usize>> {
        let click = Point::from(self.projection.from_web_mercator(x, y)?);
        Ok(self
            .basins
            .iter()
            .rposition(|basin| basin.polygon.contains(&click)))
    }

    /// Resolve a Web Mercator click to a basin code or region id.
    ///
    /// `Ok(None)` means the click landed outside every basin.
    pub fn locate(&self, x: f64, y: f64, mode: ViewMode) -> Result<Option<Identifier>> {
        Ok(self.locate_index(x, y)?.map(|index| {
            let basin = &self.basins[index];
            match mode {
                ViewMode::Regional => Identifier::Region(basin.region.clone()),
                ViewMode::SubBasin => Identifier::Basin(basin.code.clone()),
            }
        }))
    }

    /// Like [`locate`](Self::locate) but never fails: errors become a
    /// diagnostic string for the UI.
    pub fn locate_or_message(&self, x: f64, y: f64, mode: ViewMode) -> LocateOutcome {
        match self.locate(x, y, mode) {
            Ok(Some(identifier)) => LocateOutcome::Found(identifier),
            Ok(None) => LocateOutcome::Nothing,
            Err(e) => {
                log::warn!("Click at ({}, {}) could not be located: {}", x, y, e);
                LocateOutcome::Failed(user_message("locate", &e))
            }
        }
    }
}
