//! Hit-test a map coordinate against the basin outlines.

use crate::Paths;
use casnow_basins::{GeometryStore, Identifier, SpatialLocator, ViewMode};
use log::info;

/// Resolve a Web Mercator coordinate to a basin code or region id.
pub fn run_locate(
    paths: &Paths,
    x: f64,
    y: f64,
    mode: ViewMode,
) -> anyhow::Result<Option<Identifier>> {
    let store = GeometryStore::load(&paths.geometry)?;
    let locator = SpatialLocator::new(&store)?;
    let found = locator.locate(x, y, mode)?;
    match &found {
        Some(identifier) => info!("({}, {}) is in {} {}", x, y, mode, identifier.id()),
        None => info!("({}, {}) is outside every basin", x, y),
    }
    Ok(found)
}
