//! Basin geometry for the Central Asia snow dashboard.
//!
//! - `basin` / `region`: the Basin data model and its derived Region grouping
//! - `store`: loads and normalizes basin polygons from GeoJSON
//! - `projection`: Web Mercator and UTM zone 42N transforms
//! - `locator`: maps a map click onto a basin or region

pub mod basin;
pub mod locator;
pub mod projection;
pub mod region;
pub mod store;

pub use basin::Basin;
pub use locator::{Identifier, LocateOutcome, SpatialLocator, ViewMode};
pub use region::{Region, RegionName};
pub use store::GeometryStore;
