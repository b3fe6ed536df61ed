//! In-memory SQLite store of the latest snow status per basin and region.
//!
//! The aggregation job writes one merged CSV per level. The dashboard embeds
//! both with `include_str!`, loads them here at startup and queries the
//! status of whatever is on screen to color the map.
//!
//! # Architecture
//!
//! - `Rc<RefCell<Connection>>` wrapper for interior mutability in single-threaded WASM
//! - In-memory SQLite via `rusqlite`
//! - Typed query methods returning serializable structs
//!
//! # Usage
//!
//! ```rust
//! use casnow_data::aggregate::Level;
//! use casnow_db::Database;
//!
//! let db = Database::new().unwrap();
//! db.load_basin_status(
//!     "date,current_swe,current_hs,basin_id,Q5_SWE,Q5_HS,climate_swe,climate_hs,Q95_SWE,Q95_HS,swe_threshold,hs_threshold\n\
//!      2024-03-02,95.0,0.5,16100,10.0,0.1,50.0,0.5,90.0,0.9,high,normal\n",
//!     Level::SubBasin,
//! ).unwrap();
//! let status = db.query_basin_status("16100").unwrap().unwrap();
//! assert_eq!(status.swe_threshold, "high");
//! ```

pub mod schema;
mod loader;
mod queries;
pub mod models;

use rusqlite::Connection;
use std::cell::RefCell;
use std::rc::Rc;

/// In-memory SQLite database of basin status rows.
///
/// Cheaply cloneable (via `Rc`) for sharing across Dioxus components.
#[derive(Clone)]
pub struct Database {
    conn: Rc<RefCell<Connection>>,
}

impl Database {
    /// Create a new in-memory database with the schema applied.
    pub fn new() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            conn: Rc::new(RefCell::new(conn)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casnow_data::aggregate::Level;

    pub(crate) const SUBBASIN_CSV: &str = "\
date,current_swe,current_hs,basin_id,Q5_SWE,Q5_HS,climate_swe,climate_hs,Q95_SWE,Q95_HS,swe_threshold,hs_threshold
2024-03-02,95.0,0.5,16100,10.0,0.1,50.0,0.5,90.0,0.9,high,normal
2024-03-02,5.0,0.05,16152,10.0,0.1,50.0,0.5,90.0,0.9,low,low
2024-03-02,40.0,,17050,10.0,0.1,50.0,0.5,90.0,0.9,normal,normal
";

    pub(crate) const REGION_CSV: &str = "\
date,current_swe,current_hs,basin_id,Q5_SWE,Q5_HS,climate_swe,climate_hs,Q95_SWE,Q95_HS,swe_threshold,hs_threshold
2024-03-02,50.0,1.2,SYR_DARYA,10.0,0.1,50.0,0.5,90.0,0.9,normal,high
2024-03-02,3.0,0.02,AMU_DARYA,10.0,0.1,50.0,0.5,90.0,0.9,low,low
";

    pub(crate) fn sample_db() -> Database {
        let db = Database::new().unwrap();
        db.load_basin_status(SUBBASIN_CSV, Level::SubBasin).unwrap();
        db.load_basin_status(REGION_CSV, Level::Region).unwrap();
        db
    }

    #[test]
    fn database_creates_successfully() {
        assert!(Database::new().is_ok());
    }

    #[test]
    fn database_is_cloneable() {
        let db = Database::new().unwrap();
        let db2 = db.clone();
        db.load_basin_status(REGION_CSV, Level::Region).unwrap();
        assert_eq!(
            db2.query_statuses(Level::Region).unwrap().len(),
            2,
            "Clone should see same data via shared Rc"
        );
    }

    #[test]
    fn database_starts_empty() {
        let db = Database::new().unwrap();
        assert!(db.query_statuses(Level::SubBasin).unwrap().is_empty());
        assert!(db.query_basin_status("16100").unwrap().is_none());
    }
}
