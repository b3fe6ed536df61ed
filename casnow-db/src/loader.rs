//! Loading merged status CSVs into the database.
//!
//! # CSV Format
//!
//! Header row:
//! `date,current_swe,current_hs,basin_id,Q5_SWE,Q5_HS,climate_swe,climate_hs,Q95_SWE,Q95_HS,swe_threshold,hs_threshold`

use crate::Database;
use casnow_data::aggregate::{AggregateRow, Level};
use rusqlite::params;

impl Database {
    /// Load a merged status CSV for one level.
    ///
    /// Rows already present for the same id and level are replaced. A
    /// header-only CSV loads nothing and is not an error.
    pub fn load_basin_status(&self, csv_data: &str, level: Level) -> anyhow::Result<usize> {
        let conn = self.conn.borrow();
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(csv_data.as_bytes());

        let mut count = 0usize;
        for result in rdr.deserialize() {
            let r: AggregateRow = result?;
            conn.execute(
                "INSERT OR REPLACE INTO basin_status
                 (basin_id, level, date, current_swe, current_hs, q5_swe, q5_hs,
                  climate_swe, climate_hs, q95_swe, q95_hs, swe_threshold, hs_threshold)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    r.basin_id.trim(),
                    level.as_str(),
                    r.date.trim(),
                    r.current_swe,
                    r.current_hs,
                    r.q5_swe,
                    r.q5_hs,
                    r.climate_swe,
                    r.climate_hs,
                    r.q95_swe,
                    r.q95_hs,
                    r.swe_threshold.as_str(),
                    r.hs_threshold.as_str(),
                ],
            )?;
            count += 1;
        }
        log::info!("Loaded {} {} status rows", count, level);
        Ok(count)
    }
}
