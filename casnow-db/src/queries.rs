//! Typed queries over `basin_status`.

use crate::models::{BasinStatus, ThresholdCount};
use crate::Database;
use casnow_data::aggregate::Level;
use casnow_data::Variable;
use rusqlite::{params, OptionalExtension, Row};

const STATUS_COLUMNS: &str = "basin_id, level, date, current_swe, current_hs, q5_swe, q5_hs,
     climate_swe, climate_hs, q95_swe, q95_hs, swe_threshold, hs_threshold";

fn status_from_row(row: &Row<'_>) -> rusqlite::Result<BasinStatus> {
    Ok(BasinStatus {
        basin_id: row.get(0)?,
        level: row.get(1)?,
        date: row.get(2)?,
        current_swe: row.get(3)?,
        current_hs: row.get(4)?,
        q5_swe: row.get(5)?,
        q5_hs: row.get(6)?,
        climate_swe: row.get(7)?,
        climate_hs: row.get(8)?,
        q95_swe: row.get(9)?,
        q95_hs: row.get(10)?,
        swe_threshold: row.get(11)?,
        hs_threshold: row.get(12)?,
    })
}

impl Database {
    /// Status of one basin code or region id.
    ///
    /// Codes and region ids never collide (codes are numeric), so the level
    /// is not needed to disambiguate.
    pub fn query_basin_status(&self, basin_id: &str) -> anyhow::Result<Option<BasinStatus>> {
        let conn = self.conn.borrow();
        let sql = format!(
            "SELECT {} FROM basin_status WHERE basin_id = ?1 LIMIT 1",
            STATUS_COLUMNS
        );
        let status = conn
            .query_row(&sql, params![basin_id], status_from_row)
            .optional()?;
        Ok(status)
    }

    /// Every status row of a level, ordered by id.
    pub fn query_statuses(&self, level: Level) -> anyhow::Result<Vec<BasinStatus>> {
        let conn = self.conn.borrow();
        let sql = format!(
            "SELECT {} FROM basin_status WHERE level = ?1 ORDER BY basin_id",
            STATUS_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![level.as_str()], status_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        log::info!("query_statuses({}) returned {} records", level, rows.len());
        Ok(rows)
    }

    /// How many basins of a level sit at each threshold for `variable`.
    ///
    /// Runoff has no threshold column and yields an empty list.
    pub fn query_threshold_counts(
        &self,
        variable: Variable,
        level: Level,
    ) -> anyhow::Result<Vec<ThresholdCount>> {
        let column = match variable {
            Variable::Swe => "swe_threshold",
            Variable::Hs => "hs_threshold",
            Variable::Rof => return Ok(Vec::new()),
        };
        let conn = self.conn.borrow();
        let sql = format!(
            "SELECT {col}, COUNT(*) FROM basin_status
             WHERE level = ?1
             GROUP BY {col}
             ORDER BY {col}",
            col = column
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![level.as_str()], |row| {
                Ok(ThresholdCount {
                    threshold: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use crate::tests::sample_db;
    use casnow_data::aggregate::{Level, Threshold};
    use casnow_data::Variable;

    #[test]
    fn basin_status_by_id() {
        let db = sample_db();
        let status = db.query_basin_status("16152").unwrap().unwrap();
        assert_eq!(status.level, "subbasin");
        assert_eq!(status.current_swe, Some(5.0));
        assert_eq!(status.threshold(Variable::Swe), Some(Threshold::Low));
        assert_eq!(status.threshold(Variable::Rof), None);

        let region = db.query_basin_status("SYR_DARYA").unwrap().unwrap();
        assert_eq!(region.level, "region");
        assert_eq!(region.threshold(Variable::Hs), Some(Threshold::High));

        assert!(db.query_basin_status("99999").unwrap().is_none());
    }

    #[test]
    fn missing_values_stay_null() {
        let db = sample_db();
        let status = db.query_basin_status("17050").unwrap().unwrap();
        assert_eq!(status.current_hs, None);
    }

    #[test]
    fn statuses_are_filtered_by_level() {
        let db = sample_db();
        let ids: Vec<String> = db
            .query_statuses(Level::SubBasin)
            .unwrap()
            .into_iter()
            .map(|s| s.basin_id)
            .collect();
        assert_eq!(ids, vec!["16100", "16152", "17050"]);
        assert_eq!(db.query_statuses(Level::Region).unwrap().len(), 2);
    }

    #[test]
    fn threshold_counts() {
        let db = sample_db();
        let counts = db.query_threshold_counts(Variable::Swe, Level::SubBasin).unwrap();
        let pairs: Vec<(String, i64)> = counts.into_iter().map(|c| (c.threshold, c.count)).collect();
        assert_eq!(
            pairs,
            vec![
                ("high".to_string(), 1),
                ("low".to_string(), 1),
                ("normal".to_string(), 1)
            ]
        );
        assert!(db
            .query_threshold_counts(Variable::Rof, Level::Region)
            .unwrap()
            .is_empty());
    }
}
