//! SQL schema for the in-memory status database.

/// Returns the full SQL schema as a single batch string.
///
/// `basin_status` holds one row per basin or region id and level, mirroring
/// the merged CSV columns. Thresholds are stored as `low`/`normal`/`high`.
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS basin_status (
        basin_id TEXT NOT NULL,
        level TEXT NOT NULL,
        date TEXT NOT NULL,
        current_swe REAL,
        current_hs REAL,
        q5_swe REAL,
        q5_hs REAL,
        climate_swe REAL,
        climate_hs REAL,
        q95_swe REAL,
        q95_hs REAL,
        swe_threshold TEXT NOT NULL,
        hs_threshold TEXT NOT NULL,
        PRIMARY KEY (basin_id, level)
    );
    CREATE INDEX IF NOT EXISTS idx_status_level ON basin_status(level);
    "#
}
