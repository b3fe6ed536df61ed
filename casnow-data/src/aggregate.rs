//! Latest-status summary over a directory of series files.
//!
//! For every basin (or region) the most recent current row is compared with
//! the climate band of the same day and tagged `low`, `normal` or `high`.
//! The result is written as one CSV per level, which the dashboard embeds to
//! color its map.

use crate::loader::{parse_climate, parse_current, SeriesKind};
use crate::series::{ClimateRow, CurrentRow};
use casnow_utils::dates::format_date;
use casnow_utils::error::{DashboardError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub const SUBBASIN_OUTPUT: &str = "subbasins_merged_data.csv";
pub const REGION_OUTPUT: &str = "regions_merged_data.csv";

/// Header of the merged status files.
pub const AGGREGATE_COLUMNS: [&str; 12] = [
    "date",
    "current_swe",
    "current_hs",
    "basin_id",
    "Q5_SWE",
    "Q5_HS",
    "climate_swe",
    "climate_hs",
    "Q95_SWE",
    "Q95_HS",
    "swe_threshold",
    "hs_threshold",
];

/// Which files an aggregation run covers.
///
/// Sub-basin files are named by numeric gauge code, region files by region
/// id, so a digit anywhere in the file name marks a sub-basin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    SubBasin,
    Region,
}

impl Level {
    pub const ALL: [Level; 2] = [Level::SubBasin, Level::Region];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::SubBasin => "subbasin",
            Level::Region => "region",
        }
    }

    /// Inverse of [`as_str`](Self::as_str).
    pub fn from_name(name: &str) -> Option<Level> {
        Level::ALL.into_iter().find(|level| level.as_str() == name)
    }

    pub fn output_file(&self) -> &'static str {
        match self {
            Level::SubBasin => SUBBASIN_OUTPUT,
            Level::Region => REGION_OUTPUT,
        }
    }

    fn accepts(&self, file_name: &str) -> bool {
        let has_digit = file_name.chars().any(|c| c.is_ascii_digit());
        match self {
            Level::SubBasin => has_digit,
            Level::Region => !has_digit,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a value relative to its Q5..Q95 climate band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Threshold {
    Low,
    Normal,
    High,
}

impl Threshold {
    pub fn as_str(&self) -> &'static str {
        match self {
            Threshold::Low => "low",
            Threshold::Normal => "normal",
            Threshold::High => "high",
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Threshold {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "low" => Ok(Threshold::Low),
            "normal" => Ok(Threshold::Normal),
            "high" => Ok(Threshold::High),
            other => Err(format!("unknown threshold `{}`", other)),
        }
    }
}

/// Classify `value` against the band. Missing inputs count as normal.
pub fn classify(value: Option<f64>, q5: Option<f64>, q95: Option<f64>) -> Threshold {
    match (value, q5, q95) {
        (Some(v), _, Some(hi)) if v > hi => Threshold::High,
        (Some(v), Some(lo), _) if v < lo => Threshold::Low,
        _ => Threshold::Normal,
    }
}

/// One line of a merged status file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub date: String,
    pub current_swe: Option<f64>,
    pub current_hs: Option<f64>,
    pub basin_id: String,
    #[serde(rename = "Q5_SWE")]
    pub q5_swe: Option<f64>,
    #[serde(rename = "Q5_HS")]
    pub q5_hs: Option<f64>,
    pub climate_swe: Option<f64>,
    pub climate_hs: Option<f64>,
    #[serde(rename = "Q95_SWE")]
    pub q95_swe: Option<f64>,
    #[serde(rename = "Q95_HS")]
    pub q95_hs: Option<f64>,
    pub swe_threshold: Threshold,
    pub hs_threshold: Threshold,
}

impl AggregateRow {
    fn merge(basin_id: &str, current: &CurrentRow, climate: &ClimateRow) -> Self {
        Self {
            date: format_date(&current.date),
            current_swe: current.swe,
            current_hs: current.hs,
            basin_id: basin_id.to_string(),
            q5_swe: climate.swe.q5,
            q5_hs: climate.hs.q5,
            climate_swe: climate.swe.q50,
            climate_hs: climate.hs.q50,
            q95_swe: climate.swe.q95,
            q95_hs: climate.hs.q95,
            swe_threshold: classify(current.swe, climate.swe.q5, climate.swe.q95),
            hs_threshold: classify(current.hs, climate.hs.q5, climate.hs.q95),
        }
    }
}

/// Basin id encoded in a series file name: `16152_current.txt` -> `16152`,
/// `SYR_DARYA_climate.txt` -> `SYR_DARYA`.
pub fn basin_id_from_path(path: &Path, kind: SeriesKind) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let suffix = format!("_{}.txt", kind.as_str());
    name.strip_suffix(suffix.as_str())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Series files of one kind and level in `dir`, sorted by file name.
pub fn list_series_files(dir: &Path, kind: SeriesKind, level: Level) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| DashboardError::data_load(dir.display().to_string(), e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if basin_id_from_path(&path, kind).is_some() && level.accepts(name) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| DashboardError::data_load(path.display().to_string(), e))
}

/// Merge the latest current value of every basin with its climate band.
///
/// The reference date is the last date of the first current file in name
/// order. Basins whose latest row falls on another date, or that have no
/// climate row for the reference date, are left out.
pub fn aggregate_dir(dir: &Path, level: Level) -> Result<Vec<AggregateRow>> {
    let current_files = list_series_files(dir, SeriesKind::Current, level)?;

    let mut latest: Vec<(String, CurrentRow)> = Vec::new();
    for path in &current_files {
        let Some(id) = basin_id_from_path(path, SeriesKind::Current) else {
            continue;
        };
        let rows = parse_current(&read_file(path)?, &path.display().to_string())?;
        match rows.into_iter().last() {
            Some(row) => latest.push((id, row)),
            None => log::warn!("{} has no rows, skipping", path.display()),
        }
    }

    let Some(reference_date) = latest.first().map(|(_, row)| row.date) else {
        log::warn!("No {} current files in {}", level, dir.display());
        return Ok(Vec::new());
    };
    log::info!(
        "Aggregating {} {} files for {}",
        latest.len(),
        level,
        format_date(&reference_date)
    );

    let mut merged = Vec::new();
    for (id, current) in &latest {
        if current.date != reference_date {
            log::warn!(
                "{} ends on {}, not {}; skipping",
                id,
                format_date(&current.date),
                format_date(&reference_date)
            );
            continue;
        }
        let climate_path = dir.join(SeriesKind::Climate.file_name(id));
        if !climate_path.exists() {
            log::warn!("No climate file for {}", id);
            continue;
        }
        let climate = parse_climate(&read_file(&climate_path)?, &climate_path.display().to_string())?;
        merged.extend(
            climate_on(&climate, reference_date).map(|row| AggregateRow::merge(id, current, row)),
        );
    }
    Ok(merged)
}

fn climate_on(rows: &[ClimateRow], date: NaiveDate) -> impl Iterator<Item = &ClimateRow> {
    rows.iter().filter(move |row| row.date == date)
}

/// Write rows as CSV with the merged-status header.
pub fn write_aggregate_csv(path: &Path, rows: &[AggregateRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    if rows.is_empty() {
        // serialize() only emits the header alongside the first row
        wtr.write_record(AGGREGATE_COLUMNS)?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    log::info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Read a merged-status CSV back into rows.
pub fn read_aggregate_csv(text: &str) -> Result<Vec<AggregateRow>> {
    let mut rdr = csv::Reader::from_reader(text.as_bytes());
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLIMATE: &str = "date\tQ5_SWE\tQ50_SWE\tQ95_SWE\tQ5_HS\tQ50_HS\tQ95_HS\n\
2024-03-01\t10.0\t50.0\t90.0\t0.1\t0.5\t0.9\n\
2024-03-02\t10.0\t50.0\t90.0\t0.1\t0.5\t0.9\n";

    fn current(swe: f64, hs: f64) -> String {
        format!(
            "date\tFC\tQ50_SWE\tQ50_HS\n2024-03-01\tFalse\t1.0\t0.01\n2024-03-02\tFalse\t{}\t{}\n",
            swe, hs
        )
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("casnow-aggregate-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write(dir: &Path, name: &str, text: &str) {
        std::fs::write(dir.join(name), text).unwrap();
    }

    #[test]
    fn classification_against_band() {
        assert_eq!(classify(Some(95.0), Some(10.0), Some(90.0)), Threshold::High);
        assert_eq!(classify(Some(5.0), Some(10.0), Some(90.0)), Threshold::Low);
        assert_eq!(classify(Some(90.0), Some(10.0), Some(90.0)), Threshold::Normal);
        assert_eq!(classify(Some(10.0), Some(10.0), Some(90.0)), Threshold::Normal);
        assert_eq!(classify(None, Some(10.0), Some(90.0)), Threshold::Normal);
    }

    #[test]
    fn basin_id_keeps_underscores() {
        let id = basin_id_from_path(Path::new("/d/SYR_DARYA_current.txt"), SeriesKind::Current);
        assert_eq!(id.as_deref(), Some("SYR_DARYA"));
        let id = basin_id_from_path(Path::new("/d/16152_climate.txt"), SeriesKind::Climate);
        assert_eq!(id.as_deref(), Some("16152"));
        assert!(basin_id_from_path(Path::new("/d/16152_climate.txt"), SeriesKind::Current).is_none());
    }

    #[test]
    fn aggregates_each_level_separately() {
        let dir = temp_dir("levels");
        write(&dir, "16100_current.txt", &current(95.0, 0.5));
        write(&dir, "16100_climate.txt", CLIMATE);
        write(&dir, "16152_current.txt", &current(5.0, 0.05));
        write(&dir, "16152_climate.txt", CLIMATE);
        write(&dir, "SYR_DARYA_current.txt", &current(50.0, 1.2));
        write(&dir, "SYR_DARYA_climate.txt", CLIMATE);
        write(&dir, "notes.txt", "ignored");

        let basins = aggregate_dir(&dir, Level::SubBasin).unwrap();
        assert_eq!(basins.len(), 2);
        assert_eq!(basins[0].basin_id, "16100");
        assert_eq!(basins[0].date, "2024-03-02");
        assert_eq!(basins[0].swe_threshold, Threshold::High);
        assert_eq!(basins[0].hs_threshold, Threshold::Normal);
        assert_eq!(basins[1].swe_threshold, Threshold::Low);
        assert_eq!(basins[1].hs_threshold, Threshold::Low);

        let regions = aggregate_dir(&dir, Level::Region).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].basin_id, "SYR_DARYA");
        assert_eq!(regions[0].swe_threshold, Threshold::Normal);
        assert_eq!(regions[0].hs_threshold, Threshold::High);
        assert_eq!(regions[0].climate_swe, Some(50.0));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn basins_without_climate_are_dropped() {
        let dir = temp_dir("noclimate");
        write(&dir, "16100_current.txt", &current(95.0, 0.5));
        write(&dir, "16100_climate.txt", CLIMATE);
        write(&dir, "17050_current.txt", &current(40.0, 0.4));
        let rows = aggregate_dir(&dir, Level::SubBasin).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].basin_id, "16100");
        assert!(aggregate_dir(&dir, Level::Region).unwrap().is_empty());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn written_csv_has_merged_header() {
        let dir = temp_dir("write");
        write(&dir, "16100_current.txt", &current(95.0, 0.5));
        write(&dir, "16100_climate.txt", CLIMATE);
        let rows = aggregate_dir(&dir, Level::SubBasin).unwrap();
        let out = dir.join(Level::SubBasin.output_file());
        write_aggregate_csv(&out, &rows).unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "date,current_swe,current_hs,basin_id,Q5_SWE,Q5_HS,climate_swe,climate_hs,Q95_SWE,Q95_HS,swe_threshold,hs_threshold"
        );
        assert!(text.contains(",high,normal"));
        assert_eq!(read_aggregate_csv(&text).unwrap(), rows);

        let empty = dir.join("empty.csv");
        write_aggregate_csv(&empty, &[]).unwrap();
        let text = std::fs::read_to_string(&empty).unwrap();
        assert_eq!(text.trim_end(), AGGREGATE_COLUMNS.join(","));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
