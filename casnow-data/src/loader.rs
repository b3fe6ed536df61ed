//! Per-basin series files.
//!
//! Every basin or region id has up to three tab-delimited files named
//! `{id}_current.txt`, `{id}_previous.txt` and `{id}_climate.txt`, each
//! with a header row and a `date` column. Where the text comes from is
//! abstracted behind [`SeriesSource`]: a directory on native targets, an
//! in-memory map filled by HTTP fetches in the browser.
//!
//! # File formats
//!
//! - **current / previous**: `date`, `FC` (forecast flag), `Q50_SWE`,
//!   `Q50_HS`, optional `Q50_ROF`
//! - **climate**: `date`, then `Q5_*`, `Q50_*`, `Q95_*` per variable

use crate::series::{ClimateRow, CurrentRow, CurrentSeries, Quantiles, Variable};
use casnow_utils::dates::{parse_date, shift_one_year};
use casnow_utils::error::{DashboardError, Result};
use csv::{ReaderBuilder, StringRecord};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;

/// Which of a basin's series files to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesKind {
    Current,
    Previous,
    Climate,
}

impl SeriesKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesKind::Current => "current",
            SeriesKind::Previous => "previous",
            SeriesKind::Climate => "climate",
        }
    }

    /// File name by convention, e.g. `16152_climate.txt`.
    pub fn file_name(&self, id: &str) -> String {
        format!("{}_{}.txt", id, self.as_str())
    }
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Somewhere series text can be read from.
pub trait SeriesSource {
    fn read(&self, id: &str, kind: SeriesKind) -> Result<String>;

    /// Whether `id`'s files have been requested but not delivered yet.
    fn is_pending(&self, _id: &str) -> bool {
        false
    }
}

/// Reads `{dir}/{id}_{kind}.txt`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, id: &str, kind: SeriesKind) -> PathBuf {
        self.dir.join(kind.file_name(id))
    }
}

impl SeriesSource for DirectorySource {
    fn read(&self, id: &str, kind: SeriesKind) -> Result<String> {
        let path = self.path(id, kind);
        std::fs::read_to_string(&path)
            .map_err(|e| DashboardError::data_load(path.display().to_string(), e))
    }
}

/// Series text held in memory, keyed by file name.
///
/// Ids between [`mark_pending`](Self::mark_pending) and
/// [`finish`](Self::finish) report as pending instead of missing.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, String>,
    pending: HashSet<String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: &str, kind: SeriesKind, text: impl Into<String>) {
        self.files.insert(kind.file_name(id), text.into());
    }

    pub fn with(mut self, id: &str, kind: SeriesKind, text: impl Into<String>) -> Self {
        self.insert(id, kind, text);
        self
    }

    pub fn contains(&self, id: &str, kind: SeriesKind) -> bool {
        self.files.contains_key(&kind.file_name(id))
    }

    pub fn mark_pending(&mut self, id: &str) {
        self.pending.insert(id.to_string());
    }

    /// The fetch for `id` is over, whatever it delivered.
    pub fn finish(&mut self, id: &str) {
        self.pending.remove(id);
    }
}

impl SeriesSource for MemorySource {
    fn read(&self, id: &str, kind: SeriesKind) -> Result<String> {
        let name = kind.file_name(id);
        self.files
            .get(&name)
            .cloned()
            .ok_or_else(|| DashboardError::data_load(name, "file not available"))
    }

    fn is_pending(&self, id: &str) -> bool {
        self.pending.contains(id)
    }
}

/// Loads typed series for a basin or region id.
#[derive(Debug, Clone)]
pub struct TimeSeriesLoader<S> {
    source: S,
}

impl<S: SeriesSource> TimeSeriesLoader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.source.is_pending(id)
    }

    /// Current-year series, split into observed and forecast rows.
    pub fn load_current(&self, id: &str) -> Result<CurrentSeries> {
        let text = self.source.read(id, SeriesKind::Current)?;
        let rows = parse_current(&text, &SeriesKind::Current.file_name(id))?;
        log::info!("Loaded {} current rows for {}", rows.len(), id);
        Ok(CurrentSeries::partition(rows))
    }

    /// Previous-year series with every date moved forward one year so it
    /// overlays the current year's calendar axis.
    pub fn load_previous(&self, id: &str) -> Result<Vec<CurrentRow>> {
        let text = self.source.read(id, SeriesKind::Previous)?;
        let rows = parse_current(&text, &SeriesKind::Previous.file_name(id))?;
        log::info!("Loaded {} previous-year rows for {}", rows.len(), id);
        Ok(shift_rows_one_year(rows))
    }

    pub fn load_climate(&self, id: &str) -> Result<Vec<ClimateRow>> {
        let text = self.source.read(id, SeriesKind::Climate)?;
        let rows = parse_climate(&text, &SeriesKind::Climate.file_name(id))?;
        log::info!("Loaded {} climate rows for {}", rows.len(), id);
        Ok(rows)
    }
}

/// Move every row forward by one calendar year.
pub fn shift_rows_one_year(rows: Vec<CurrentRow>) -> Vec<CurrentRow> {
    rows.into_iter()
        .map(|mut row| {
            row.date = shift_one_year(&row.date);
            row
        })
        .collect()
}

/// Column lookup over a header row.
struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn new(headers: &StringRecord) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();
        Self { index }
    }

    fn get(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    fn require(&self, name: &str, origin: &str) -> Result<usize> {
        self.get(name)
            .ok_or_else(|| DashboardError::data_load(origin, format!("missing column `{}`", name)))
    }
}

fn tab_reader(text: &str) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes())
}

fn field<'r>(record: &'r StringRecord, index: Option<usize>) -> &'r str {
    index.and_then(|i| record.get(i)).unwrap_or("").trim()
}

/// Parse a numeric cell. Blank and NaN-like cells are missing values.
fn parse_value(raw: &str, column: &str, line: usize, origin: &str) -> Result<Option<f64>> {
    if raw.is_empty() || matches!(raw.to_ascii_lowercase().as_str(), "nan" | "na" | "null") {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| DashboardError::data_load(origin, format!("line {}: `{}` in {} is not a number", line, raw, column)))
}

fn parse_flag(raw: &str, line: usize, origin: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "1.0" | "yes" => Ok(true),
        "false" | "0" | "0.0" | "no" | "" => Ok(false),
        other => Err(DashboardError::data_load(
            origin,
            format!("line {}: `{}` is not a forecast flag", line, other),
        )),
    }
}

fn parse_row_date(raw: &str, line: usize, origin: &str) -> Result<chrono::NaiveDate> {
    parse_date(raw).map_err(|e| {
        DashboardError::data_load(origin, format!("line {}: bad date `{}`: {}", line, raw, e))
    })
}

/// Parse a `_current` / `_previous` file. `origin` names the file in errors.
///
/// A file without an `FC` column is treated as fully observed.
pub fn parse_current(text: &str, origin: &str) -> Result<Vec<CurrentRow>> {
    let mut rdr = tab_reader(text);
    let columns = Columns::new(&rdr.headers()?.clone());
    let date_col = columns.require("date", origin)?;
    let fc_col = columns.get("FC");
    let value_cols: Vec<(Variable, Option<usize>)> = Variable::ALL
        .iter()
        .map(|v| (*v, columns.get(&v.column(50))))
        .collect();

    let mut rows = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let line = i + 2;
        let date = parse_row_date(field(&record, Some(date_col)), line, origin)?;
        let forecast = parse_flag(field(&record, fc_col), line, origin)?;
        let mut values = [None; 3];
        for (slot, (variable, col)) in values.iter_mut().zip(&value_cols) {
            *slot = parse_value(field(&record, *col), &variable.column(50), line, origin)?;
        }
        rows.push(CurrentRow {
            date,
            forecast,
            swe: values[0],
            hs: values[1],
            rof: values[2],
        });
    }
    Ok(rows)
}

/// Parse a `_climate` file. Absent percentile columns yield `None` values.
pub fn parse_climate(text: &str, origin: &str) -> Result<Vec<ClimateRow>> {
    let mut rdr = tab_reader(text);
    let columns = Columns::new(&rdr.headers()?.clone());
    let date_col = columns.require("date", origin)?;

    let mut rows = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let line = i + 2;
        let date = parse_row_date(field(&record, Some(date_col)), line, origin)?;
        let quantiles = |variable: Variable| -> Result<Quantiles> {
            let value = |p: u8| {
                let name = variable.column(p);
                parse_value(field(&record, columns.get(&name)), &name, line, origin)
            };
            Ok(Quantiles {
                q5: value(5)?,
                q50: value(50)?,
                q95: value(95)?,
            })
        };
        rows.push(ClimateRow {
            date,
            swe: quantiles(Variable::Swe)?,
            hs: quantiles(Variable::Hs)?,
            rof: quantiles(Variable::Rof)?,
        });
    }
    Ok(rows)
}
