//! Merge the latest basin values with their climate band.

use crate::Paths;
use casnow_data::aggregate::{aggregate_dir, write_aggregate_csv, Level};
use log::info;
use std::path::PathBuf;

/// Run the status aggregation for both levels.
///
/// Writes `subbasins_merged_data.csv` and `regions_merged_data.csv` into the
/// data directory unless explicit output paths are given. Returns the number
/// of rows written per level.
pub fn run_aggregate(
    paths: &Paths,
    subbasins_csv: Option<PathBuf>,
    regions_csv: Option<PathBuf>,
) -> anyhow::Result<Vec<(Level, usize)>> {
    let mut written = Vec::new();
    for (level, output) in [(Level::SubBasin, subbasins_csv), (Level::Region, regions_csv)] {
        let output = output.unwrap_or_else(|| paths.data_dir().join(level.output_file()));
        let rows = aggregate_dir(paths.data_dir(), level)?;
        write_aggregate_csv(&output, &rows)?;
        info!("{}: {} basins -> {}", level, rows.len(), output.display());
        written.push((level, rows.len()));
    }
    Ok(written)
}
