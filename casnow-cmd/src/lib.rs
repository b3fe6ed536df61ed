//! Command implementations for the Central Asia snow CLI.
//!
//! Provides subcommands for summarizing the model output into the merged
//! status files, hit-testing map coordinates, and dumping the chart a
//! dashboard would draw for one basin.

use casnow_basins::ViewMode;
use casnow_data::Variable;
use clap::Subcommand;
use std::path::{Path, PathBuf};

pub mod aggregate;
pub mod chart;
pub mod locate;

#[derive(Subcommand)]
pub enum Command {
    /// Merge the latest value of every basin with its climate band
    Aggregate {
        /// Output path for the sub-basin status CSV (default: in the data dir)
        #[arg(long)]
        subbasins_csv: Option<PathBuf>,

        /// Output path for the regional status CSV (default: in the data dir)
        #[arg(long)]
        regions_csv: Option<PathBuf>,
    },

    /// Find the basin under a Web Mercator (EPSG:3857) coordinate
    Locate {
        /// Easting in meters
        #[arg(allow_hyphen_values = true)]
        x: f64,

        /// Northing in meters
        #[arg(allow_hyphen_values = true)]
        y: f64,

        /// Regional or Sub-basin
        #[arg(short, long, default_value = "Sub-basin")]
        mode: ViewMode,
    },

    /// Print the chart for one basin or region as JSON
    Chart {
        /// Basin code or region id, e.g. 16152 or SYR_DARYA
        id: String,

        /// SWE, HS or ROF
        #[arg(short, long, default_value = "SWE")]
        variable: Variable,
    },
}

/// Locations shared by every command.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Directory holding the `{id}_{kind}.txt` series files
    pub data_dir: PathBuf,
    /// Basin polygon GeoJSON
    pub geometry: PathBuf,
}

impl Paths {
    pub fn new(data_dir: impl Into<PathBuf>, geometry: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            geometry: geometry.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

pub fn run(command: Command, paths: &Paths) -> anyhow::Result<()> {
    if !paths.data_dir.is_dir() {
        anyhow::bail!(
            "Data directory {} does not exist",
            paths.data_dir.display()
        );
    }
    match command {
        Command::Aggregate {
            subbasins_csv,
            regions_csv,
        } => aggregate::run_aggregate(paths, subbasins_csv, regions_csv).map(|_| ()),
        Command::Locate { x, y, mode } => {
            let found = locate::run_locate(paths, x, y, mode)?;
            match found {
                Some(identifier) => println!("{}", identifier.id()),
                None => println!("{}", casnow_utils::error::CLICK_PROMPT),
            }
            Ok(())
        }
        Command::Chart { id, variable } => {
            let pane = chart::run_chart(paths, &id, variable)?;
            println!("{}", serde_json::to_string_pretty(&pane)?);
            Ok(())
        }
    }
}
