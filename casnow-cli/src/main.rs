//! casnow CLI - Command line tool for the Central Asia snow situation data.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "casnow-cli",
    version,
    about = "Snow situation in mountainous Central Asia data toolkit"
)]
struct Cli {
    /// Directory with the `{id}_{current,previous,climate}.txt` series files
    #[arg(long, env = "MCASS_DATA_PATH")]
    data_dir: PathBuf,

    /// Basin polygon GeoJSON
    #[arg(long, env = "CASNOW_GEOMETRY", default_value = "fixtures/basins.geojson")]
    geometry: PathBuf,

    #[command(subcommand)]
    command: casnow_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("Data directory: {}", cli.data_dir.display());
    let paths = casnow_cmd::Paths::new(cli.data_dir, cli.geometry);
    casnow_cmd::run(cli.command, &paths)
}
