//! Compose the chart the dashboard would show for one basin.

use crate::Paths;
use anyhow::anyhow;
use casnow_basins::{GeometryStore, Identifier};
use casnow_data::{DirectorySource, TimeSeriesLoader, Variable};
use casnow_view::render::render_chart;
use casnow_view::{ChartPane, DashboardConfig, Selection, SelectionState};

/// Look up `id` as a basin code first, then as a region id.
pub fn resolve(store: &GeometryStore, id: &str) -> anyhow::Result<Identifier> {
    if store.basin_by_code(id).is_some() {
        Ok(Identifier::Basin(id.to_string()))
    } else if store.region(id).is_some() {
        Ok(Identifier::Region(id.to_string()))
    } else {
        Err(anyhow!("{} is neither a basin code nor a region id", id))
    }
}

/// Render the chart pane for `id` from the series files in the data dir.
///
/// Load failures come back as a `ChartPane::Message`, the same text the
/// dashboard would show.
pub fn run_chart(paths: &Paths, id: &str, variable: Variable) -> anyhow::Result<ChartPane> {
    let store = GeometryStore::load(&paths.geometry)?;
    let identifier = resolve(&store, id)?;

    let mut state = SelectionState::initial(&DashboardConfig::default(), &store);
    state.view_mode = identifier.mode();
    state.variable = variable;
    state.selection = Selection::from(identifier);

    let loader = TimeSeriesLoader::new(DirectorySource::new(paths.data_dir()));
    let pane = render_chart(&store, &state, &loader);
    if let Some(message) = pane.message() {
        log::warn!("No chart for {}: {}", id, message);
    }
    Ok(pane)
}
