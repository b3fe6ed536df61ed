//! Snow Situation in Mountainous Central Asia
//!
//! Map of regional basins and gauged sub-basins. Tapping a polygon, or
//! picking one from the dropdown, charts its snow water equivalent, snow
//! depth or runoff against the long-term norm.
//!
//! Data flow:
//! 1. `build.rs` copies the merged status CSVs into `OUT_DIR`.
//! 2. `include_str!` embeds them into the WASM binary; on mount they are
//!    loaded into an in-memory SQLite database that colors the map.
//! 3. The gzip-compressed basin GeoJSON is fetched and normalized into a
//!    `GeometryStore`, and map clicks are wired to the selection.
//! 4. Whenever the selection changes, the basin's series files are fetched
//!    once and cached; every render pass then recomputes the frame from the
//!    geometry snapshot, status and selection and hands it to D3.

use casnow_basins::{GeometryStore, SpatialLocator};
use casnow_chart_ui::components::{
    BasinPicker, D3Pane, Notice, NoticeKind, SectionHeader, VariableToggle, ViewModeToggle,
};
use casnow_chart_ui::js_bridge;
use casnow_chart_ui::state::AppState;
use casnow_data::aggregate::{Level, Threshold};
use casnow_data::{SeriesKind, TimeSeriesLoader, Variable};
use casnow_db::Database;
use casnow_view::render::{status_level, HIGH_COLOR, LOW_COLOR, NORMAL_COLOR, UNKNOWN_COLOR};
use casnow_view::{render, Action, ChartPane, StatusIndex};
use dioxus::prelude::*;
use std::rc::Rc;

/// Latest status of every gauged sub-basin.
const SUBBASIN_STATUS_CSV: &str =
    include_str!(concat!(env!("OUT_DIR"), "/subbasins_merged_data.csv"));

/// Latest status of every regional basin.
const REGION_STATUS_CSV: &str = include_str!(concat!(env!("OUT_DIR"), "/regions_merged_data.csv"));

/// Runtime-fetched gzip-compressed basin outlines (served alongside WASM).
const BASINS_GZ_URL: &str = "./basins.geojson.gz";

const MAP_ID: &str = "basin-map";
const CHART_ID: &str = "snow-chart";

fn main() {
    dioxus_logger::init(dioxus_logger::tracing::Level::INFO).expect("failed to init logger");
    dioxus::LaunchBuilder::new()
        .with_cfg(dioxus::web::Config::new().rootname("snow-situation-root"))
        .launch(App);
}

/// Build the geometry snapshot, locator and status index.
async fn load_dashboard(
    tolerance: f64,
) -> Result<(GeometryStore, SpatialLocator, Database, StatusIndex), String> {
    let geojson = js_bridge::fetch_gz_text(BASINS_GZ_URL)
        .await
        .map_err(|e| format!("Failed to fetch basin outlines: {}", e))?;
    let store = GeometryStore::from_geojson_str(&geojson, tolerance).map_err(|e| e.to_string())?;
    let locator = SpatialLocator::new(&store).map_err(|e| e.to_string())?;

    let db = Database::new().map_err(|e| format!("Database initialization failed: {}", e))?;
    db.load_basin_status(SUBBASIN_STATUS_CSV, Level::SubBasin)
        .map_err(|e| format!("Failed to load sub-basin status: {}", e))?;
    db.load_basin_status(REGION_STATUS_CSV, Level::Region)
        .map_err(|e| format!("Failed to load regional status: {}", e))?;
    let status = StatusIndex::from_database(&db).map_err(|e| e.to_string())?;

    Ok((store, locator, db, status))
}

#[component]
fn App() -> Element {
    let mut state = use_context_provider(AppState::new);

    // Load geometry and status on mount
    use_effect(move || {
        spawn(async move {
            let tolerance = state.config.peek().simplify_tolerance_deg;
            match load_dashboard(tolerance).await {
                Ok((store, locator, db, status)) => {
                    state.install_geometry(store, locator);
                    state.db.set(Some(db));
                    state.status.set(Rc::new(status));
                    js_bridge::install_map_click_handler(move |x, y| {
                        state.dispatch(Action::MapClick { x, y });
                    });
                }
                Err(e) => {
                    log::error!("{}", e);
                    state.error_msg.set(Some(e));
                }
            }
            state.loading.set(false);
        });
    });

    // Fetch the selected basin's series once
    use_effect(move || {
        let Some(identifier) = state.selection.read().identifier() else {
            return;
        };
        let id = identifier.id().to_string();
        if !state.begin_fetch(&id) {
            return;
        }
        let base = state.config.peek().data_url.clone();

        spawn(async move {
            let mut files = Vec::new();
            for kind in [SeriesKind::Current, SeriesKind::Previous, SeriesKind::Climate] {
                let url = format!("{}/{}", base, kind.file_name(&id));
                match js_bridge::fetch_text(&url).await {
                    Ok(text) => files.push((kind, Some(text))),
                    Err(e) => {
                        log::warn!("Could not fetch {}: {}", url, e);
                        files.push((kind, None));
                    }
                }
            }
            state.store_series(&id, files);
        });
    });

    // Recompute the frame from snapshot + status + selection
    let frame = use_memo(move || {
        let store = match &*state.store.read() {
            Some(store) => store.clone(),
            None => return None,
        };
        let status = (state.status)();
        let selection = (state.selection)();
        let loader = TimeSeriesLoader::new((state.series)());
        Some(render(&store, &status, &selection, &loader))
    });

    // Hand the frame to D3
    use_effect(move || {
        if (state.loading)() || (state.error_msg)().is_some() {
            return;
        }
        let Some(frame) = frame() else {
            return;
        };

        js_bridge::init_charts();

        let map_json = serde_json::to_string(&frame.map).unwrap_or_default();
        js_bridge::render_basin_map(MAP_ID, &map_json);

        match &frame.chart {
            ChartPane::Chart(spec) => {
                let chart_json = serde_json::to_string(spec).unwrap_or_default();
                js_bridge::render_snow_chart(CHART_ID, &chart_json);
            }
            ChartPane::Message(_) | ChartPane::Loading => js_bridge::destroy_chart(CHART_ID),
        }
    });

    let (message, chart_loading) = match &*frame.read() {
        Some(frame) => (
            frame.chart.message().map(str::to_string),
            frame.chart.is_loading(),
        ),
        None => (None, false),
    };

    rsx! {
        div {
            style: "padding: 16px; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; display: flex; gap: 24px;",

            if let Some(err) = (state.error_msg)() {
                Notice { kind: NoticeKind::Fatal, message: err }
            } else if (state.loading)() {
                Notice { kind: NoticeKind::Loading, message: "Loading basins...".to_string() }
            } else {
                div {
                    style: "width: 220px; flex-shrink: 0;",
                    VariableToggle {}
                    ViewModeToggle {}
                    BasinPicker {}
                    StatusLegend {}
                }

                div {
                    style: "flex: 1; min-width: 0;",
                    SectionHeader {
                        title: "Tap a polygon to display the snow storage over time below".to_string(),
                    }
                    D3Pane { id: MAP_ID.to_string() }

                    SectionHeader {
                        title: "Snow situation in the selected basin".to_string(),
                        description: "SWE: snow water equivalent (mm), HS: snow depth (m), ROF: runoff (mm)".to_string(),
                    }
                    if let Some(message) = message {
                        Notice { kind: NoticeKind::Chart, message }
                    } else {
                        D3Pane {
                            id: CHART_ID.to_string(),
                            busy: if chart_loading { "Fetching series...".to_string() } else { String::new() },
                        }
                    }
                }
            }
        }
    }
}

/// Legend for the status colors of the map, with basin counts per class.
#[component]
fn StatusLegend() -> Element {
    let state = use_context::<AppState>();
    let (variable, mode) = {
        let selection = state.selection.read();
        (selection.variable, selection.view_mode)
    };
    let level = status_level(mode);
    let counts = match &*state.db.read() {
        Some(db) => db.query_threshold_counts(variable, level).unwrap_or_else(|e| {
            log::warn!("Threshold counts unavailable: {}", e);
            Vec::new()
        }),
        None => Vec::new(),
    };
    // Runoff is never classified
    let count_of = |threshold: Threshold| {
        (variable != Variable::Rof).then(|| {
            counts
                .iter()
                .find(|c| c.threshold == threshold.as_str())
                .map(|c| c.count)
                .unwrap_or(0)
        })
    };

    let entries = [
        (LOW_COLOR, "Below norm range", count_of(Threshold::Low)),
        (NORMAL_COLOR, "Within norm range", count_of(Threshold::Normal)),
        (HIGH_COLOR, "Above norm range", count_of(Threshold::High)),
        (UNKNOWN_COLOR, "No status", None),
    ];
    rsx! {
        div {
            style: "margin-top: 12px; padding: 8px 12px; background: #FAFAFA; border-radius: 4px; border: 1px solid #E0E0E0; font-size: 12px;",
            div { style: "font-weight: bold; margin-bottom: 4px;", "{variable} status" }
            for (color, label, count) in entries {
                div {
                    key: "{label}",
                    style: "display: flex; align-items: center; gap: 4px;",
                    span {
                        style: "display: inline-block; width: 16px; height: 10px; background: {color};",
                    }
                    "{label}"
                    if let Some(count) = count {
                        span { style: "color: #757575;", " ({count})" }
                    }
                }
            }
        }
    }
}
