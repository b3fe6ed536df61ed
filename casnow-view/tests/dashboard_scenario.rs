//! Click a basin, read its chart, switch variables.

use casnow_basins::projection::lon_lat_to_web_mercator;
use casnow_basins::store::SIMPLIFY_TOLERANCE_DEG;
use casnow_basins::{GeometryStore, Identifier, SpatialLocator, ViewMode};
use casnow_data::{DirectorySource, TimeSeriesLoader, Variable};
use casnow_view::{render, Action, DashboardConfig, Selection, SelectionState, StatusIndex, Transition};

const BASINS: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type":"Feature","properties":{"REGION":"SYR_DARYA","BASIN":"Naryn","CODE":"16100","gauges_RIVER":"Naryn","area_km2":5000},
     "geometry":{"type":"Polygon","coordinates":[[[72,41],[76,41],[76,43],[72,43],[72,41]]]}},
    {"type":"Feature","properties":{"REGION":"AMU_DARYA","BASIN":"Vakhsh","CODE":"17123","gauges_RIVER":"Obikhingou","area_km2":1200},
     "geometry":{"type":"MultiPolygon","coordinates":[
        [[[70,38],[71.5,38],[71.5,39],[70,39],[70,38]]],
        [[[69,36],[69.2,36],[69.2,36.2],[69,36.2],[69,36]]]
     ]}}
  ]
}"#;

const CURRENT: &str = "date\tFC\tQ50_SWE\tQ50_HS\n\
2024-02-28\tFalse\t120.0\t0.80\n\
2024-02-29\tFalse\t121.5\t0.82\n\
2024-03-01\tTrue\t123.0\t0.85\n";

const PREVIOUS: &str = "date\tFC\tQ50_SWE\tQ50_HS\n\
2023-02-28\tFalse\t90.0\t0.60\n\
2023-03-01\tFalse\t91.0\t0.61\n";

const CLIMATE: &str = "date\tQ5_SWE\tQ50_SWE\tQ95_SWE\tQ5_HS\tQ50_HS\tQ95_HS\n\
2024-02-28\t40.0\t100.0\t180.0\t0.30\t0.70\t1.20\n\
2024-02-29\t41.0\t101.0\t181.0\t0.31\t0.71\t1.21\n\
2024-03-01\t42.0\t102.0\t182.0\t0.32\t0.72\t1.22\n";

fn data_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("casnow-scenario-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("17123_current.txt"), CURRENT).unwrap();
    std::fs::write(dir.join("17123_previous.txt"), PREVIOUS).unwrap();
    std::fs::write(dir.join("17123_climate.txt"), CLIMATE).unwrap();
    dir
}

#[test]
fn click_then_switch_variable() {
    let store = GeometryStore::from_geojson_str(BASINS, SIMPLIFY_TOLERANCE_DEG).unwrap();
    let locator = SpatialLocator::new(&store).unwrap();
    let dir = data_dir();
    let loader = TimeSeriesLoader::new(DirectorySource::new(&dir));
    let status = StatusIndex::default();
    let mut state = SelectionState::initial(&DashboardConfig::default(), &store);
    assert_eq!(state.selection, Selection::RegionSelected("AMU_DARYA".into()));

    state.apply(Action::ViewModeChanged(ViewMode::SubBasin), &store, &locator);

    // Inside 17123 only
    let click = lon_lat_to_web_mercator(71.0, 38.5).unwrap();
    let transition = state.apply(Action::MapClick { x: click.x, y: click.y }, &store, &locator);
    assert_eq!(transition, Transition::Selected(Identifier::Basin("17123".into())));

    let frame = render(&store, &status, &state, &loader);
    let chart = frame.chart.chart().expect("chart for the clicked basin");
    assert!(chart.title.contains("Obikhingou"), "title was {}", chart.title);
    assert_eq!(chart.y_axis_label, "SWE (mm)");
    assert_eq!(chart.series("Current SWE").unwrap().points.len(), 2);
    assert_eq!(chart.series("Forecast SWE").unwrap().points.len(), 1);
    // 2023-02-28 lands on 2024-02-28
    let previous = &chart.series("Previous year SWE").unwrap().points;
    assert_eq!(previous[0].date, "2024-02-28");
    assert_eq!(frame.picker.value.as_deref(), Some("17123 - Obikhingou"));

    let transition = state.apply(Action::VariableChanged(Variable::Hs), &store, &locator);
    assert_eq!(transition, Transition::Restyled);
    assert_eq!(state.selection, Selection::BasinSelected("17123".into()));

    let frame = render(&store, &status, &state, &loader);
    let chart = frame.chart.chart().expect("chart after variable switch");
    assert_eq!(chart.y_axis_label, "HS (m)");
    assert!(chart.title.starts_with("HS situation"));
    assert!(chart.title.contains("Obikhingou"));
    assert_eq!(frame.picker.value.as_deref(), Some("17123 - Obikhingou"));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn click_on_dropped_multipolygon_part_selects_nothing() {
    let store = GeometryStore::from_geojson_str(BASINS, SIMPLIFY_TOLERANCE_DEG).unwrap();
    let locator = SpatialLocator::new(&store).unwrap();
    let mut state = SelectionState::initial(&DashboardConfig::default(), &store);
    state.apply(Action::ViewModeChanged(ViewMode::SubBasin), &store, &locator);
    let before = state.selection.clone();

    // Only the largest part of a MultiPolygon is kept
    let click = lon_lat_to_web_mercator(69.1, 36.1).unwrap();
    let transition = state.apply(Action::MapClick { x: click.x, y: click.y }, &store, &locator);
    assert_eq!(transition, Transition::Notice("Please click on a basin.".into()));
    assert_eq!(state.selection, before);
}
