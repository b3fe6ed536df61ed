//! Frame rendering: snapshot + status + selection in, screen data out.
//!
//! The geometry store is never mutated for highlighting. Every render pass
//! derives the `selected` flags from the current [`SelectionState`], so at
//! most one basin or one region is ever flagged.

use crate::chart::{compose, ChartSpec};
use crate::selection::SelectionState;
use casnow_basins::{GeometryStore, Identifier, ViewMode};
use casnow_data::aggregate::{Level, Threshold};
use casnow_data::{SeriesSource, TimeSeriesLoader, Variable};
use casnow_db::models::BasinStatus;
use casnow_db::Database;
use casnow_utils::error::{user_message, CLICK_PROMPT};
use geo::{LineString, Polygon};
use serde::Serialize;
use std::collections::HashMap;

pub const LOW_COLOR: &str = "#d73027";
pub const NORMAL_COLOR: &str = "#9e9e9e";
pub const HIGH_COLOR: &str = "#4575b4";
/// Fill of polygons without a status for the shown variable.
pub const UNKNOWN_COLOR: &str = "#e0e0e0";

pub fn threshold_color(threshold: Option<Threshold>) -> &'static str {
    match threshold {
        Some(Threshold::Low) => LOW_COLOR,
        Some(Threshold::Normal) => NORMAL_COLOR,
        Some(Threshold::High) => HIGH_COLOR,
        None => UNKNOWN_COLOR,
    }
}

/// Latest status per level and id. Sub-basin codes and region ids live in
/// separate key spaces.
#[derive(Debug, Clone, Default)]
pub struct StatusIndex {
    entries: HashMap<(Level, String), BasinStatus>,
}

/// Status level shown on the map in `mode`.
pub fn status_level(mode: ViewMode) -> Level {
    match mode {
        ViewMode::Regional => Level::Region,
        ViewMode::SubBasin => Level::SubBasin,
    }
}

impl StatusIndex {
    pub fn new(statuses: impl IntoIterator<Item = BasinStatus>) -> Self {
        let mut entries = HashMap::new();
        for status in statuses {
            match Level::from_name(&status.level) {
                Some(level) => {
                    entries.insert((level, status.basin_id.clone()), status);
                }
                None => log::warn!(
                    "Skipping status of {} with unknown level `{}`",
                    status.basin_id,
                    status.level
                ),
            }
        }
        Self { entries }
    }

    /// Read both levels from the status database.
    pub fn from_database(db: &Database) -> anyhow::Result<Self> {
        let mut statuses = db.query_statuses(Level::SubBasin)?;
        statuses.extend(db.query_statuses(Level::Region)?);
        Ok(Self::new(statuses))
    }

    pub fn get(&self, level: Level, id: &str) -> Option<&BasinStatus> {
        self.entries.get(&(level, id.to_string()))
    }

    pub fn threshold(&self, level: Level, id: &str, variable: Variable) -> Option<Threshold> {
        self.get(level, id)?.threshold(variable)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One basin polygon as drawn on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapFeature {
    pub code: String,
    pub label: String,
    pub region: String,
    /// Lon/lat rings, exterior first
    pub rings: Vec<Vec<[f64; 2]>>,
    pub selected: bool,
    pub color: String,
    pub status: Option<Threshold>,
}

/// Map pane contents, features in draw order (largest first).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub mode: ViewMode,
    pub selected: Option<Identifier>,
    pub features: Vec<MapFeature>,
}

impl MapView {
    pub fn selected_features(&self) -> impl Iterator<Item = &MapFeature> {
        self.features.iter().filter(|f| f.selected)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickerView {
    pub label: String,
    pub options: Vec<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "lowercase")]
pub enum ChartPane {
    Chart(ChartSpec),
    Message(String),
    /// The selected id's series are still being fetched
    Loading,
}

impl ChartPane {
    pub fn chart(&self) -> Option<&ChartSpec> {
        match self {
            ChartPane::Chart(spec) => Some(spec),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ChartPane::Message(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ChartPane::Loading)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub map: MapView,
    pub picker: PickerView,
    pub chart: ChartPane,
}

fn ring_coords(ring: &LineString<f64>) -> Vec<[f64; 2]> {
    ring.coords().map(|c| [c.x, c.y]).collect()
}

fn polygon_rings(polygon: &Polygon<f64>) -> Vec<Vec<[f64; 2]>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(ring_coords)
        .collect()
}

/// Build the map pane for the current mode and selection.
pub fn render_map(store: &GeometryStore, status: &StatusIndex, state: &SelectionState) -> MapView {
    let selected = state.identifier();
    let level = status_level(state.view_mode);
    let features = store
        .basins()
        .iter()
        .map(|basin| {
            let (is_selected, status_id) = match state.view_mode {
                ViewMode::Regional => (
                    matches!(&selected, Some(Identifier::Region(id)) if *id == basin.region),
                    basin.region.as_str(),
                ),
                ViewMode::SubBasin => (
                    matches!(&selected, Some(Identifier::Basin(code)) if *code == basin.code),
                    basin.code.as_str(),
                ),
            };
            let threshold = status.threshold(level, status_id, state.variable);
            MapFeature {
                code: basin.code.clone(),
                label: basin.label.clone(),
                region: basin.region.clone(),
                rings: polygon_rings(&basin.polygon),
                selected: is_selected,
                color: threshold_color(threshold).to_string(),
                status: threshold,
            }
        })
        .collect();
    MapView {
        mode: state.view_mode,
        selected,
        features,
    }
}

/// Picker options for the current mode, with the selection as value.
pub fn render_picker(store: &GeometryStore, state: &SelectionState) -> PickerView {
    match state.view_mode {
        ViewMode::Regional => PickerView {
            label: "Region".to_string(),
            options: store.region_ids(),
            value: match state.identifier() {
                Some(Identifier::Region(id)) => Some(id),
                _ => None,
            },
        },
        ViewMode::SubBasin => PickerView {
            label: "Sub-basin".to_string(),
            options: store.labels(),
            value: match state.identifier() {
                Some(Identifier::Basin(code)) => store.basin_by_code(&code).map(|b| b.label.clone()),
                _ => None,
            },
        },
    }
}

/// Load the selected series and compose the chart, or explain why not.
pub fn render_chart<S: SeriesSource>(
    store: &GeometryStore,
    state: &SelectionState,
    loader: &TimeSeriesLoader<S>,
) -> ChartPane {
    if let Some(notice) = &state.notice {
        return ChartPane::Message(notice.clone());
    }
    let Some(identifier) = state.identifier() else {
        return ChartPane::Message(CLICK_PROMPT.to_string());
    };
    let id = identifier.id();
    if loader.is_pending(id) {
        return ChartPane::Loading;
    }

    let current = match loader.load_current(id) {
        Ok(current) => current,
        Err(e) => {
            log::warn!("Current series for {} unavailable: {}", id, e);
            return ChartPane::Message(user_message("load current data", &e));
        }
    };
    let climate = match loader.load_climate(id) {
        Ok(climate) => climate,
        Err(e) => {
            log::warn!("Climate series for {} unavailable: {}", id, e);
            return ChartPane::Message(user_message("load climate data", &e));
        }
    };
    let previous = match loader.load_previous(id) {
        Ok(previous) => Some(previous),
        Err(e) => {
            log::warn!("No previous-year series for {}: {}", id, e);
            None
        }
    };

    let river_name = match &identifier {
        Identifier::Basin(code) => store.river_name(code),
        Identifier::Region(_) => None,
    };
    ChartPane::Chart(compose(
        state.variable,
        &identifier,
        river_name,
        &current,
        previous.as_deref(),
        &climate,
    ))
}

/// Run one full render pass.
pub fn render<S: SeriesSource>(
    store: &GeometryStore,
    status: &StatusIndex,
    state: &SelectionState,
    loader: &TimeSeriesLoader<S>,
) -> Frame {
    Frame {
        map: render_map(store, status, state),
        picker: render_picker(store, state),
        chart: render_chart(store, state, loader),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::selection::tests::{click, fixture};
    use crate::selection::Action;
    use casnow_data::{MemorySource, SeriesKind};
    use std::collections::HashSet;

    const CURRENT: &str = "date\tFC\tQ50_SWE\tQ50_HS\n2024-03-01\tFalse\t40\t0.4\n2024-03-02\tTrue\t42\t0.41\n";
    const CLIMATE: &str = "date\tQ5_SWE\tQ50_SWE\tQ95_SWE\tQ5_HS\tQ50_HS\tQ95_HS\n2024-03-01\t10\t50\t90\t0.1\t0.5\t0.9\n";

    fn loader() -> TimeSeriesLoader<MemorySource> {
        TimeSeriesLoader::new(
            MemorySource::new()
                .with("17050", SeriesKind::Current, CURRENT)
                .with("17050", SeriesKind::Climate, CLIMATE)
                .with("SYR_DARYA", SeriesKind::Current, CURRENT)
                .with("SYR_DARYA", SeriesKind::Previous, CURRENT)
                .with("SYR_DARYA", SeriesKind::Climate, CLIMATE),
        )
    }

    fn status_index() -> StatusIndex {
        let db = Database::new().unwrap();
        db.load_basin_status(
            "date,current_swe,current_hs,basin_id,Q5_SWE,Q5_HS,climate_swe,climate_hs,Q95_SWE,Q95_HS,swe_threshold,hs_threshold\n\
             2024-03-02,95.0,0.5,17050,10.0,0.1,50.0,0.5,90.0,0.9,high,normal\n",
            Level::SubBasin,
        )
        .unwrap();
        db.load_basin_status(
            "date,current_swe,current_hs,basin_id,Q5_SWE,Q5_HS,climate_swe,climate_hs,Q95_SWE,Q95_HS,swe_threshold,hs_threshold\n\
             2024-03-02,5.0,0.5,SYR_DARYA,10.0,0.1,50.0,0.5,90.0,0.9,low,normal\n",
            Level::Region,
        )
        .unwrap();
        StatusIndex::from_database(&db).unwrap()
    }

    fn distinct_selected(map: &MapView) -> HashSet<String> {
        map.selected_features()
            .map(|f| match map.mode {
                ViewMode::Regional => f.region.clone(),
                ViewMode::SubBasin => f.code.clone(),
            })
            .collect()
    }

    #[test]
    fn startup_frame_highlights_first_region() {
        let (store, _) = fixture();
        let state = SelectionState::initial(&DashboardConfig::default(), &store);
        let frame = render(&store, &status_index(), &state, &loader());
        let highlighted: Vec<&str> = frame.map.selected_features().map(|f| f.code.as_str()).collect();
        assert_eq!(highlighted, vec!["17050"]);
        assert_eq!(frame.picker.value.as_deref(), Some("AMU_DARYA"));
        assert_eq!(frame.picker.options, vec!["AMU_DARYA", "SYR_DARYA"]);
    }

    #[test]
    fn nothing_selected_shows_prompt() {
        let (store, _) = fixture();
        let state = SelectionState::new(&DashboardConfig::default());
        let frame = render(&store, &status_index(), &state, &loader());
        assert_eq!(frame.chart.message(), Some("Please click on a basin."));
        assert_eq!(frame.map.selected_features().count(), 0);
        assert_eq!(frame.picker.value, None);
    }

    #[test]
    fn pending_series_show_loading_not_an_error() {
        let (store, locator) = fixture();
        let mut state = SelectionState::initial(&DashboardConfig::default(), &store);
        state.apply(Action::ViewModeChanged(ViewMode::SubBasin), &store, &locator);
        let id = state.identifier().unwrap().id().to_string();

        let mut source = MemorySource::new();
        source.mark_pending(&id);
        let frame = render(&store, &status_index(), &state, &TimeSeriesLoader::new(source.clone()));
        assert!(frame.chart.is_loading(), "got {:?}", frame.chart);
        assert_eq!(frame.chart.message(), None);

        // Once the fetch is over, missing files are reported as usual
        source.finish(&id);
        let frame = render(&store, &status_index(), &state, &TimeSeriesLoader::new(source));
        let message = frame.chart.message().unwrap();
        assert!(message.starts_with("Error in load current data"), "{}", message);
    }

    #[test]
    fn pending_other_id_does_not_hold_the_chart() {
        let (store, locator) = fixture();
        let mut state = SelectionState::initial(&DashboardConfig::default(), &store);
        state.apply(click(73.5, 42.0), &store, &locator);
        let mut source = loader().source().clone();
        source.mark_pending("17050");
        let frame = render(&store, &status_index(), &state, &TimeSeriesLoader::new(source));
        assert!(frame.chart.chart().is_some());
    }

    #[test]
    fn region_and_basin_sharing_an_id_keep_their_own_status() {
        let (store, locator) = fixture();
        let db = Database::new().unwrap();
        db.load_basin_status(
            "date,current_swe,current_hs,basin_id,Q5_SWE,Q5_HS,climate_swe,climate_hs,Q95_SWE,Q95_HS,swe_threshold,hs_threshold\n\
             2024-03-02,95.0,0.5,17050,10.0,0.1,50.0,0.5,90.0,0.9,high,normal\n",
            Level::SubBasin,
        )
        .unwrap();
        db.load_basin_status(
            "date,current_swe,current_hs,basin_id,Q5_SWE,Q5_HS,climate_swe,climate_hs,Q95_SWE,Q95_HS,swe_threshold,hs_threshold\n\
             2024-03-02,5.0,0.5,17050,10.0,0.1,50.0,0.5,90.0,0.9,low,normal\n",
            Level::Region,
        )
        .unwrap();
        let status = StatusIndex::from_database(&db).unwrap();
        assert_eq!(status.len(), 2);
        assert_eq!(status.threshold(Level::SubBasin, "17050", Variable::Swe), Some(Threshold::High));
        assert_eq!(status.threshold(Level::Region, "17050", Variable::Swe), Some(Threshold::Low));

        let mut state = SelectionState::initial(&DashboardConfig::default(), &store);
        state.apply(Action::ViewModeChanged(ViewMode::SubBasin), &store, &locator);
        let frame = render(&store, &status, &state, &loader());
        let feature = frame.map.features.iter().find(|f| f.code == "17050").unwrap();
        assert_eq!(feature.color, HIGH_COLOR);
    }

    #[test]
    fn unknown_status_level_is_skipped() {
        let status = StatusIndex::new(vec![BasinStatus {
            basin_id: "16100".into(),
            level: "province".into(),
            date: "2024-03-02".into(),
            current_swe: None,
            current_hs: None,
            q5_swe: None,
            q5_hs: None,
            climate_swe: None,
            climate_hs: None,
            q95_swe: None,
            q95_hs: None,
            swe_threshold: "low".into(),
            hs_threshold: "low".into(),
        }]);
        assert!(status.is_empty());
    }

    #[test]
    fn at_most_one_identifier_is_highlighted() {
        let (store, locator) = fixture();
        let status = status_index();
        let mut state = SelectionState::initial(&DashboardConfig::default(), &store);
        let actions = vec![
            click(73.5, 42.0),
            Action::ViewModeChanged(ViewMode::SubBasin),
            click(73.5, 42.0),
            click(70.0, 38.0),
            click(10.0, 10.0),
            Action::PickerChanged("16100 - Naryn".into()),
            Action::ViewModeChanged(ViewMode::Regional),
        ];
        for action in actions {
            state.apply(action, &store, &locator);
            let frame = render(&store, &status, &state, &loader());
            assert!(distinct_selected(&frame.map).len() <= 1);
        }
    }

    #[test]
    fn picker_value_tracks_highlight() {
        let (store, locator) = fixture();
        let status = status_index();
        let mut state = SelectionState::initial(&DashboardConfig::default(), &store);
        state.apply(Action::ViewModeChanged(ViewMode::SubBasin), &store, &locator);
        state.apply(click(73.5, 42.0), &store, &locator);
        let frame = render(&store, &status, &state, &loader());
        let highlighted: Vec<&str> = frame.map.selected_features().map(|f| f.label.as_str()).collect();
        assert_eq!(highlighted, vec!["16152 - Kokemeren"]);
        assert_eq!(frame.picker.value.as_deref(), Some("16152 - Kokemeren"));
        assert_eq!(frame.picker.label, "Sub-basin");
    }

    #[test]
    fn regional_selection_flags_all_member_basins() {
        let (store, locator) = fixture();
        let mut state = SelectionState::initial(&DashboardConfig::default(), &store);
        state.apply(click(73.5, 42.0), &store, &locator);
        let frame = render(&store, &status_index(), &state, &loader());
        assert_eq!(frame.map.selected_features().count(), 2);
        assert_eq!(distinct_selected(&frame.map).len(), 1);
        assert_eq!(frame.picker.value.as_deref(), Some("SYR_DARYA"));
        let chart = frame.chart.chart().unwrap();
        assert_eq!(chart.title, "SWE situation for the Syr Darya basin");
        assert_eq!(chart.series("Previous year SWE").unwrap().points.len(), 2);
    }

    #[test]
    fn polygons_are_colored_by_status() {
        let (store, locator) = fixture();
        let status = status_index();
        let mut state = SelectionState::initial(&DashboardConfig::default(), &store);
        let frame = render(&store, &status, &state, &loader());
        let color_of = |map: &MapView, code: &str| {
            map.features.iter().find(|f| f.code == code).unwrap().color.clone()
        };
        assert_eq!(color_of(&frame.map, "16152"), LOW_COLOR);
        assert_eq!(color_of(&frame.map, "17050"), UNKNOWN_COLOR);

        state.apply(Action::ViewModeChanged(ViewMode::SubBasin), &store, &locator);
        let frame = render(&store, &status, &state, &loader());
        assert_eq!(color_of(&frame.map, "17050"), HIGH_COLOR);

        state.apply(Action::VariableChanged(Variable::Hs), &store, &locator);
        let frame = render(&store, &status, &state, &loader());
        assert_eq!(color_of(&frame.map, "17050"), NORMAL_COLOR);

        state.apply(Action::VariableChanged(Variable::Rof), &store, &locator);
        let frame = render(&store, &status, &state, &loader());
        assert_eq!(color_of(&frame.map, "17050"), UNKNOWN_COLOR);
    }

    #[test]
    fn missing_series_becomes_a_message() {
        let (store, locator) = fixture();
        let mut state = SelectionState::initial(&DashboardConfig::default(), &store);
        state.apply(Action::ViewModeChanged(ViewMode::SubBasin), &store, &locator);
        state.apply(click(73.5, 42.0), &store, &locator);
        let frame = render(&store, &status_index(), &state, &loader());
        let message = frame.chart.message().unwrap();
        assert!(message.contains("16152_current.txt"), "{}", message);
        assert!(message.ends_with("Please click on a basin."));
    }

    #[test]
    fn missing_previous_year_keeps_chart() {
        let (store, locator) = fixture();
        let mut state = SelectionState::initial(&DashboardConfig::default(), &store);
        state.apply(Action::ViewModeChanged(ViewMode::SubBasin), &store, &locator);
        state.apply(click(70.0, 38.0), &store, &locator);
        let frame = render(&store, &status_index(), &state, &loader());
        let chart = frame.chart.chart().unwrap();
        assert_eq!(chart.title, "SWE situation for basin of river Vakhsh (gauge 17050)");
        assert!(chart.series("Previous year SWE").unwrap().points.is_empty());
    }

    #[test]
    fn frame_serializes_chart_pane_with_kind_tag() {
        let (store, _) = fixture();
        let state = SelectionState::initial(&DashboardConfig::default(), &store);
        let frame = render(&store, &StatusIndex::default(), &state, &loader());
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["chart"]["kind"], "message");
        assert_eq!(json["map"]["features"].as_array().unwrap().len(), 3);
    }
}
