//! Selection State: the single writer of what is selected.
//!
//! Map clicks, picker changes and the two toggles all go through
//! [`SelectionState::apply`]. The picker value and the highlighted polygon
//! are both derived from [`Selection`] at render time, so they can never
//! disagree.

use crate::config::DashboardConfig;
use casnow_basins::{GeometryStore, Identifier, LocateOutcome, SpatialLocator, ViewMode};
use casnow_data::Variable;
use casnow_utils::error::{user_message, DashboardError, CLICK_PROMPT};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum Selection {
    #[default]
    NoSelection,
    /// Region id
    RegionSelected(String),
    /// Basin code
    BasinSelected(String),
}

impl Selection {
    pub fn identifier(&self) -> Option<Identifier> {
        match self {
            Selection::NoSelection => None,
            Selection::RegionSelected(id) => Some(Identifier::Region(id.clone())),
            Selection::BasinSelected(code) => Some(Identifier::Basin(code.clone())),
        }
    }
}

impl From<Identifier> for Selection {
    fn from(identifier: Identifier) -> Self {
        match identifier {
            Identifier::Region(id) => Selection::RegionSelected(id),
            Identifier::Basin(code) => Selection::BasinSelected(code),
        }
    }
}

/// A user interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Click on the map, in Web Mercator meters
    MapClick { x: f64, y: f64 },
    /// Picker value: a region id in regional view, a basin label otherwise
    PickerChanged(String),
    ViewModeChanged(ViewMode),
    VariableChanged(Variable),
}

/// What an action did to the state.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// A new basin or region is selected
    Selected(Identifier),
    /// Selection kept; a notice replaces the chart
    Notice(String),
    /// View mode switched and the selection reset to its default
    ModeReset(Option<Identifier>),
    /// Only the charted variable changed
    Restyled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionState {
    pub selection: Selection,
    pub view_mode: ViewMode,
    pub variable: Variable,
    /// Prompt or diagnostic shown instead of the chart
    pub notice: Option<String>,
    default_subbasin_index: usize,
}

impl SelectionState {
    /// Regional view, SWE, nothing selected. Only meant for the time before
    /// geometry has loaded.
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            selection: Selection::NoSelection,
            view_mode: ViewMode::default(),
            variable: Variable::default(),
            notice: None,
            default_subbasin_index: config.default_subbasin_index,
        }
    }

    /// Startup state: regional view, SWE, first region selected. Nothing is
    /// selected only when `store` is empty.
    pub fn initial(config: &DashboardConfig, store: &GeometryStore) -> Self {
        let mut state = Self::new(config);
        state.selection = state.default_for(ViewMode::Regional, store);
        state
    }

    pub fn identifier(&self) -> Option<Identifier> {
        self.selection.identifier()
    }

    /// Default selection of `mode`: the first region, or the configured
    /// sub-basin index (clamped to the last basin).
    pub fn default_for(&self, mode: ViewMode, store: &GeometryStore) -> Selection {
        match mode {
            ViewMode::Regional => store
                .regions()
                .first()
                .map(|r| Selection::RegionSelected(r.id.clone()))
                .unwrap_or_default(),
            ViewMode::SubBasin => {
                let basins = store.basins();
                let index = self.default_subbasin_index.min(basins.len().saturating_sub(1));
                basins
                    .get(index)
                    .map(|b| Selection::BasinSelected(b.code.clone()))
                    .unwrap_or_default()
            }
        }
    }

    fn select(&mut self, identifier: Identifier) -> Transition {
        self.selection = Selection::from(identifier.clone());
        self.notice = None;
        Transition::Selected(identifier)
    }

    fn notify(&mut self, message: String) -> Transition {
        self.notice = Some(message.clone());
        Transition::Notice(message)
    }

    /// Resolve a picker value against the current view mode.
    fn resolve_picker(&self, value: &str, store: &GeometryStore) -> Option<Identifier> {
        match self.view_mode {
            ViewMode::Regional => store
                .region(value)
                .map(|r| Identifier::Region(r.id.clone())),
            ViewMode::SubBasin => store
                .basin_by_label(value)
                .or_else(|| store.basin_by_code(value))
                .map(|b| Identifier::Basin(b.code.clone())),
        }
    }

    pub fn apply(
        &mut self,
        action: Action,
        store: &GeometryStore,
        locator: &SpatialLocator,
    ) -> Transition {
        match action {
            Action::MapClick { x, y } => match locator.locate_or_message(x, y, self.view_mode) {
                LocateOutcome::Found(identifier) => self.select(identifier),
                LocateOutcome::Nothing => self.notify(CLICK_PROMPT.to_string()),
                LocateOutcome::Failed(message) => self.notify(message),
            },
            Action::PickerChanged(value) => match self.resolve_picker(&value, store) {
                Some(identifier) => self.select(identifier),
                None => {
                    log::warn!("Picker value `{}` matches no {}", value, self.view_mode);
                    let err = DashboardError::LookupMiss(value);
                    self.notify(user_message("picker", &err))
                }
            },
            Action::ViewModeChanged(mode) => {
                self.view_mode = mode;
                self.selection = self.default_for(mode, store);
                self.notice = None;
                Transition::ModeReset(self.selection.identifier())
            }
            Action::VariableChanged(variable) => {
                self.variable = variable;
                Transition::Restyled
            }
        }
    }
}
