//! Application state managed via Dioxus context.
//!
//! `AppState` bundles all reactive signals into a single struct provided via
//! `use_context_provider`. Child components retrieve it with
//! `use_context::<AppState>()` and change the selection only through
//! [`AppState::dispatch`].

use casnow_basins::{GeometryStore, SpatialLocator};
use casnow_data::{MemorySource, SeriesKind};
use casnow_db::Database;
use casnow_view::{Action, DashboardConfig, SelectionState, StatusIndex, Transition};
use dioxus::prelude::*;
use std::collections::HashSet;
use std::rc::Rc;

/// Shared application state for the dashboard.
#[derive(Clone, Copy)]
pub struct AppState {
    /// Basin geometry snapshot (None until loaded)
    pub store: Signal<Option<Rc<GeometryStore>>>,
    /// Click resolver built from the store
    pub locator: Signal<Option<Rc<SpatialLocator>>>,
    /// Status database (None until loaded)
    pub db: Signal<Option<Database>>,
    /// Latest basin status used to color the map
    pub status: Signal<Rc<StatusIndex>>,
    /// The single source of truth for what is selected
    pub selection: Signal<SelectionState>,
    /// Series text fetched so far, plus the ids still in flight
    pub series: Signal<MemorySource>,
    /// Ids whose series files have been requested
    pub fetched: Signal<HashSet<String>>,
    /// Whether the app is still loading
    pub loading: Signal<bool>,
    /// Fatal startup error
    pub error_msg: Signal<Option<String>>,
    pub config: Signal<DashboardConfig>,
}

impl AppState {
    /// Create a new AppState with default signal values.
    pub fn new() -> Self {
        let config = DashboardConfig::default();
        Self {
            store: Signal::new(None),
            locator: Signal::new(None),
            db: Signal::new(None),
            status: Signal::new(Rc::new(StatusIndex::default())),
            selection: Signal::new(SelectionState::new(&config)),
            series: Signal::new(MemorySource::new()),
            fetched: Signal::new(HashSet::new()),
            loading: Signal::new(true),
            error_msg: Signal::new(None),
            config: Signal::new(config),
        }
    }

    /// Apply a user action to the selection. Ignored until geometry is loaded.
    pub fn dispatch(&mut self, action: Action) -> Option<Transition> {
        let store = match &*self.store.peek() {
            Some(store) => store.clone(),
            None => return None,
        };
        let locator = match &*self.locator.peek() {
            Some(locator) => locator.clone(),
            None => return None,
        };
        let transition = self.selection.write().apply(action, &store, &locator);
        log::info!("Selection transition: {:?}", transition);
        Some(transition)
    }

    /// Install the geometry snapshot and select the startup default.
    pub fn install_geometry(&mut self, store: GeometryStore, locator: SpatialLocator) {
        let selection = SelectionState::initial(&self.config.peek(), &store);
        log::info!("Startup selection: {:?}", selection.selection);
        self.store.set(Some(Rc::new(store)));
        self.locator.set(Some(Rc::new(locator)));
        self.selection.set(selection);
    }

    /// Claim `id` for fetching. Returns false when it was requested before.
    pub fn begin_fetch(&mut self, id: &str) -> bool {
        if !self.fetched.write().insert(id.to_string()) {
            return false;
        }
        self.series.write().mark_pending(id);
        true
    }

    /// Store fetched series text for `id` and end its fetch. `None` bodies
    /// are skipped so the loader reports them as missing.
    pub fn store_series(&mut self, id: &str, files: Vec<(SeriesKind, Option<String>)>) {
        let mut series = self.series.write();
        for (kind, text) in files {
            if let Some(text) = text {
                series.insert(id, kind, text);
            }
        }
        series.finish(id);
    }
}
