//! Radio-style button groups for view mode and variable.

use crate::state::AppState;
use casnow_basins::ViewMode;
use casnow_data::Variable;
use casnow_view::Action;
use dioxus::prelude::*;

fn button_style(active: bool) -> &'static str {
    if active {
        "padding: 4px 12px; border: 1px solid #1976D2; background: #1976D2; color: white; cursor: pointer;"
    } else {
        "padding: 4px 12px; border: 1px solid #1976D2; background: white; color: #1976D2; cursor: pointer;"
    }
}

/// Regional / Sub-basin switch.
#[component]
pub fn ViewModeToggle() -> Element {
    let state = use_context::<AppState>();
    let current = state.selection.read().view_mode;

    rsx! {
        div {
            style: "margin: 8px 0;",
            div { style: "font-weight: bold; margin-bottom: 4px;", "Select granularity of view:" }
            for mode in [ViewMode::Regional, ViewMode::SubBasin] {
                button {
                    key: "{mode}",
                    style: button_style(mode == current),
                    onclick: move |_| {
                        let mut state = state;
                        state.dispatch(Action::ViewModeChanged(mode));
                    },
                    "{mode}"
                }
            }
        }
    }
}

/// SWE / HS / ROF switch.
#[component]
pub fn VariableToggle() -> Element {
    let state = use_context::<AppState>();
    let current = state.selection.read().variable;

    rsx! {
        div {
            style: "margin: 8px 0;",
            div { style: "font-weight: bold; margin-bottom: 4px;", "Select variable to display:" }
            for variable in Variable::ALL {
                button {
                    key: "{variable}",
                    style: button_style(variable == current),
                    title: variable.description(),
                    onclick: move |_| {
                        let mut state = state;
                        state.dispatch(Action::VariableChanged(variable));
                    },
                    "{variable}"
                }
            }
        }
    }
}
