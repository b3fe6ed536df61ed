//! Dropdown of regions or sub-basins, kept in step with the map.

use crate::state::AppState;
use casnow_view::render::render_picker;
use casnow_view::Action;
use dioxus::prelude::*;

/// Picker whose options and value are derived from the selection.
#[component]
pub fn BasinPicker() -> Element {
    let mut state = use_context::<AppState>();
    let picker = match &*state.store.read() {
        Some(store) => render_picker(store, &state.selection.read()),
        None => return rsx! {},
    };
    let current = picker.value.clone().unwrap_or_default();

    let on_change = move |evt: Event<FormData>| {
        state.dispatch(Action::PickerChanged(evt.value()));
    };

    rsx! {
        div {
            style: "margin: 8px 0;",
            label {
                style: "font-weight: bold; margin-right: 8px;",
                "{picker.label}: "
            }
            select {
                onchange: on_change,
                option {
                    value: "",
                    disabled: true,
                    selected: current.is_empty(),
                    "Select..."
                }
                for option_value in picker.options.iter() {
                    option {
                        key: "{option_value}",
                        value: "{option_value}",
                        selected: *option_value == current,
                        "{option_value}"
                    }
                }
            }
        }
    }
}
