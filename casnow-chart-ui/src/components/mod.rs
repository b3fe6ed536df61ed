//! Reusable Dioxus RSX components for the snow dashboard.

mod basin_picker;
mod panes;
mod toggles;

pub use basin_picker::BasinPicker;
pub use panes::{D3Pane, Notice, NoticeKind, SectionHeader};
pub use toggles::{VariableToggle, ViewModeToggle};
