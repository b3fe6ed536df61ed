//! Everything between the data crates and the screen.
//!
//! The dashboard runs a unidirectional loop: an [`Action`] is applied to the
//! [`SelectionState`], then [`render`] recombines the immutable geometry
//! snapshot, the basin status index and the selection into a [`Frame`]. The
//! frame is plain serializable data; the WASM app hands its parts to D3.
//!
//! Nothing here touches the DOM, so the whole loop is testable natively.

pub mod chart;
pub mod config;
pub mod render;
pub mod selection;

pub use chart::{compose, ChartPoint, ChartSpec, Mark, SeriesSpec};
pub use config::DashboardConfig;
pub use render::{render, ChartPane, Frame, MapFeature, MapView, PickerView, StatusIndex};
pub use selection::{Action, Selection, SelectionState, Transition};
