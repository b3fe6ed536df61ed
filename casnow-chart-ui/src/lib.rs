//! Shared Dioxus components and D3.js bridge for the snow dashboard.
//!
//! This crate provides:
//! - `js_bridge`: Rust wrappers for the D3.js map and chart via `js_sys::eval()`,
//!   plus fetch helpers for data served next to the WASM bundle
//! - `state`: Reactive AppState with Dioxus Signals
//! - `components`: picker, toggles, D3 panes and notice boxes

pub mod js_bridge;
pub mod state;
pub mod components;
