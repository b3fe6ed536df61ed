//! Layout blocks around the D3 output: section headers, the panes D3 draws
//! into, and the boxes shown when there is nothing to draw.

use dioxus::prelude::*;

/// Title over a pane, with an optional line of explanation.
#[component]
pub fn SectionHeader(title: String, description: Option<String>) -> Element {
    rsx! {
        div {
            style: "margin-bottom: 8px;",
            h3 { style: "margin: 0 0 4px 0; font-size: 16px;", "{title}" }
            if let Some(description) = description {
                p { style: "margin: 0; font-size: 12px; color: #666;", "{description}" }
            }
        }
    }
}

/// Empty div with a fixed DOM id that the D3 scripts render into.
///
/// A non-empty `busy` overlays a status line while the pane's data is in
/// flight.
#[component]
pub fn D3Pane(
    id: String,
    #[props(default = 400)] min_height: u32,
    #[props(default)] busy: String,
) -> Element {
    rsx! {
        div {
            style: "min-height: {min_height}px; position: relative; width: 100%;",
            if !busy.is_empty() {
                div {
                    style: "position: absolute; top: 50%; left: 50%; transform: translate(-50%, -50%); color: #666;",
                    "{busy}"
                }
            }
            div { id: "{id}", style: "width: 100%;" }
        }
    }
}

/// Flavor of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Startup failed; replaces the whole dashboard
    Fatal,
    /// Prompt or per-click diagnostic; replaces the chart
    Chart,
    /// Startup in progress
    Loading,
}

impl NoticeKind {
    fn style(&self) -> &'static str {
        match self {
            NoticeKind::Fatal => "padding: 12px 16px; margin: 8px 0; background: #FFEBEE; color: #C62828; border-radius: 4px; border: 1px solid #EF9A9A;",
            NoticeKind::Chart => "padding: 24px 16px; margin: 8px 0; background: #FAFAFA; color: #333; border-radius: 4px; border: 1px solid #E0E0E0; white-space: pre-wrap; font-weight: bold;",
            NoticeKind::Loading => "display: flex; justify-content: center; align-items: center; padding: 40px; color: #666;",
        }
    }
}

/// A block of text standing in for content that could not be drawn.
#[component]
pub fn Notice(kind: NoticeKind, message: String) -> Element {
    rsx! {
        div {
            style: kind.style(),
            if kind == NoticeKind::Fatal {
                strong { "Error: " }
            }
            "{message}"
        }
    }
}
