//! Chart Composer: turns loaded series into a renderable chart description.
//!
//! The legend order is fixed so that switching basins or variables never
//! reshuffles it:
//!
//! 1. `Norm {V} range`: band between climate Q5 and Q95
//! 2. `Norm {V}`: climate Q50
//! 3. `Previous year {V}`: previous year's Q50, shifted onto this year
//! 4. `Current {V}`: observed Q50
//! 5. `Forecast {V}`: forecast Q50, dashed
//!
//! A series with no data is still emitted with an empty point list.

use casnow_basins::region::display_name_or_code;
use casnow_basins::Identifier;
use casnow_data::{ClimateRow, CurrentRow, CurrentSeries, Variable};
use casnow_utils::dates::format_date;
use serde::Serialize;

pub const NORM_COLOR: &str = "black";
pub const CURRENT_COLOR: &str = "red";
pub const PREVIOUS_COLOR: &str = "grey";
pub const BAND_ALPHA: f64 = 0.2;

/// How a series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    /// Filled area between `low` and `high`
    Band,
    /// Line through `value`
    Line,
}

/// One point of a series. Lines fill `value`, bands fill `low` and `high`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSpec {
    pub label: String,
    pub mark: Mark,
    pub color: String,
    pub alpha: f64,
    pub dashed: bool,
    pub points: Vec<ChartPoint>,
}

/// Everything D3 needs to draw the snow chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub title: String,
    pub x_axis_label: String,
    pub y_axis_label: String,
    pub variable: Variable,
    pub series: Vec<SeriesSpec>,
}

impl ChartSpec {
    pub fn series_labels(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.label.as_str()).collect()
    }

    pub fn series(&self, label: &str) -> Option<&SeriesSpec> {
        self.series.iter().find(|s| s.label == label)
    }
}

/// Chart title for a selection.
pub fn chart_title(variable: Variable, identifier: &Identifier, river_name: Option<&str>) -> String {
    match identifier {
        Identifier::Basin(code) => match river_name {
            Some(river) => format!(
                "{} situation for basin of river {} (gauge {})",
                variable, river, code
            ),
            None => format!("{} situation for basin at gauge {}", variable, code),
        },
        Identifier::Region(id) => format!(
            "{} situation for the {} basin",
            variable,
            display_name_or_code(id)
        ),
    }
}

fn line(label: String, color: &str, dashed: bool, rows: &[CurrentRow], variable: Variable) -> SeriesSpec {
    SeriesSpec {
        label,
        mark: Mark::Line,
        color: color.to_string(),
        alpha: 1.0,
        dashed,
        points: rows
            .iter()
            .filter_map(|row| {
                row.q50(variable).map(|value| ChartPoint {
                    date: format_date(&row.date),
                    value: Some(value),
                    low: None,
                    high: None,
                })
            })
            .collect(),
    }
}

/// Build the chart for `variable` of the selected basin or region.
///
/// `previous` is `None` when the previous-year file could not be read; the
/// legend entry is kept with no points.
pub fn compose(
    variable: Variable,
    identifier: &Identifier,
    river_name: Option<&str>,
    current: &CurrentSeries,
    previous: Option<&[CurrentRow]>,
    climate: &[ClimateRow],
) -> ChartSpec {
    let code = variable.code();

    let band = SeriesSpec {
        label: format!("Norm {} range", code),
        mark: Mark::Band,
        color: NORM_COLOR.to_string(),
        alpha: BAND_ALPHA,
        dashed: false,
        points: climate
            .iter()
            .filter_map(|row| {
                let q = row.quantiles(variable);
                match (q.q5, q.q95) {
                    (Some(low), Some(high)) => Some(ChartPoint {
                        date: format_date(&row.date),
                        value: None,
                        low: Some(low),
                        high: Some(high),
                    }),
                    _ => None,
                }
            })
            .collect(),
    };

    let norm = SeriesSpec {
        label: format!("Norm {}", code),
        mark: Mark::Line,
        color: NORM_COLOR.to_string(),
        alpha: 1.0,
        dashed: false,
        points: climate
            .iter()
            .filter_map(|row| {
                row.quantiles(variable).q50.map(|value| ChartPoint {
                    date: format_date(&row.date),
                    value: Some(value),
                    low: None,
                    high: None,
                })
            })
            .collect(),
    };

    let series = vec![
        band,
        norm,
        line(
            format!("Previous year {}", code),
            PREVIOUS_COLOR,
            false,
            previous.unwrap_or(&[]),
            variable,
        ),
        line(format!("Current {}", code), CURRENT_COLOR, false, &current.observed, variable),
        line(format!("Forecast {}", code), CURRENT_COLOR, true, &current.forecast, variable),
    ];

    ChartSpec {
        title: chart_title(variable, identifier, river_name),
        x_axis_label: "Date".to_string(),
        y_axis_label: variable.axis_label(),
        variable,
        series,
    }
}
