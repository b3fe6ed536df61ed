//! Typed rows of the current, previous-year and climate series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The snow variables tracked per basin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Variable {
    /// Snow water equivalent, mm
    #[default]
    Swe,
    /// Snow depth, m
    Hs,
    /// Runoff, mm
    Rof,
}

impl Variable {
    pub const ALL: [Variable; 3] = [Variable::Swe, Variable::Hs, Variable::Rof];

    /// Column suffix and legend abbreviation.
    pub fn code(&self) -> &'static str {
        match self {
            Variable::Swe => "SWE",
            Variable::Hs => "HS",
            Variable::Rof => "ROF",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Variable::Swe => "mm",
            Variable::Hs => "m",
            Variable::Rof => "mm",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Variable::Swe => "Snow water equivalent",
            Variable::Hs => "Snow depth",
            Variable::Rof => "Runoff",
        }
    }

    /// Y-axis label, e.g. "HS (m)".
    pub fn axis_label(&self) -> String {
        format!("{} ({})", self.code(), self.unit())
    }

    /// Column name for a percentile of this variable, e.g. "Q95_SWE".
    pub fn column(&self, percentile: u8) -> String {
        format!("Q{}_{}", percentile, self.code())
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Variable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SWE" => Ok(Variable::Swe),
            "HS" => Ok(Variable::Hs),
            "ROF" => Ok(Variable::Rof),
            other => Err(format!("unknown variable `{}`", other)),
        }
    }
}

/// Q5/Q50/Q95 of one variable on one date. Missing columns are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Quantiles {
    pub q5: Option<f64>,
    pub q50: Option<f64>,
    pub q95: Option<f64>,
}

/// One row of a `_current` or `_previous` file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentRow {
    pub date: NaiveDate,
    /// True when the row is a model forecast rather than an observation
    pub forecast: bool,
    pub swe: Option<f64>,
    pub hs: Option<f64>,
    pub rof: Option<f64>,
}

impl CurrentRow {
    /// Median value of `variable` on this date.
    pub fn q50(&self, variable: Variable) -> Option<f64> {
        match variable {
            Variable::Swe => self.swe,
            Variable::Hs => self.hs,
            Variable::Rof => self.rof,
        }
    }
}

/// One row of a `_climate` file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimateRow {
    pub date: NaiveDate,
    pub swe: Quantiles,
    pub hs: Quantiles,
    pub rof: Quantiles,
}

impl ClimateRow {
    pub fn quantiles(&self, variable: Variable) -> &Quantiles {
        match variable {
            Variable::Swe => &self.swe,
            Variable::Hs => &self.hs,
            Variable::Rof => &self.rof,
        }
    }
}

/// Current-year series split on the forecast flag.
///
/// Every input row lands in exactly one of the two halves, in file order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CurrentSeries {
    pub observed: Vec<CurrentRow>,
    pub forecast: Vec<CurrentRow>,
}

impl CurrentSeries {
    pub fn partition(rows: Vec<CurrentRow>) -> Self {
        let (forecast, observed): (Vec<_>, Vec<_>) = rows.into_iter().partition(|r| r.forecast);
        Self { observed, forecast }
    }

    pub fn len(&self) -> usize {
        self.observed.len() + self.forecast.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Latest observed row, if any.
    pub fn last_observed(&self) -> Option<&CurrentRow> {
        self.observed.last()
    }
}
