//! Shared utility functions for the snow dashboard crates.

/// Date utility functions
pub mod dates {
    use chrono::{Months, NaiveDate, NaiveDateTime};

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Parse a date column value.
    ///
    /// Series files carry plain `YYYY-MM-DD` dates, but some exports keep a
    /// time component (`YYYY-MM-DD HH:MM:SS` or ISO `T` separator); the time
    /// part is dropped.
    pub fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
        let s = s.trim();
        match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            Ok(date) => Ok(date),
            Err(date_err) => NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
                .map(|dt| dt.date())
                .map_err(|_| date_err),
        }
    }

    /// Shift a date forward by exactly one calendar year.
    ///
    /// Feb 29 maps onto Feb 28 of the following (non-leap) year.
    pub fn shift_one_year(date: &NaiveDate) -> NaiveDate {
        date.checked_add_months(Months::new(12)).unwrap_or(*date)
    }

}

/// Error types
pub mod error {
    use thiserror::Error;

    /// Failure taxonomy shared by the loader, locator and view crates.
    ///
    /// `DataLoad` is fatal for the geometry file at startup and recoverable
    /// (rendered as a message) for per-basin series. `LookupMiss` and
    /// `Projection` never escape a user interaction.
    #[derive(Error, Debug)]
    pub enum DashboardError {
        /// Missing, unreadable or malformed input file
        #[error("Failed to load {path}: {reason}")]
        DataLoad { path: String, reason: String },

        /// A click or code resolved to nothing
        #[error("Lookup miss: {0}")]
        LookupMiss(String),

        /// Coordinates could not be reprojected
        #[error("Projection failed: {0}")]
        Projection(String),

        #[error("I/O error: {0}")]
        Io(#[from] std::io::Error),

        #[error("Failed to parse CSV: {0}")]
        Csv(#[from] csv::Error),
    }

    impl DashboardError {
        /// Build a `DataLoad` error for `path`.
        pub fn data_load(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
            DashboardError::DataLoad {
                path: path.into(),
                reason: reason.to_string(),
            }
        }

        /// Whether this error belongs to the data-loading family.
        pub fn is_data_load(&self) -> bool {
            matches!(
                self,
                DashboardError::DataLoad { .. }
                    | DashboardError::Io(_)
                    | DashboardError::Csv(_)
            )
        }
    }

    /// Type alias for Results using DashboardError
    pub type Result<T> = std::result::Result<T, DashboardError>;

    /// Shown whenever there is nothing to chart.
    pub const CLICK_PROMPT: &str = "Please click on a basin.";

    /// Text shown in place of a chart when `context` failed with `err`.
    pub fn user_message(context: &str, err: &dyn std::fmt::Display) -> String {
        format!("Error in {}: \n   {}\n\n{}", context, err, CLICK_PROMPT)
    }

}
