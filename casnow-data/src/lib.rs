//! Snow time series for the Central Asia dashboard.
//!
//! This crate handles reading the per-basin flat files produced by the
//! snow model into typed series, and the batch job that summarizes the
//! latest value of every basin against its climate band.

pub mod aggregate;
pub mod loader;
pub mod series;

pub use loader::{DirectorySource, MemorySource, SeriesKind, SeriesSource, TimeSeriesLoader};
pub use series::{ClimateRow, CurrentRow, CurrentSeries, Quantiles, Variable};
