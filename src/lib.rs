//! Bikeshare trip-flow aggregation pipeline.
//!
//! Loads monthly ridership files and the station information document,
//! sanitizes the trip records, indexes them by time, and computes
//! per-station source/sink flow statistics over caller-selected calendar
//! windows.

pub mod core;
pub mod parsing;
pub mod time;
pub mod transformations;
pub mod io;
pub mod services;
