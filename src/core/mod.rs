//! Core domain models for trip-flow aggregation.
//!
//! This module defines the fundamental data structures used throughout the
//! pipeline, representing stations, trips, and the error taxonomy shared by
//! every stage.

pub mod domain;
pub mod error;

pub use domain::{
    BikeModel, PhysicalConfiguration, Station, StationCatalog, StationSite, TripRecord, TripTable,
    UserType, MAX_TRIP_DURATION_SECS, MIN_TRIP_DURATION_SECS, UNKNOWN_STATION_ID,
};
pub use error::{PipelineError, PipelineResult};
