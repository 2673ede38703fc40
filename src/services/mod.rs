//! Aggregation services over sanitized trip tables.
//!
//! This module contains the query layer that sits on top of the loaded,
//! sanitized data: per-station flow aggregation under a caller-supplied
//! predicate, and the departure-time usage profiles.

pub mod flow;
pub mod usage;

pub use flow::{compute_flow, net_flow, FlowPredicate, FlowRow, FlowTable};
pub use usage::{hourly_departure_profile, hourly_departures_for_weekday};
