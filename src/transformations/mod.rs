//! Trip record sanitization.
//!
//! This module filters loaded trip tables down to records the aggregator
//! can trust: plausible ride durations and endpoints that exist in the
//! station catalog.
//!
//! # Example
//!
//! ```
//! use bikeshare_flow::core::domain::{StationCatalog, TripTable};
//! use bikeshare_flow::transformations::sanitize;
//!
//! let catalog = StationCatalog::default();
//! let trips = TripTable::new();
//!
//! let clean = sanitize(&trips, &catalog);
//! assert!(clean.is_empty());
//! ```

pub mod sanitize;

pub use sanitize::{is_valid_trip, sanitize};
