//! Parsers for bikeshare data formats.
//!
//! This module provides parsers for the two input formats the pipeline
//! consumes, plus the frame/record conversions the loaders build on.
//!
//! # Parsers
//!
//! - [`station_parser`]: Parse the station information JSON document
//! - [`trip_parser`]: Read and normalize monthly ridership files
//!
//! # Example
//!
//! ```no_run
//! use bikeshare_flow::parsing::station_parser::parse_station_information;
//! use std::path::Path;
//!
//! let catalog = parse_station_information(Path::new("station_information.json"))
//!     .expect("Failed to parse station document");
//! ```

pub mod station_parser;
pub mod trip_parser;
