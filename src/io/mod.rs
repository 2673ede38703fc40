//! High-level data loading utilities.
//!
//! This module provides loaders that combine parsing logic with domain
//! model construction, plus the corpus configuration file. The loaders
//! resolve corpus paths, map parse failures into the pipeline error
//! taxonomy, and produce ready-to-use data structures.
//!
//! # Example
//!
//! ```no_run
//! use bikeshare_flow::io::loaders::{TripEncoding, TripLoader};
//!
//! let loader = TripLoader::new("data");
//! let trips = loader
//!     .load_range(5, 2024, 9, 2024, TripEncoding::Csv)
//!     .expect("Failed to load ridership span");
//! println!("Loaded {} trips", trips.len());
//! ```

pub mod data_config;
pub mod loaders;


pub use data_config::DataConfig;
pub use loaders::{StationLoader, TripEncoding, TripLoader};
