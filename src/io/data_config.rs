//! Data corpus configuration file support.
//!
//! This module provides utilities for reading the corpus description from
//! TOML configuration files: where the ridership tree and the station
//! document live, which encoding the monthly files use, and the span of
//! months the corpus covers.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::error::{PipelineError, PipelineResult};
use crate::io::loaders::TripEncoding;

/// Corpus configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default)]
    pub corpus: CorpusSettings,
    #[serde(default)]
    pub span: SpanSettings,
}

/// Corpus location settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusSettings {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_stations_file")]
    pub stations_file: String,
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

/// Month span covered by the corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanSettings {
    #[serde(default = "default_month")]
    pub first_month: u8,
    #[serde(default)]
    pub first_year: i32,
    #[serde(default = "default_month")]
    pub last_month: u8,
    #[serde(default)]
    pub last_year: i32,
    #[serde(default)]
    pub available_years: Vec<i32>,
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_stations_file() -> String {
    "data/station_information.json".to_string()
}

fn default_encoding() -> String {
    "csv".to_string()
}

fn default_month() -> u8 {
    1
}

impl Default for CorpusSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            stations_file: default_stations_file(),
            encoding: default_encoding(),
        }
    }
}

impl Default for SpanSettings {
    fn default() -> Self {
        Self {
            first_month: default_month(),
            first_year: 0,
            last_month: default_month(),
            last_year: 0,
            available_years: Vec::new(),
        }
    }
}

impl DataConfig {
    /// Load corpus configuration from a TOML file.
    ///
    /// # Returns
    /// * `Ok(DataConfig)` if successful
    /// * `Err(PipelineError::ConfigError)` if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> PipelineResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            PipelineError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        let config: DataConfig = toml::from_str(&content).map_err(|e| {
            PipelineError::ConfigError(format!("Failed to parse config file: {}", e))
        })?;

        Ok(config)
    }

    /// Load corpus configuration from the default location.
    ///
    /// Searches for `bikeshare.toml` in:
    /// 1. Current directory
    /// 2. `data/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> PipelineResult<Self> {
        let search_paths = vec![
            PathBuf::from("bikeshare.toml"),
            PathBuf::from("data/bikeshare.toml"),
            PathBuf::from("../bikeshare.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(PipelineError::ConfigError(
            "No bikeshare.toml found in standard locations".to_string(),
        ))
    }

    /// Root of the ridership corpus tree.
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.corpus.data_dir)
    }

    /// Path of the station information document.
    pub fn stations_path(&self) -> PathBuf {
        PathBuf::from(&self.corpus.stations_file)
    }

    /// Parse the configured encoding of the monthly files.
    pub fn trip_encoding(&self) -> PipelineResult<TripEncoding> {
        TripEncoding::from_str(&self.corpus.encoding)
            .map_err(PipelineError::ConfigError)
    }

    /// The configured month span, validated.
    pub fn load_span(&self) -> PipelineResult<(u8, i32, u8, i32)> {
        for month in [self.span.first_month, self.span.last_month] {
            if !(1..=12).contains(&month) {
                return Err(PipelineError::ConfigError(format!(
                    "span months must be in 1-12, given {}",
                    month
                )));
            }
        }

        Ok((
            self.span.first_month,
            self.span.first_year,
            self.span.last_month,
            self.span.last_year,
        ))
    }
}
