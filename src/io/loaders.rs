use log::warn;
use std::path::{Path, PathBuf};

use crate::core::domain::{StationCatalog, TripTable};
use crate::core::error::{PipelineError, PipelineResult};
use crate::io::data_config::DataConfig;
use crate::parsing::station_parser;
use crate::parsing::trip_parser;

/// On-disk encodings of the monthly ridership files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripEncoding {
    Csv,
    Parquet,
}

impl TripEncoding {
    pub fn extension(&self) -> &'static str {
        match self {
            TripEncoding::Csv => "csv",
            TripEncoding::Parquet => "parquet",
        }
    }
}

impl std::str::FromStr for TripEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(TripEncoding::Csv),
            "parquet" => Ok(TripEncoding::Parquet),
            other => Err(format!(
                "Unknown trip encoding: {}. Use 'csv' or 'parquet'",
                other
            )),
        }
    }
}

/// Loader for the station information document
pub struct StationLoader;

impl StationLoader {
    /// Load the station catalog from a station information JSON document
    pub fn load_catalog(path: &Path) -> PipelineResult<StationCatalog> {
        if !path.exists() {
            return Err(PipelineError::SourceNotFound(format!(
                "station file {}",
                path.display()
            )));
        }

        station_parser::parse_station_information(path)
            .map_err(|e| PipelineError::SchemaError(format!("{:#}", e)))
    }
}

/// Loader for the monthly ridership corpus rooted at a data directory.
///
/// The corpus tree holds one file per (month, year):
/// `{data_dir}/bikeshare-ridership-{year}/Bike share ridership {year}-{MM}.{ext}`
pub struct TripLoader {
    data_dir: PathBuf,
}

impl TripLoader {
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Construct a loader rooted at the configured corpus directory
    pub fn from_config(config: &DataConfig) -> Self {
        Self::new(config.data_dir())
    }

    /// Resolve the corpus path of one month's ridership file
    pub fn month_path(&self, month: u8, year: i32, encoding: TripEncoding) -> PipelineResult<PathBuf> {
        validate_month(month)?;

        Ok(self
            .data_dir
            .join(format!("bikeshare-ridership-{}", year))
            .join(format!(
                "Bike share ridership {}-{:02}.{}",
                year,
                month,
                encoding.extension()
            )))
    }

    /// Load a single month of trips.
    ///
    /// # Returns
    /// * `Err(InvalidArgument)` for a month outside 1-12
    /// * `Err(SourceNotFound)` when the file does not exist
    /// * `Err(SchemaError)` when the file exists but cannot be understood
    pub fn load_month(&self, month: u8, year: i32, encoding: TripEncoding) -> PipelineResult<TripTable> {
        let path = self.month_path(month, year, encoding)?;
        Self::load_file(&path, encoding)
    }

    /// Load one ridership file directly, bypassing corpus path resolution.
    /// Converted single-file corpora are read this way.
    pub fn load_file(path: &Path, encoding: TripEncoding) -> PipelineResult<TripTable> {
        if !path.exists() {
            return Err(PipelineError::SourceNotFound(path.display().to_string()));
        }

        let df = match encoding {
            TripEncoding::Csv => trip_parser::read_trip_csv(path),
            TripEncoding::Parquet => trip_parser::read_trip_parquet(path),
        }
        .map_err(|e| PipelineError::SchemaError(format!("{:#}", e)))?;

        trip_parser::dataframe_to_trips(&df)
            .map_err(|e| PipelineError::SchemaError(format!("{:#}", e)))
    }

    /// Load every month in an inclusive span, concatenating in calendar
    /// order. Months that fail to load for any reason are logged and
    /// skipped; the call fails only when nothing loaded at all.
    ///
    /// # Returns
    /// * `Err(InvalidArgument)` for an out-of-range month or an inverted span
    /// * `Err(NoDataAvailable)` when zero months loaded
    pub fn load_range(
        &self,
        start_month: u8,
        start_year: i32,
        end_month: u8,
        end_year: i32,
        encoding: TripEncoding,
    ) -> PipelineResult<TripTable> {
        validate_month(start_month)?;
        validate_month(end_month)?;

        if (end_year, end_month) < (start_year, start_month) {
            return Err(PipelineError::InvalidArgument(format!(
                "inverted span: {}-{:02} comes after {}-{:02}",
                start_year, start_month, end_year, end_month
            )));
        }

        let span = (end_month as i32 - start_month as i32 + 1) + 12 * (end_year - start_year);

        let mut combined = TripTable::new();
        let mut loaded = 0usize;

        for i in 0..span {
            let month_offset = (start_month as i32 - 1) + i;
            let month = (month_offset % 12 + 1) as u8;
            let year = start_year + month_offset / 12;

            match self.load_month(month, year, encoding) {
                Ok(table) => {
                    combined.extend(table);
                    loaded += 1;
                }
                Err(e) => warn!("Skipping {}-{:02}: {}", year, month, e),
            }
        }

        if loaded == 0 {
            return Err(PipelineError::NoDataAvailable(format!(
                "no ridership files loaded between {}-{:02} and {}-{:02}",
                start_year, start_month, end_year, end_month
            )));
        }

        Ok(combined)
    }

    /// Load the same calendar month across several years, with the same
    /// skip policy as [`TripLoader::load_range`]. Seasonal comparisons use
    /// this to align, say, every July in the corpus.
    pub fn load_years_for_month(
        &self,
        month: u8,
        years: &[i32],
        encoding: TripEncoding,
    ) -> PipelineResult<TripTable> {
        validate_month(month)?;

        let mut combined = TripTable::new();
        let mut loaded = 0usize;

        for &year in years {
            match self.load_month(month, year, encoding) {
                Ok(table) => {
                    combined.extend(table);
                    loaded += 1;
                }
                Err(e) => warn!("Skipping {}-{:02}: {}", year, month, e),
            }
        }

        if loaded == 0 {
            return Err(PipelineError::NoDataAvailable(format!(
                "no ridership files loaded for month {:02} in {:?}",
                month, years
            )));
        }

        Ok(combined)
    }
}

fn validate_month(month: u8) -> PipelineResult<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(PipelineError::InvalidArgument(format!(
            "month must be in 1-12, given {}",
            month
        )))
    }
}
