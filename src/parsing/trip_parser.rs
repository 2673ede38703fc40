use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use polars::prelude::*;
use std::path::Path;

use crate::core::domain::{BikeModel, TripRecord, TripTable, UserType, UNKNOWN_STATION_ID};

/// Timestamp spellings seen across the ridership exports. Older files use
/// the slash forms, converted files carry ISO strings.
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parse a monthly ridership CSV into a normalized Polars DataFrame
pub fn read_trip_csv(csv_path: &Path) -> Result<DataFrame> {
    // Legacy exports are not valid UTF-8; the only non-ASCII bytes live in
    // the station name columns, which normalization drops anyway.
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_encoding(CsvEncoding::LossyUtf8))
        .try_into_reader_with_file_path(Some(csv_path.into()))?
        .finish()
        .context("Failed to parse CSV into DataFrame")?;

    normalize_trip_frame(df)
}

/// Read a monthly ridership parquet file. The frame comes back verbatim;
/// converted files already carry the normalized schema.
pub fn read_trip_parquet(parquet_path: &Path) -> Result<DataFrame> {
    let file = std::fs::File::open(parquet_path)
        .with_context(|| format!("Failed to open parquet file: {}", parquet_path.display()))?;

    ParquetReader::new(file)
        .finish()
        .context("Failed to parse parquet into DataFrame")
}

/// Write a trip table as a parquet file with the normalized schema
pub fn write_trip_parquet(parquet_path: &Path, table: &TripTable) -> Result<()> {
    let mut df = trips_to_dataframe(table)?;

    let file = std::fs::File::create(parquet_path)
        .with_context(|| format!("Failed to create parquet file: {}", parquet_path.display()))?;

    ParquetWriter::new(file)
        .finish(&mut df)
        .context("Failed to write parquet file")?;

    Ok(())
}

/// Normalize a raw ridership frame in place:
/// - relabel the first column `Trip Id` (the legacy encoding mangles it),
/// - drop the station name columns,
/// - synthesize a `Model` column for exports that predate it,
/// - cast the numeric columns to u32, filling missing duration, station id
///   and bike id cells with sentinel `0`.
pub fn normalize_trip_frame(mut df: DataFrame) -> Result<DataFrame> {
    let first_column = df.get_column_names().first().map(|s| s.to_string());
    if let Some(name) = first_column {
        if name != "Trip Id" {
            df.rename(&name, "Trip Id".into())
                .context("Failed to relabel the trip id column")?;
        }
    }

    for name in ["Start Station Name", "End Station Name"] {
        if df.get_column_names().iter().any(|s| s.as_str() == name) {
            df = df.drop(name)?;
        }
    }

    if !df.get_column_names().iter().any(|s| s.as_str() == "Model") {
        let model = Series::new("Model".into(), vec!["NULL"; df.height()]);
        df.with_column(model)
            .context("Failed to synthesize the Model column")?;
    }

    let column_names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut lazy_df = df.lazy();

    // Trip Id gets no sentinel fill; a null here is a per-row error at
    // conversion time.
    lazy_df = lazy_df.with_column(col("Trip Id").cast(DataType::UInt32));

    // "Trip  Duration" carries a double space in the real headers
    let sentinel_columns = [
        "Trip  Duration",
        "Start Station Id",
        "End Station Id",
        "Bike Id",
    ];

    for col_name in sentinel_columns {
        if column_names.contains(&col_name.to_string()) {
            lazy_df = lazy_df.with_column(
                col(col_name)
                    .cast(DataType::UInt32)
                    .fill_null(lit(0u32))
                    .alias(col_name),
            );
        }
    }

    lazy_df
        .collect()
        .context("Failed to cast trip columns to expected types")
}

/// Convert a normalized ridership frame to trip records.
///
/// Rows whose timestamps are null or unparseable are dropped with a single
/// warning per frame; missing station id, duration or bike id cells fall
/// back to the `0` sentinel and are culled downstream by sanitization.
pub fn dataframe_to_trips(df: &DataFrame) -> Result<TripTable> {
    let height = df.height();

    let trip_ids = u32_values(df, "Trip Id")?;
    let durations = u32_values(df, "Trip  Duration")?;
    let start_ids = u32_values(df, "Start Station Id")?;
    let end_ids = u32_values(df, "End Station Id")?;
    let bike_ids = u32_values(df, "Bike Id")?;

    let start_times =
        timestamp_values(df.column("Start Time").context("Missing required column 'Start Time'")?)?;
    let end_times =
        timestamp_values(df.column("End Time").context("Missing required column 'End Time'")?)?;

    let user_types = df.column("User Type").ok().and_then(|c| c.str().ok());
    let models = df.column("Model").ok().and_then(|c| c.str().ok());

    let mut records = Vec::with_capacity(height);
    let mut dropped = 0usize;

    for i in 0..height {
        let trip_id = trip_ids[i].with_context(|| format!("Missing Trip Id at row {}", i))?;

        let (start_time, end_time) = match (start_times[i], end_times[i]) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                dropped += 1;
                continue;
            }
        };

        records.push(TripRecord {
            trip_id,
            start_time,
            end_time,
            start_station_id: start_ids[i].unwrap_or(UNKNOWN_STATION_ID),
            end_station_id: end_ids[i].unwrap_or(UNKNOWN_STATION_ID),
            duration_secs: durations[i].unwrap_or(0),
            bike_id: bike_ids[i].unwrap_or(0),
            user_type: user_types
                .and_then(|col| col.get(i))
                .map(UserType::from_label)
                .unwrap_or(UserType::Unknown),
            model: models
                .and_then(|col| col.get(i))
                .map(BikeModel::from_label)
                .unwrap_or(BikeModel::Unknown),
        });
    }

    if dropped > 0 {
        log::warn!(
            "Dropped {} of {} trip rows with missing or unparseable timestamps",
            dropped,
            height
        );
    }

    Ok(TripTable::from_records(records))
}

/// Convert trip records to a Polars DataFrame with the normalized schema
pub fn trips_to_dataframe(table: &TripTable) -> Result<DataFrame> {
    let n = table.len();

    let mut trip_ids = Vec::with_capacity(n);
    let mut durations = Vec::with_capacity(n);
    let mut start_ids = Vec::with_capacity(n);
    let mut end_ids = Vec::with_capacity(n);
    let mut bike_ids = Vec::with_capacity(n);
    let mut start_times = Vec::with_capacity(n);
    let mut end_times = Vec::with_capacity(n);
    let mut user_types = Vec::with_capacity(n);
    let mut models = Vec::with_capacity(n);

    for record in table.iter() {
        trip_ids.push(record.trip_id);
        durations.push(record.duration_secs);
        start_ids.push(record.start_station_id);
        end_ids.push(record.end_station_id);
        bike_ids.push(record.bike_id);
        start_times.push(record.start_time.and_utc().timestamp_micros());
        end_times.push(record.end_time.and_utc().timestamp_micros());
        user_types.push(record.user_type.as_str());
        models.push(record.model.as_str());
    }

    let start_time_series = Int64Chunked::from_vec("Start Time".into(), start_times)
        .into_datetime(TimeUnit::Microseconds, None)
        .into_series();

    let end_time_series = Int64Chunked::from_vec("End Time".into(), end_times)
        .into_datetime(TimeUnit::Microseconds, None)
        .into_series();

    let df = df!(
        "Trip Id" => trip_ids,
        "Trip  Duration" => durations,
        "Start Station Id" => start_ids,
        "Start Time" => start_time_series,
        "End Station Id" => end_ids,
        "End Time" => end_time_series,
        "Bike Id" => bike_ids,
        "User Type" => user_types,
        "Model" => models,
    )?;

    Ok(df)
}

/// Extract a column as u32 values, casting from whatever dtype inference
/// produced. Cells that cannot be represented come back as None.
fn u32_values(df: &DataFrame, name: &str) -> Result<Vec<Option<u32>>> {
    let column = df
        .column(name)
        .with_context(|| format!("Missing required column '{}'", name))?
        .cast(&DataType::UInt32)
        .with_context(|| format!("Column '{}' cannot be read as u32", name))?;

    Ok(column.u32()?.into_iter().collect())
}

/// Extract a timestamp column as naive datetimes. String columns are parsed
/// against the known export formats; native datetime columns are converted
/// from their physical representation.
fn timestamp_values(column: &Column) -> Result<Vec<Option<NaiveDateTime>>> {
    match column.dtype() {
        DataType::String => {
            let values = column.str()?;
            Ok((0..values.len())
                .map(|i| values.get(i).and_then(parse_trip_timestamp))
                .collect())
        }
        DataType::Datetime(time_unit, _) => {
            let unit = *time_unit;
            let physical = column.cast(&DataType::Int64)?;
            let values = physical.i64()?;
            Ok(values
                .into_iter()
                .map(|opt| opt.and_then(|v| timestamp_from_physical(v, unit)))
                .collect())
        }
        other => anyhow::bail!(
            "Column '{}' has unsupported dtype {:?} for timestamps",
            column.name(),
            other
        ),
    }
}

fn parse_trip_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
}

fn timestamp_from_physical(value: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    match unit {
        TimeUnit::Nanoseconds => Some(chrono::DateTime::from_timestamp_nanos(value).naive_utc()),
        TimeUnit::Microseconds => {
            chrono::DateTime::from_timestamp_micros(value).map(|dt| dt.naive_utc())
        }
        TimeUnit::Milliseconds => {
            chrono::DateTime::from_timestamp_millis(value).map(|dt| dt.naive_utc())
        }
    }
}
