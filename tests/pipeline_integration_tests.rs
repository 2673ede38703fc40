//! Integration tests for the corpus-to-flow pipeline.
//!
//! Each test builds a real ridership corpus on disk (station document plus
//! monthly CSV files under `bikeshare-ridership-{year}/`), then drives the
//! loaders, the sanitizer, the time index and the flow aggregator end to
//! end, the same way a dashboard backend would.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveTime};
use tempfile::TempDir;

use bikeshare_flow::core::{PipelineError, StationCatalog};
use bikeshare_flow::io::{DataConfig, StationLoader, TripEncoding, TripLoader};
use bikeshare_flow::parsing::trip_parser;
use bikeshare_flow::services::{
    compute_flow, hourly_departure_profile, hourly_departures_for_weekday, net_flow, FlowPredicate,
};
use bikeshare_flow::time::TimeIndex;
use bikeshare_flow::transformations::sanitize;

const STATION_DOCUMENT: &str = r#"{
    "data": {
        "stations": [
            { "station_id": "7000", "lat": 43.6532, "lon": -79.3832, "capacity": 20 },
            { "station_id": "7001", "lat": 43.6677, "lon": -79.3948, "capacity": 15 },
            { "station_id": "7002", "lat": 43.6452, "lon": -79.3806, "capacity": 31 }
        ]
    }
}"#;

fn write_station_document(dir: &Path) -> PathBuf {
    let path = dir.join("station_information.json");
    std::fs::write(&path, STATION_DOCUMENT).unwrap();
    path
}

fn load_catalog(dir: &Path) -> StationCatalog {
    let path = write_station_document(dir);
    StationLoader::load_catalog(&path).unwrap()
}

fn write_month_csv(data_dir: &Path, year: i32, month: u8, rows: &[&str]) {
    let dir = data_dir.join(format!("bikeshare-ridership-{}", year));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("Bike share ridership {}-{:02}.csv", year, month));

    let mut content = String::from(
        "Trip Id,Trip  Duration,Start Station Id,Start Time,End Station Id,End Time,Bike Id,User Type,Model\n",
    );
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    std::fs::write(&path, content).unwrap();
}

/// Two clean December trips. 2023-12-04 is a Monday, 2023-12-09 a Saturday.
fn write_december(data_dir: &Path) {
    write_month_csv(
        data_dir,
        2023,
        12,
        &[
            "1,600,7000,12/04/2023 08:10,7001,12/04/2023 08:20,101,Annual Member,ICONIC",
            "2,900,7001,12/09/2023 17:45,7000,12/09/2023 18:00,102,Casual Member,EFIT",
        ],
    );
}

/// Two clean January trips plus two that sanitization drops: trip 5 ends at
/// a station missing from the catalog, trip 6 lasts under a minute.
/// 2024-01-08 is a Monday, 2024-01-10 a Wednesday.
fn write_january(data_dir: &Path) {
    write_month_csv(
        data_dir,
        2024,
        1,
        &[
            "3,1200,7000,01/08/2024 09:00,7002,01/08/2024 09:20,103,Annual Member,ICONIC",
            "4,2400,7002,01/10/2024 23:30,7001,01/11/2024 00:10,104,Casual Member,EFIT G5",
            "5,300,7000,01/12/2024 10:00,9999,01/12/2024 10:05,105,Annual Member,ICONIC",
            "6,30,7001,01/13/2024 11:00,7000,01/13/2024 11:00,106,Casual Member,ICONIC",
        ],
    );
}

#[test]
fn test_corpus_to_flow_pipeline() {
    let dir = TempDir::new().unwrap();
    let catalog = load_catalog(dir.path());
    write_december(dir.path());
    write_january(dir.path());

    let loader = TripLoader::new(dir.path());
    let raw = loader
        .load_range(12, 2023, 1, 2024, TripEncoding::Csv)
        .unwrap();
    assert_eq!(raw.len(), 6);

    let clean = sanitize(&raw, &catalog);
    assert_eq!(clean.len(), 4);

    let index = TimeIndex::over_start_times(&clean);
    let flow = compute_flow(&clean, &index, &catalog, &FlowPredicate::default());

    let ids: Vec<u32> = flow.rows().iter().map(|r| r.station_id).collect();
    assert_eq!(ids, vec![7000, 7001, 7002]);

    let row_7000 = flow.get(7000).unwrap();
    assert_eq!(row_7000.source_count, 2);
    assert_eq!(row_7000.sink_count, 1);
    assert_eq!(row_7000.lat, 43.6532);
    assert_eq!(row_7000.capacity, 20);

    let row_7001 = flow.get(7001).unwrap();
    assert_eq!(row_7001.source_count, 1);
    assert_eq!(row_7001.sink_count, 2);

    let row_7002 = flow.get(7002).unwrap();
    assert_eq!(row_7002.source_count, 1);
    assert_eq!(row_7002.sink_count, 1);

    let net = net_flow(&flow);
    assert!((net[0] - 1.0 / 3.0).abs() < 1e-12);
    assert!((net[1] + 1.0 / 3.0).abs() < 1e-12);
    assert!(net[2].abs() < 1e-12);
}

#[test]
fn test_morning_window_matches_monday_filter() {
    let dir = TempDir::new().unwrap();
    let catalog = load_catalog(dir.path());
    write_december(dir.path());
    write_january(dir.path());

    let loader = TripLoader::new(dir.path());
    let raw = loader
        .load_range(12, 2023, 1, 2024, TripEncoding::Csv)
        .unwrap();
    let clean = sanitize(&raw, &catalog);
    let index = TimeIndex::over_start_times(&clean);

    // Only trips 1 (Mon 08:10) and 3 (Mon 09:00) start between 08:00 and
    // 10:00, and those happen to be exactly the Monday departures.
    let morning = FlowPredicate {
        time_range: Some((
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        )),
        ..FlowPredicate::default()
    };
    let mondays = FlowPredicate {
        days_of_week: vec![0],
        ..FlowPredicate::default()
    };

    let morning_flow = compute_flow(&clean, &index, &catalog, &morning);
    let monday_flow = compute_flow(&clean, &index, &catalog, &mondays);
    assert_eq!(morning_flow, monday_flow);

    let row_7000 = morning_flow.get(7000).unwrap();
    assert_eq!(row_7000.source_count, 2);
    assert_eq!(row_7000.sink_count, 0);

    let net = net_flow(&morning_flow);
    assert_eq!(net, vec![1.0, -1.0, -1.0]);
}

#[test]
fn test_calendar_filters_partition_the_span() {
    let dir = TempDir::new().unwrap();
    let catalog = load_catalog(dir.path());
    write_december(dir.path());
    write_january(dir.path());

    let loader = TripLoader::new(dir.path());
    let raw = loader
        .load_range(12, 2023, 1, 2024, TripEncoding::Csv)
        .unwrap();
    let clean = sanitize(&raw, &catalog);
    let index = TimeIndex::over_start_times(&clean);

    let december = FlowPredicate {
        months: vec![12],
        ..FlowPredicate::default()
    };
    let flow = compute_flow(&clean, &index, &catalog, &december);
    assert_eq!(flow.len(), 2);
    assert_eq!(flow.get(7000).unwrap().source_count, 1);
    assert_eq!(flow.get(7000).unwrap().sink_count, 1);
    assert!(flow.get(7002).is_none());
    assert_eq!(net_flow(&flow), vec![0.0, 0.0]);

    let next_year = FlowPredicate {
        years: vec![2024],
        ..FlowPredicate::default()
    };
    let flow = compute_flow(&clean, &index, &catalog, &next_year);
    assert_eq!(flow.get(7000).unwrap().source_count, 1);
    assert_eq!(flow.get(7000).unwrap().sink_count, 0);
    assert_eq!(flow.get(7001).unwrap().sink_count, 1);
    assert_eq!(flow.get(7002).unwrap().source_count, 1);
    assert_eq!(flow.get(7002).unwrap().sink_count, 1);
}

#[test]
fn test_date_range_flow_across_year_boundary() {
    let dir = TempDir::new().unwrap();
    let catalog = load_catalog(dir.path());
    write_december(dir.path());
    write_january(dir.path());

    let loader = TripLoader::new(dir.path());
    let raw = loader
        .load_range(12, 2023, 1, 2024, TripEncoding::Csv)
        .unwrap();
    let clean = sanitize(&raw, &catalog);
    let index = TimeIndex::over_start_times(&clean);

    // Dec 9 through Jan 8, both ends inclusive, keeps trips 2 and 3.
    // No combination of month and year sets selects this span.
    let span = FlowPredicate {
        date_range: Some((
            NaiveDate::from_ymd_opt(2023, 12, 9).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
        )),
        ..FlowPredicate::default()
    };
    let flow = compute_flow(&clean, &index, &catalog, &span);

    assert_eq!(flow.len(), 3);
    assert_eq!(flow.get(7000).unwrap().source_count, 1);
    assert_eq!(flow.get(7000).unwrap().sink_count, 1);
    assert_eq!(flow.get(7001).unwrap().source_count, 1);
    assert_eq!(flow.get(7002).unwrap().sink_count, 1);
    assert_eq!(net_flow(&flow), vec![0.0, 1.0, -1.0]);

    // Narrowing the same span to evening departures leaves only trip 2
    let evening_span = FlowPredicate {
        time_range: Some((
            NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        )),
        ..span
    };
    let flow = compute_flow(&clean, &index, &catalog, &evening_span);

    assert_eq!(flow.len(), 2);
    assert_eq!(flow.get(7001).unwrap().source_count, 1);
    assert_eq!(flow.get(7001).unwrap().lat, 43.6677);
    assert_eq!(flow.get(7000).unwrap().sink_count, 1);
}

#[test]
fn test_load_range_skips_missing_months() {
    let dir = TempDir::new().unwrap();
    write_month_csv(
        dir.path(),
        2023,
        11,
        &["10,700,7000,11/06/2023 12:00,7001,11/06/2023 12:11,110,Annual Member,ICONIC"],
    );
    // December is absent from the corpus on purpose.
    write_january(dir.path());

    let loader = TripLoader::new(dir.path());
    let table = loader
        .load_range(11, 2023, 1, 2024, TripEncoding::Csv)
        .unwrap();

    assert_eq!(table.len(), 5);
    assert_eq!(table.records()[0].trip_id, 10);
    assert_eq!(table.records()[1].trip_id, 3);
}

#[test]
fn test_error_taxonomy_end_to_end() {
    let dir = TempDir::new().unwrap();
    let loader = TripLoader::new(dir.path());

    let err = loader.load_month(5, 2024, TripEncoding::Csv).unwrap_err();
    assert!(matches!(err, PipelineError::SourceNotFound(_)));

    let err = loader
        .load_range(3, 2024, 4, 2024, TripEncoding::Csv)
        .unwrap_err();
    assert!(matches!(err, PipelineError::NoDataAvailable(_)));

    let err = loader
        .load_range(4, 2024, 3, 2024, TripEncoding::Csv)
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidArgument(_)));

    let err = loader.load_month(13, 2024, TripEncoding::Csv).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidArgument(_)));

    let err = StationLoader::load_catalog(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, PipelineError::SourceNotFound(_)));

    let malformed = dir.path().join("broken.json");
    std::fs::write(&malformed, r#"{"data": {}}"#).unwrap();
    let err = StationLoader::load_catalog(&malformed).unwrap_err();
    assert!(matches!(err, PipelineError::SchemaError(_)));
}

#[test]
fn test_config_driven_pipeline() {
    let dir = TempDir::new().unwrap();
    let stations_path = write_station_document(dir.path());
    write_december(dir.path());
    write_january(dir.path());

    let config_path = dir.path().join("bikeshare.toml");
    let config_text = format!(
        r#"
[corpus]
data_dir = "{data}"
stations_file = "{stations}"
encoding = "csv"

[span]
first_month = 12
first_year = 2023
last_month = 1
last_year = 2024
available_years = [2023, 2024]
"#,
        data = dir.path().display(),
        stations = stations_path.display(),
    );
    std::fs::write(&config_path, config_text).unwrap();

    let config = DataConfig::from_file(&config_path).unwrap();
    let encoding = config.trip_encoding().unwrap();
    assert_eq!(encoding, TripEncoding::Csv);

    let catalog = StationLoader::load_catalog(&config.stations_path()).unwrap();
    let loader = TripLoader::from_config(&config);

    let (first_month, first_year, last_month, last_year) = config.load_span().unwrap();
    let raw = loader
        .load_range(first_month, first_year, last_month, last_year, encoding)
        .unwrap();
    let clean = sanitize(&raw, &catalog);

    assert_eq!(raw.len(), 6);
    assert_eq!(clean.len(), 4);
    assert_eq!(config.span.available_years, vec![2023, 2024]);
}

#[test]
fn test_parquet_corpus_matches_csv() {
    let dir = TempDir::new().unwrap();
    write_january(dir.path());

    let loader = TripLoader::new(dir.path());
    let from_csv = loader.load_month(1, 2024, TripEncoding::Csv).unwrap();

    let parquet_path = loader.month_path(1, 2024, TripEncoding::Parquet).unwrap();
    trip_parser::write_trip_parquet(&parquet_path, &from_csv).unwrap();
    let from_parquet = loader.load_month(1, 2024, TripEncoding::Parquet).unwrap();

    assert_eq!(from_csv.records(), from_parquet.records());
}

#[test]
fn test_departure_profile_from_corpus() {
    let dir = TempDir::new().unwrap();
    let catalog = load_catalog(dir.path());
    write_december(dir.path());
    write_january(dir.path());

    let loader = TripLoader::new(dir.path());
    let raw = loader
        .load_range(12, 2023, 1, 2024, TripEncoding::Csv)
        .unwrap();
    let clean = sanitize(&raw, &catalog);
    let index = TimeIndex::over_start_times(&clean);

    let mondays = hourly_departures_for_weekday(&index, 0);
    assert_eq!(mondays[8], 1);
    assert_eq!(mondays[9], 1);
    assert_eq!(mondays.iter().sum::<u64>(), 2);

    let saturdays = hourly_departures_for_weekday(&index, 5);
    assert_eq!(saturdays[17], 1);
    assert_eq!(saturdays.iter().sum::<u64>(), 1);

    let profile = hourly_departure_profile(&index);
    let total: u64 = profile.iter().flatten().sum();
    assert_eq!(total, clean.len() as u64);
    assert_eq!(profile[0], mondays);
    assert_eq!(profile[2][23], 1);
}
