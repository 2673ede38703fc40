//! Domain models for bikeshare stations and trip records.
//!
//! This module provides the core data structures the pipeline operates on:
//! station metadata, the station catalog keyed by id, individual trip
//! records, and the ordered trip table that loaders produce and the
//! sanitizer and aggregator consume.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Shortest trip duration (seconds) considered a real ride rather than a
/// failed checkout.
pub const MIN_TRIP_DURATION_SECS: u32 = 60;

/// Longest trip duration (seconds) considered a real ride rather than a
/// lost or abandoned bike. Eight hours.
pub const MAX_TRIP_DURATION_SECS: u32 = 8 * 3600;

/// Sentinel the trip loader writes for a missing station id. No real
/// station carries id 0, so sanitization always rejects records holding it.
pub const UNKNOWN_STATION_ID: u32 = 0;

/// Physical docking configuration of a station, as spelled by the station
/// information document. Values outside the known set collapse to
/// [`PhysicalConfiguration::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PhysicalConfiguration {
    Regular,
    RegularLitMapFrame,
    SmartLitMapFrame,
    SmartMapFrame,
    ElectricBikeStation,
    Vault,
    #[serde(other)]
    Unknown,
}

/// Rider category attached to each trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserType {
    AnnualMember,
    CasualMember,
    Unknown,
}

impl UserType {
    /// Maps the label used by the ridership exports. Anything
    /// unrecognized becomes [`UserType::Unknown`].
    ///
    /// # Examples
    ///
    /// ```
    /// use bikeshare_flow::core::domain::UserType;
    ///
    /// assert_eq!(UserType::from_label("Annual Member"), UserType::AnnualMember);
    /// assert_eq!(UserType::from_label("Day Pass"), UserType::Unknown);
    /// ```
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Annual Member" => UserType::AnnualMember,
            "Casual Member" => UserType::CasualMember,
            _ => UserType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::AnnualMember => "Annual Member",
            UserType::CasualMember => "Casual Member",
            UserType::Unknown => "Unknown",
        }
    }
}

/// Bike model attached to each trip. Exports older than 2023 lack the
/// column entirely; the loader synthesizes it with a `"NULL"` sentinel,
/// which maps here to [`BikeModel::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BikeModel {
    Iconic,
    Efit,
    EfitG5,
    Unknown,
}

impl BikeModel {
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "ICONIC" => BikeModel::Iconic,
            "EFIT" => BikeModel::Efit,
            "EFIT G5" => BikeModel::EfitG5,
            _ => BikeModel::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BikeModel::Iconic => "ICONIC",
            BikeModel::Efit => "EFIT",
            BikeModel::EfitG5 => "EFIT G5",
            BikeModel::Unknown => "NULL",
        }
    }
}

/// A docking station as the aggregation pipeline sees it.
///
/// Only the fields relevant to aggregation survive parsing; naming,
/// address, rental methods and similar presentation fields are dropped at
/// the parser. Stations are immutable after load.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: u32,
    pub lat: f64,
    pub lon: f64,
    /// Present in the source document but frequently null.
    pub altitude: Option<f64>,
    pub capacity: u32,
    pub configuration: PhysicalConfiguration,
}

/// Minimal per-station projection joined into flow results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationSite {
    pub lat: f64,
    pub lon: f64,
    pub capacity: u32,
}

impl Station {
    pub fn site(&self) -> StationSite {
        StationSite {
            lat: self.lat,
            lon: self.lon,
            capacity: self.capacity,
        }
    }
}

/// Lookup table of stations keyed by id.
///
/// Loaded once per process and shared read-only by the sanitizer and the
/// flow aggregator; it holds no interior mutability, so `&`-shared reads
/// from parallel queries need no locking.
///
/// # Examples
///
/// ```
/// use bikeshare_flow::core::domain::{PhysicalConfiguration, Station, StationCatalog};
///
/// let catalog = StationCatalog::from_stations(vec![Station {
///     id: 7000,
///     lat: 43.64,
///     lon: -79.38,
///     altitude: None,
///     capacity: 35,
///     configuration: PhysicalConfiguration::Regular,
/// }]);
///
/// assert!(catalog.contains(7000));
/// assert!(!catalog.contains(0));
/// assert_eq!(catalog.lookup(7000).unwrap().capacity, 35);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationCatalog {
    stations: BTreeMap<u32, Station>,
}

impl StationCatalog {
    /// Builds a catalog from parsed stations. A duplicated id keeps the
    /// later entry, matching the source document order.
    pub fn from_stations(stations: Vec<Station>) -> Self {
        let stations = stations.into_iter().map(|s| (s.id, s)).collect();
        Self { stations }
    }

    pub fn contains(&self, station_id: u32) -> bool {
        self.stations.contains_key(&station_id)
    }

    pub fn lookup(&self, station_id: u32) -> Option<&Station> {
        self.stations.get(&station_id)
    }

    /// Point lookup into the minimal view.
    pub fn site(&self, station_id: u32) -> Option<StationSite> {
        self.stations.get(&station_id).map(Station::site)
    }

    /// The `{lat, lon, capacity}` projection for every station, ordered by
    /// station id.
    pub fn minimal_view(&self) -> BTreeMap<u32, StationSite> {
        self.stations
            .iter()
            .map(|(&id, station)| (id, station.site()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn station_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.stations.keys().copied()
    }
}

/// A single trip between two stations.
///
/// `trip_id` is unique within one load batch, not across batches. A
/// `start_station_id` or `end_station_id` of [`UNKNOWN_STATION_ID`] marks
/// an endpoint the source file failed to record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripRecord {
    pub trip_id: u32,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub start_station_id: u32,
    pub end_station_id: u32,
    pub duration_secs: u32,
    pub bike_id: u32,
    pub user_type: UserType,
    pub model: BikeModel,
}

/// An ordered collection of trip records.
///
/// Loaders produce one table per source file and concatenate them in load
/// order; sanitization produces a fresh filtered table. There are no
/// cross-record invariants beyond per-record validity after sanitization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripTable {
    records: Vec<TripRecord>,
}

impl TripTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<TripRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TripRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends another table, preserving both record orders.
    pub fn extend(&mut self, other: TripTable) {
        self.records.extend(other.records);
    }
}

impl IntoIterator for TripTable {
    type Item = TripRecord;
    type IntoIter = std::vec::IntoIter<TripRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
