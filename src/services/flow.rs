use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};

use crate::core::domain::{StationCatalog, TripTable};
use crate::time::time_index::TimeIndex;

/// Temporal filter for a flow query.
///
/// An empty set leaves that calendar part unfiltered, and `time_range:
/// None` matches every time of day; the default predicate therefore
/// matches everything. A non-empty set that matches no records yields an
/// empty flow table rather than an error. The time window is closed-open
/// `[t0, t1)` and wraps across midnight when `t1 < t0`.
///
/// `date_range` bounds the indexed date at day granularity, both ends
/// inclusive, and intersects with the calendar sets. Unlike the time
/// window it does not wrap: an inverted range matches nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowPredicate {
    pub time_range: Option<(NaiveTime, NaiveTime)>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub years: Vec<i32>,
    pub months: Vec<u8>,
    pub days_of_week: Vec<u8>,
}

/// One station's departure and arrival counts under a predicate, joined
/// with its site projection.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowRow {
    pub station_id: u32,
    pub source_count: u64,
    pub sink_count: u64,
    pub lat: f64,
    pub lon: f64,
    pub capacity: u32,
}

impl FlowRow {
    /// Combined departures and arrivals at this station.
    pub fn total_count(&self) -> u64 {
        self.source_count + self.sink_count
    }
}

/// Per-station flow counts, ordered by ascending station id.
///
/// A station appears iff it was a source or a sink at least once under the
/// predicate, so `source_count + sink_count > 0` holds for every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowTable {
    rows: Vec<FlowRow>,
}

impl FlowTable {
    pub fn rows(&self) -> &[FlowRow] {
        &self.rows
    }

    /// Point lookup by station id.
    pub fn get(&self, station_id: u32) -> Option<&FlowRow> {
        self.rows
            .binary_search_by_key(&station_id, |row| row.station_id)
            .ok()
            .map(|pos| &self.rows[pos])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Aggregate per-station source and sink counts over the records matching
/// a predicate.
///
/// The index must have been built over the start-time column of the same
/// table. Filtering proceeds window first, then date range, then year,
/// month and day-of-week membership; survivors are counted by start
/// station (sources) and end station (sinks), the two count groups
/// outer-joined on station id with the missing side filling zero, and each
/// row joined with the catalog's site projection. There are no error
/// conditions; an empty match is an empty table.
pub fn compute_flow(
    table: &TripTable,
    index: &TimeIndex,
    catalog: &StationCatalog,
    predicate: &FlowPredicate,
) -> FlowTable {
    debug_assert_eq!(table.len(), index.len());

    let candidates: Vec<usize> = match predicate.time_range {
        Some((t0, t1)) => index.indices_between_time(t0, t1),
        None => (0..table.len()).collect(),
    };

    let mut sources: BTreeMap<u32, u64> = BTreeMap::new();
    let mut sinks: BTreeMap<u32, u64> = BTreeMap::new();

    let records = table.records();

    for i in candidates {
        if let Some((d0, d1)) = predicate.date_range {
            let date = index.date_of(i);
            if date < d0 || date > d1 {
                continue;
            }
        }
        if !predicate.years.is_empty() && !predicate.years.contains(&index.year_of(i)) {
            continue;
        }
        if !predicate.months.is_empty() && !predicate.months.contains(&index.month_of(i)) {
            continue;
        }
        if !predicate.days_of_week.is_empty()
            && !predicate.days_of_week.contains(&index.weekday_of(i))
        {
            continue;
        }

        let record = &records[i];
        *sources.entry(record.start_station_id).or_insert(0) += 1;
        *sinks.entry(record.end_station_id).or_insert(0) += 1;
    }

    let mut station_ids: Vec<u32> = sources.keys().chain(sinks.keys()).copied().collect();
    station_ids.sort_unstable();
    station_ids.dedup();

    let mut rows = Vec::with_capacity(station_ids.len());

    for station_id in station_ids {
        let site = match catalog.site(station_id) {
            Some(site) => site,
            None => {
                // Sanitized input cannot get here; omitting beats a row
                // with fabricated coordinates.
                log::debug!(
                    "Station {} missing from the catalog, omitted from the flow table",
                    station_id
                );
                continue;
            }
        };

        rows.push(FlowRow {
            station_id,
            source_count: sources.get(&station_id).copied().unwrap_or(0),
            sink_count: sinks.get(&station_id).copied().unwrap_or(0),
            lat: site.lat,
            lon: site.lon,
            capacity: site.capacity,
        });
    }

    FlowTable { rows }
}

/// Normalized net flow per row: `(sources - sinks) / (sources + sinks)`.
///
/// +1 means every matched trip departed from the station, -1 that every
/// matched trip arrived at it. The denominator is never zero because a row
/// only exists for stations counted at least once.
pub fn net_flow(table: &FlowTable) -> Vec<f64> {
    table
        .rows()
        .iter()
        .map(|row| {
            let source = row.source_count as f64;
            let sink = row.sink_count as f64;
            (source - sink) / (source + sink)
        })
        .collect()
}
