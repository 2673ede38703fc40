use crate::core::domain::{
    StationCatalog, TripRecord, TripTable, MAX_TRIP_DURATION_SECS, MIN_TRIP_DURATION_SECS,
};

/// Whether a single record survives sanitization: a plausible ride length
/// and both endpoints present in the catalog.
pub fn is_valid_trip(record: &TripRecord, catalog: &StationCatalog) -> bool {
    record.duration_secs >= MIN_TRIP_DURATION_SECS
        && record.duration_secs <= MAX_TRIP_DURATION_SECS
        && catalog.contains(record.start_station_id)
        && catalog.contains(record.end_station_id)
}

/// Filter a trip table down to the records usable by the aggregator.
///
/// Record order is preserved and the input is untouched. The 0 sentinel the
/// loader writes for a missing endpoint never appears in a catalog, so those
/// records are always culled here.
pub fn sanitize(table: &TripTable, catalog: &StationCatalog) -> TripTable {
    let records = table
        .iter()
        .filter(|record| is_valid_trip(record, catalog))
        .copied()
        .collect();

    TripTable::from_records(records)
}
