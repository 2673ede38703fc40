use crate::time::time_index::TimeIndex;

/// Count trips departing in each hour of day on one weekday.
///
/// `weekday` follows the index convention, 0 = Monday .. 6 = Sunday; a
/// value outside that range matches nothing and returns all zeros.
pub fn hourly_departures_for_weekday(index: &TimeIndex, weekday: u8) -> [u64; 24] {
    let mut histogram = [0u64; 24];

    for i in 0..index.len() {
        if index.weekday_of(i) == weekday {
            histogram[index.hour_of(i) as usize] += 1;
        }
    }

    histogram
}

/// The full hour-of-day departure profile, one histogram per weekday.
pub fn hourly_departure_profile(index: &TimeIndex) -> [[u64; 24]; 7] {
    let mut profile = [[0u64; 24]; 7];

    for i in 0..index.len() {
        profile[index.weekday_of(i) as usize][index.hour_of(i) as usize] += 1;
    }

    profile
}
