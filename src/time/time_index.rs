use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::core::domain::TripTable;

/// Calendar index over one timestamp column of a trip table.
///
/// Holds the derived calendar parts of each record's timestamp in parallel
/// arrays, positionally aligned with the table it was built from. Rebuilt
/// alongside any table it indexes; it is never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeIndex {
    seconds_of_day: Vec<u32>,
    dates: Vec<NaiveDate>,
    weekdays: Vec<u8>,
    months: Vec<u8>,
    years: Vec<i32>,
}

impl TimeIndex {
    /// Build the index over the departure timestamps. All aggregation
    /// queries run against this one.
    pub fn over_start_times(table: &TripTable) -> Self {
        Self::from_timestamps(table.iter().map(|r| r.start_time))
    }

    /// Build the index over the arrival timestamps.
    pub fn over_end_times(table: &TripTable) -> Self {
        Self::from_timestamps(table.iter().map(|r| r.end_time))
    }

    fn from_timestamps(timestamps: impl Iterator<Item = NaiveDateTime>) -> Self {
        let mut index = TimeIndex::default();

        for ts in timestamps {
            index.seconds_of_day.push(ts.time().num_seconds_from_midnight());
            index.dates.push(ts.date());
            index.weekdays.push(ts.weekday().num_days_from_monday() as u8);
            index.months.push(ts.month() as u8);
            index.years.push(ts.year());
        }

        index
    }

    /// Positions whose time of day lies in the closed-open window `[t0, t1)`.
    ///
    /// The date component is ignored. A window with `t1 < t0` wraps across
    /// midnight; `t0 == t1` is the empty window.
    ///
    /// # Example
    /// ```
    /// use bikeshare_flow::core::domain::TripTable;
    /// use bikeshare_flow::time::time_index::TimeIndex;
    /// use chrono::NaiveTime;
    ///
    /// let index = TimeIndex::over_start_times(&TripTable::new());
    /// let t0 = NaiveTime::from_hms_opt(7, 0, 0).unwrap();
    /// let t1 = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
    /// assert!(index.indices_between_time(t0, t1).is_empty());
    /// ```
    pub fn indices_between_time(&self, t0: NaiveTime, t1: NaiveTime) -> Vec<usize> {
        let start = t0.num_seconds_from_midnight();
        let end = t1.num_seconds_from_midnight();

        self.seconds_of_day
            .iter()
            .enumerate()
            .filter(|(_, &tod)| in_window(tod, start, end))
            .map(|(i, _)| i)
            .collect()
    }

    /// Day of week at a position, 0 = Monday .. 6 = Sunday.
    ///
    /// Panics when `i` is out of bounds.
    pub fn weekday_of(&self, i: usize) -> u8 {
        self.weekdays[i]
    }

    /// Calendar date at a position.
    pub fn date_of(&self, i: usize) -> NaiveDate {
        self.dates[i]
    }

    /// Calendar month at a position, 1-12.
    pub fn month_of(&self, i: usize) -> u8 {
        self.months[i]
    }

    /// Calendar year at a position.
    pub fn year_of(&self, i: usize) -> i32 {
        self.years[i]
    }

    /// Hour of day at a position, 0-23.
    pub fn hour_of(&self, i: usize) -> u32 {
        self.seconds_of_day[i] / 3600
    }

    pub fn len(&self) -> usize {
        self.seconds_of_day.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seconds_of_day.is_empty()
    }
}

/// Closed-open window membership with midnight wrap-around
fn in_window(tod: u32, start: u32, end: u32) -> bool {
    use std::cmp::Ordering;

    match start.cmp(&end) {
        Ordering::Equal => false,
        Ordering::Less => start <= tod && tod < end,
        Ordering::Greater => tod >= start || tod < end,
    }
}
