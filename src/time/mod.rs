pub mod time_index;

pub use time_index::TimeIndex;
