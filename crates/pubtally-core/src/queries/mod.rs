pub mod filter;
pub mod stats;

pub use filter::{YearRange, filter_by_faculty, filter_by_year_range};
pub use stats::{CountEntry, count_by_faculty, count_by_type, faculty_names, year_histogram};
