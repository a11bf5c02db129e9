pub mod record;
pub mod table;

pub use record::{CanonicalRecord, PublicationType, classify, parse_year, parse_year_number};
pub use table::{
    AUTHOR_COLUMN, RowView, TITLE_COLUMN, TYPE_COLUMN, Table, TableOrigin, VENUE_COLUMN,
    WorkingTable, YEAR_COLUMN,
};
