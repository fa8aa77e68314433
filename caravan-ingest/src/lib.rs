//! Ingestion sources for the roster: the spreadsheet CSV export the event
//! team maintains, and a seeded fixture generator for demos and offline
//! development.

mod csv;
mod fixture;
mod sheet;

pub use csv::parse_export;
pub use fixture::FixtureSource;
pub use sheet::SheetCsvSource;
