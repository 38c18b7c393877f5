pub mod coordinate;
pub mod flight;
pub mod project;
pub mod summary;

pub use coordinate::Coordinate;
pub use flight::{delta_seconds, file_name_of, FlightRecord};
pub use project::{Project, ProjectPropertiesRecord, RunMetadata};
pub use summary::{
    format_flight_time, ResolvedLocation, SummaryRow, SUMMARY_HEADERS, UNRESOLVED_LOCATION,
};
