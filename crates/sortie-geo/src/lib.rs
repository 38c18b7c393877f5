//! Sortie Geo - Country boundary datasets and point-in-country lookup
//!
//! Implements the `CountryResolver` port of sortie-core on top of Shapefile
//! and GeoJSON boundary datasets.

pub mod boundaries;
pub mod country;

pub use boundaries::{load_boundaries, CountryBoundary};
pub use country::CountryIndex;
