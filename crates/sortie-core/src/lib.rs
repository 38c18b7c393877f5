//! Sortie Core - Flight log segmentation, landing resolution and summary logs
//!
//! This crate holds the domain models, the two processing stages and the
//! ports the geographic adapters plug into.

pub mod aggregator;
pub mod clustering;
pub mod config;
pub mod display;
pub mod error;
pub mod geo;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod ports;
pub mod properties;
pub mod resolver;

pub use error::{Result, SortieError};
