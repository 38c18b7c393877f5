//! Landing locations for flights that logged no usable GPS fix

use crate::models::{Coordinate, FlightRecord, ResolvedLocation};

/// Fills in landing locations within a single project
///
/// Lookup order for a flight without its own fix:
/// 1. the project's stored suggestion, reused for every such flight;
/// 2. otherwise the fix of the sibling flight whose takeoff is closest in
///    time (earliest member wins a tie).
///
/// When a search comes back empty the project is marked exhausted and every
/// later flight without a fix stays unresolved.
#[derive(Debug, Clone)]
pub struct MissingGpsResolver {
    suggested: Option<Coordinate>,
    exhausted: bool,
}

impl MissingGpsResolver {
    pub fn new(suggested: Option<Coordinate>) -> Self {
        Self { suggested, exhausted: false }
    }

    /// Resolve every member of a project, in member order.
    pub fn resolve_all(&mut self, members: &[FlightRecord]) -> Vec<ResolvedLocation> {
        (0..members.len()).map(|idx| self.resolve(members, idx)).collect()
    }

    /// Resolve the landing location of `members[idx]`.
    pub fn resolve(&mut self, members: &[FlightRecord], idx: usize) -> ResolvedLocation {
        let flight = &members[idx];

        if let Some(coordinate) = flight.landing_coordinate {
            return ResolvedLocation::Recorded(coordinate);
        }

        if self.exhausted {
            tracing::warn!("No valid GPS data for file {}", flight.source_path.display());
            return ResolvedLocation::Unresolved;
        }

        if let Some(coordinate) = self.suggested {
            tracing::info!(
                "Using suggested landing location for the gps missing file: {}. Loc: {}",
                flight.source_path.display(),
                coordinate
            );
            return ResolvedLocation::Suggested(coordinate);
        }

        tracing::info!(
            "Searching for the nearest gps location in time for the gps missing file: {}",
            flight.source_path.display()
        );

        let nearest = members
            .iter()
            .enumerate()
            .filter(|(other, _)| *other != idx)
            .filter_map(|(_, sibling)| sibling.landing_coordinate.map(|c| (sibling, c)))
            .min_by_key(|(sibling, _)| (sibling.takeoff - flight.takeoff).abs());

        match nearest {
            Some((sibling, coordinate)) => {
                tracing::info!(
                    "Found a gps location for {} new location: {}",
                    flight.source_path.display(),
                    coordinate
                );
                ResolvedLocation::Nearest { coordinate, source: sibling.source_path.clone() }
            }
            None => {
                tracing::warn!("No valid GPS data for file {}", flight.source_path.display());
                self.exhausted = true;
                ResolvedLocation::Unresolved
            }
        }
    }

    /// Whether a failed search has disabled further lookups
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}
