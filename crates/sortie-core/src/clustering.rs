//! Temporal/spatial segmentation of flights into projects
//!
//! Flights arrive in file-name timestamp order. Each one either continues the
//! most recently opened project or opens a new one. Only that last project is
//! ever considered: a flight cannot rejoin an earlier project even when it
//! would qualify.

use serde::Serialize;

use crate::config::Thresholds;
use crate::display::{distance_display, time_display};
use crate::models::{delta_seconds, FlightRecord, Project};
use crate::ports::{CountryResolver, DistanceMetric};

/// Where a flight was placed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "placement", rename_all = "snake_case")]
pub enum Placement {
    /// Appended to the open project
    Joined {
        project_id: String,
        time_gap_hours: f64,
        distance_meters: Option<f64>,
        suggested_location: bool,
    },
    /// Started a new project
    Opened {
        project_id: String,
        /// Gap to the previous project; `None` for the very first flight
        time_gap_hours: Option<f64>,
        distance_meters: Option<f64>,
        country: Option<String>,
    },
}

impl Placement {
    pub fn project_id(&self) -> &str {
        match self {
            Placement::Joined { project_id, .. } | Placement::Opened { project_id, .. } => {
                project_id
            }
        }
    }
}

/// Gap between the open project and a candidate flight
#[derive(Debug, Clone, Copy, PartialEq)]
struct Gap {
    hours: f64,
    /// `None` when either side has no landing position
    meters: Option<f64>,
}

/// Greedy single-pass clusterer
pub struct TemporalSpatialClusterer<D, C> {
    thresholds: Thresholds,
    distance: D,
    countries: C,
    projects: Vec<Project>,
}

impl<D: DistanceMetric, C: CountryResolver> TemporalSpatialClusterer<D, C> {
    pub fn new(thresholds: Thresholds, distance: D, countries: C) -> Self {
        Self { thresholds, distance, countries, projects: Vec::new() }
    }

    /// Place `flight` into the open project or a new one.
    pub fn push(&mut self, flight: &FlightRecord) -> Placement {
        let gap = self.projects.last().map(|open| self.gap(open, flight));

        match gap {
            Some(gap) if self.accepts(&gap) => self.join(flight, gap),
            _ => self.open(flight, gap),
        }
    }

    /// Projects created so far, in creation order.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn finish(self) -> Vec<Project> {
        self.projects
    }

    fn gap(&self, open: &Project, flight: &FlightRecord) -> Gap {
        let hours = delta_seconds(flight.takeoff - open.last_landing).abs() / 3600.0;
        let meters = match (&open.last_landing_coordinate, &flight.landing_coordinate) {
            (Some(last), Some(current)) => Some(self.distance.distance_meters(last, current)),
            _ => None,
        };
        Gap { hours, meters }
    }

    fn accepts(&self, gap: &Gap) -> bool {
        let within_time = gap.hours <= self.thresholds.time_threshold_hours;
        let within_distance = gap
            .meters
            .map(|m| m <= self.thresholds.coordinate_threshold_meters)
            .unwrap_or(true);
        within_time && within_distance
    }

    fn join(&mut self, flight: &FlightRecord, gap: Gap) -> Placement {
        let Some(open) = self.projects.last_mut() else {
            return self.open(flight, Some(gap));
        };

        let suggested_location = open.append(flight);
        if suggested_location {
            if let Some(coordinate) = open.suggested_landing_coordinate {
                tracing::info!(
                    "Found a suggestable landing location for {}: {}",
                    open.id,
                    coordinate.to_persisted()
                );
            }
        }

        tracing::info!(
            "Assigned {} to {} (TimeDiff: {}, Distance: {})",
            flight.file_name(),
            open.id,
            time_display(gap.hours),
            distance_display(gap.meters)
        );

        Placement::Joined {
            project_id: open.id.clone(),
            time_gap_hours: gap.hours,
            distance_meters: gap.meters,
            suggested_location,
        }
    }

    fn open(&mut self, flight: &FlightRecord, gap: Option<Gap>) -> Placement {
        let id = self.next_project_id(flight);
        let country = flight
            .landing_coordinate
            .as_ref()
            .and_then(|coordinate| self.countries.country_of(coordinate));

        let country_label = match &country {
            Some(name) => format!("Country: {}", name),
            None => "Country not found".to_string(),
        };
        tracing::info!(
            "Creating new project {} for {} ({}). TimeDiff: {} Dist: {}",
            id,
            flight.file_name(),
            country_label,
            gap.map(|g| time_display(g.hours)).unwrap_or_else(|| "n/a".to_string()),
            distance_display(gap.and_then(|g| g.meters))
        );

        self.projects.push(Project::open(id.clone(), flight, country.clone()));

        Placement::Opened {
            project_id: id,
            time_gap_hours: gap.map(|g| g.hours),
            distance_meters: gap.and_then(|g| g.meters),
            country,
        }
    }

    /// `Project_<date>`, or `Project_<date>_<n>` when that date is taken
    fn next_project_id(&self, flight: &FlightRecord) -> String {
        let base = format!("Project_{}", flight.takeoff_date().format("%Y-%m-%d"));

        if self.projects.iter().any(|p| p.id.starts_with(&base)) {
            let taken = self.projects.iter().filter(|p| p.id.contains(&base)).count();
            format!("{}_{}", base, taken + 1)
        } else {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;
    use crate::ports::NoCountryResolver;
    use chrono::{NaiveDateTime, TimeDelta};
    use proptest::prelude::*;
    use std::path::PathBuf;

    /// Flat-earth metric: one unit of latitude is one meter
    struct MetersPerDegree;

    impl DistanceMetric for MetersPerDegree {
        fn distance_meters(&self, from: &Coordinate, to: &Coordinate) -> f64 {
            ((from.latitude - to.latitude).powi(2) + (from.longitude - to.longitude).powi(2)).sqrt()
        }
    }

    struct Everywhere(&'static str);

    impl CountryResolver for Everywhere {
        fn country_of(&self, _coordinate: &Coordinate) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    fn at(timestamp: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn flight(name: &str, takeoff: &str, minutes: i64, gps: Option<(f64, f64)>) -> FlightRecord {
        let takeoff = at(takeoff);
        FlightRecord {
            source_path: PathBuf::from(name),
            takeoff,
            landing: takeoff + TimeDelta::minutes(minutes),
            takeoff_clock: takeoff.format("%H:%M:%S").to_string(),
            landing_clock: String::new(),
            landing_coordinate: gps.map(|(lat, lon)| Coordinate::new(lat, lon)),
            landing_gps: gps.map(|(lat, lon)| format!("{} {}", lat, lon)),
        }
    }

    fn clusterer(hours: f64, meters: f64) -> TemporalSpatialClusterer<MetersPerDegree, NoCountryResolver> {
        let thresholds = Thresholds {
            time_threshold_hours: hours,
            coordinate_threshold_meters: meters,
            valid_time_threshold_seconds: 0.0,
        };
        TemporalSpatialClusterer::new(thresholds, MetersPerDegree, NoCountryResolver)
    }

    #[test]
    fn test_first_flight_opens_project() {
        let mut clusterer = clusterer(24.0, 1000.0);
        let placement = clusterer.push(&flight("a.csv", "2024-03-05 10:00:00", 10, Some((10.0, 20.0))));

        assert_eq!(
            placement,
            Placement::Opened {
                project_id: "Project_2024-03-05".to_string(),
                time_gap_hours: None,
                distance_meters: None,
                country: None,
            }
        );

        let project = &clusterer.projects()[0];
        assert_eq!(project.member_files, vec![PathBuf::from("a.csv")]);
        assert!(project.suggested_landing_coordinate.is_none());
    }

    #[test]
    fn test_threshold_boundary() {
        let mut clusterer = clusterer(2.0, 100.0);
        // Lands at 10:00, next takeoff exactly 2h later, 100m away
        clusterer.push(&flight("a.csv", "2024-03-05 09:30:00", 30, Some((1000.0, 20.0))));
        let joined = clusterer.push(&flight("b.csv", "2024-03-05 12:00:00", 30, Some((1100.0, 20.0))));
        assert!(matches!(joined, Placement::Joined { .. }));

        // Lands at 12:30, next takeoff one second past the threshold
        let opened = clusterer.push(&flight("c.csv", "2024-03-05 14:30:01", 30, Some((1100.0, 20.0))));
        assert!(matches!(opened, Placement::Opened { .. }));
        assert_eq!(clusterer.projects().len(), 2);
    }

    #[test]
    fn test_distance_splits_projects() {
        let mut clusterer = clusterer(24.0, 100.0);
        clusterer.push(&flight("a.csv", "2024-03-05 09:00:00", 10, Some((1000.0, 20.0))));
        let placement = clusterer.push(&flight("b.csv", "2024-03-05 09:30:00", 10, Some((1100.5, 20.0))));

        match placement {
            Placement::Opened { project_id, distance_meters, time_gap_hours, .. } => {
                assert_eq!(project_id, "Project_2024-03-05_2");
                assert_eq!(distance_meters, Some(100.5));
                assert_eq!(time_gap_hours, Some(20.0 / 60.0));
            }
            other => panic!("expected a new project, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_location_never_blocks_merge() {
        let mut clusterer = clusterer(1.0, 1.0);
        clusterer.push(&flight("a.csv", "2024-03-05 09:00:00", 10, Some((10.0, 20.0))));
        let placement = clusterer.push(&flight("b.csv", "2024-03-05 09:30:00", 10, None));
        assert!(matches!(placement, Placement::Joined { distance_meters: None, .. }));

        // The open project's last position is now absent as well
        let placement = clusterer.push(&flight("c.csv", "2024-03-05 10:00:00", 10, Some((5000.0, 20.0))));
        assert!(matches!(placement, Placement::Joined { distance_meters: None, .. }));

        let project = &clusterer.projects()[0];
        assert_eq!(project.len(), 3);
        assert_eq!(project.missing_gps, 1);
        assert_eq!(project.last_landing_coordinate, Some(Coordinate::new(5000.0, 20.0)));
    }

    #[test]
    fn test_first_valid_suggestion_wins() {
        let mut clusterer = clusterer(24.0, 1000.0);
        clusterer.push(&flight("a.csv", "2024-03-05 09:00:00", 10, Some((10.0, 20.0))));
        clusterer.push(&flight("b.csv", "2024-03-05 09:30:00", 10, Some((11.0, 20.0))));
        clusterer.push(&flight("c.csv", "2024-03-05 10:00:00", 10, Some((12.0, 20.0))));

        let project = &clusterer.projects()[0];
        assert_eq!(project.suggested_landing_coordinate, Some(Coordinate::new(11.0, 20.0)));
    }

    #[test]
    fn test_same_day_disambiguation() {
        let mut clusterer = clusterer(0.5, 1000.0);
        let ids: Vec<String> = ["08:00:00", "12:00:00", "16:00:00"]
            .iter()
            .map(|t| {
                let placement = clusterer.push(&flight("x.csv", &format!("2024-03-05 {}", t), 10, None));
                placement.project_id().to_string()
            })
            .collect();

        assert_eq!(ids, vec!["Project_2024-03-05", "Project_2024-03-05_2", "Project_2024-03-05_3"]);
    }

    #[test]
    fn test_superseded_project_is_never_rejoined() {
        let mut clusterer = clusterer(24.0, 100.0);
        clusterer.push(&flight("a.csv", "2024-03-05 09:00:00", 10, Some((1000.0, 20.0))));
        clusterer.push(&flight("b.csv", "2024-03-05 10:00:00", 10, Some((5000.0, 20.0))));
        // Back at the first site, but only the second project is open
        clusterer.push(&flight("c.csv", "2024-03-05 11:00:00", 10, Some((1000.0, 20.0))));

        let projects = clusterer.finish();
        assert_eq!(projects.len(), 3);
        assert_eq!(projects[0].member_files, vec![PathBuf::from("a.csv")]);
        assert_eq!(projects[2].id, "Project_2024-03-05_3");
    }

    #[test]
    fn test_country_label_on_open() {
        let thresholds = Thresholds::default();
        let mut clusterer = TemporalSpatialClusterer::new(thresholds, MetersPerDegree, Everywhere("Indonesia"));

        let with_gps = clusterer.push(&flight("a.csv", "2024-03-05 09:00:00", 10, Some((-8.5, 115.2))));
        assert!(matches!(with_gps, Placement::Opened { country: Some(ref c), .. } if c == "Indonesia"));

        let mut clusterer = TemporalSpatialClusterer::new(thresholds, MetersPerDegree, Everywhere("Indonesia"));
        let without_gps = clusterer.push(&flight("b.csv", "2024-03-05 09:00:00", 10, None));
        assert!(matches!(without_gps, Placement::Opened { country: None, .. }));
    }

    #[test]
    fn test_placement_json_shape() {
        let mut clusterer = clusterer(24.0, 1000.0);
        let opened = clusterer.push(&flight("a.csv", "2024-03-05 09:00:00", 10, Some((1.0, 1.0))));

        let value = serde_json::to_value(&opened).unwrap();
        assert_eq!(value["placement"], "opened");
        assert_eq!(value["project_id"], "Project_2024-03-05");
        assert!(value["time_gap_hours"].is_null());
    }

    proptest! {
        #[test]
        fn prop_back_to_back_flights_without_gps_merge(
            hours in 0.0f64..1000.0,
            meters in 0.0f64..1_000_000.0,
            minutes in 1i64..600,
        ) {
            let mut clusterer = clusterer(hours, meters);
            let first = flight("a.csv", "2024-03-05 09:00:00", minutes, None);
            let second = FlightRecord {
                source_path: PathBuf::from("b.csv"),
                takeoff: first.landing,
                landing: first.landing + TimeDelta::minutes(minutes),
                ..first.clone()
            };

            clusterer.push(&first);
            let placement = clusterer.push(&second);
            let joined = matches!(placement, Placement::Joined { .. });
            prop_assert!(joined);
            prop_assert_eq!(clusterer.projects().len(), 1);
        }
    }
}
