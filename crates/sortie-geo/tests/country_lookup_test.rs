//! Country labels for new projects, from a GeoJSON boundary dataset

use sortie_core::clustering::{Placement, TemporalSpatialClusterer};
use sortie_core::config::Thresholds;
use sortie_core::geo::GeodesicDistance;
use sortie_core::models::{Coordinate, FlightRecord};
use sortie_geo::CountryIndex;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const BOUNDARIES: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": { "NAME": "Testland" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[10, 10], [20, 10], [20, 20], [10, 20], [10, 10]]]
            }
        }
    ]
}"#;

fn flight(name: &str, takeoff: &str, gps: Option<Coordinate>) -> FlightRecord {
    let takeoff = chrono::NaiveDateTime::parse_from_str(takeoff, "%Y-%m-%d %H:%M:%S").unwrap();
    FlightRecord {
        source_path: PathBuf::from(name),
        takeoff,
        landing: takeoff + chrono::TimeDelta::minutes(10),
        takeoff_clock: takeoff.format("%H:%M:%S").to_string(),
        landing_clock: String::new(),
        landing_coordinate: gps,
        landing_gps: gps.map(|c| c.to_string()),
    }
}

#[test]
fn test_new_projects_are_labelled_with_country() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("countries.geojson");
    fs::write(&path, BOUNDARIES).unwrap();

    let index = CountryIndex::load(&path).unwrap();
    let mut clusterer = TemporalSpatialClusterer::new(Thresholds::default(), GeodesicDistance, &index);

    let inside = clusterer.push(&flight("a.csv", "2024-03-05 09:00:00", Some(Coordinate::new(15.0, 15.0))));
    let outside = clusterer.push(&flight("b.csv", "2024-03-09 09:00:00", Some(Coordinate::new(-30.0, 150.0))));
    let unknown = clusterer.push(&flight("c.csv", "2024-03-12 09:00:00", None));

    let country = |placement: &Placement| match placement {
        Placement::Opened { country, .. } => country.clone(),
        Placement::Joined { .. } => panic!("expected a new project"),
    };
    assert_eq!(country(&inside), Some("Testland".to_string()));
    assert_eq!(country(&outside), None);
    assert_eq!(country(&unknown), None);

    let projects = clusterer.finish();
    assert_eq!(projects[0].country.as_deref(), Some("Testland"));
}

#[test]
fn test_unreadable_dataset_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.shp");

    assert!(CountryIndex::load(&path).is_err());
}
