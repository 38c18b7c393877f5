//! Distance metrics backed by the `geo` crate.

use geo::{Distance, Geodesic, Point};

use crate::models::Coordinate;
use crate::ports::DistanceMetric;

fn to_point(coordinate: &Coordinate) -> Point<f64> {
    Point::new(coordinate.longitude, coordinate.latitude)
}

/// Ellipsoidal (WGS 84) geodesic distance
#[derive(Debug, Clone, Copy, Default)]
pub struct GeodesicDistance;

impl DistanceMetric for GeodesicDistance {
    fn distance_meters(&self, from: &Coordinate, to: &Coordinate) -> f64 {
        Geodesic.distance(to_point(from), to_point(to))
    }
}
