use crate::models::Coordinate;

/// Port for great-circle distance between two landing positions
pub trait DistanceMetric {
    /// Distance in meters
    fn distance_meters(&self, from: &Coordinate, to: &Coordinate) -> f64;
}

/// Port for reverse geocoding a landing position to a country
pub trait CountryResolver {
    /// Name of the country containing `coordinate`, or `None` if unknown
    fn country_of(&self, coordinate: &Coordinate) -> Option<String>;
}

/// Resolver used when no boundary dataset is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCountryResolver;

impl CountryResolver for NoCountryResolver {
    fn country_of(&self, _coordinate: &Coordinate) -> Option<String> {
        None
    }
}

impl<T: DistanceMetric + ?Sized> DistanceMetric for &T {
    fn distance_meters(&self, from: &Coordinate, to: &Coordinate) -> f64 {
        (**self).distance_meters(from, to)
    }
}

impl<T: CountryResolver + ?Sized> CountryResolver for &T {
    fn country_of(&self, coordinate: &Coordinate) -> Option<String> {
        (**self).country_of(coordinate)
    }
}
