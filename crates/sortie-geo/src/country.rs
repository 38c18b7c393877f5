//! Point-in-country lookup over a boundary dataset

use geo::{BoundingRect, Contains, MultiPolygon, Point};
use rstar::{RTree, RTreeObject, AABB};
use std::path::Path;

use sortie_core::models::Coordinate;
use sortie_core::ports::CountryResolver;
use sortie_core::Result;

use crate::boundaries::{load_boundaries, CountryBoundary};

/// A boundary with its bounding box precomputed for the R-tree
#[derive(Debug, Clone)]
struct IndexedBoundary {
    name: String,
    shape: MultiPolygon<f64>,
    envelope: AABB<[f64; 2]>,
}

impl IndexedBoundary {
    fn new(boundary: CountryBoundary) -> Option<Self> {
        let rect = boundary.shape.bounding_rect()?;
        let (min, max) = (rect.min(), rect.max());
        Some(Self {
            name: boundary.name,
            shape: boundary.shape,
            envelope: AABB::from_corners([min.x, min.y], [max.x, max.y]),
        })
    }
}

impl RTreeObject for IndexedBoundary {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Resolves landing positions to country names
pub struct CountryIndex {
    tree: RTree<IndexedBoundary>,
}

impl CountryIndex {
    pub fn from_boundaries(boundaries: Vec<CountryBoundary>) -> Self {
        let indexed: Vec<IndexedBoundary> =
            boundaries.into_iter().filter_map(IndexedBoundary::new).collect();
        Self { tree: RTree::bulk_load(indexed) }
    }

    /// Load a boundary dataset from disk and index it.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::from_boundaries(load_boundaries(path)?))
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Name of the first boundary containing `coordinate`
    pub fn locate(&self, coordinate: &Coordinate) -> Option<&str> {
        let xy = coordinate.to_xy();
        let point = Point::new(xy[0], xy[1]);

        let mut candidates: Vec<&IndexedBoundary> = self
            .tree
            .locate_in_envelope_intersecting(&AABB::from_point(xy))
            .filter(|boundary| boundary.shape.contains(&point))
            .collect();
        // Overlapping datasets resolve to the same name on every run
        candidates.sort_by(|a, b| a.name.cmp(&b.name));

        candidates.first().map(|boundary| boundary.name.as_str())
    }
}

impl CountryResolver for CountryIndex {
    fn country_of(&self, coordinate: &Coordinate) -> Option<String> {
        self.locate(coordinate).map(str::to_string)
    }
}
