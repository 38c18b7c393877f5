//! Country boundary datasets
//!
//! Reads ESRI Shapefiles (`.shp` with its `.shx` and `.dbf` siblings) and
//! GeoJSON feature collections into named multipolygons. Coordinates are
//! taken as WGS 84 longitude/latitude; no reprojection is done.

use geo::{Coord, LineString, MultiPolygon, Polygon};
use shapefile::dbase::FieldValue;
use shapefile::{PolygonRing, Shape};
use std::fs;
use std::path::{Path, PathBuf};

use sortie_core::{Result, SortieError};

/// Attributes tried, in order, for a boundary's display name
pub const NAME_ATTRIBUTES: [&str; 3] = ["NAME", "ADMIN", "name"];

/// One named boundary polygon set
#[derive(Debug, Clone, PartialEq)]
pub struct CountryBoundary {
    pub name: String,
    pub shape: MultiPolygon<f64>,
}

/// Load every named polygon feature from a boundary dataset.
///
/// The format follows the file extension: `.shp` for Shapefiles, `.geojson`
/// or `.json` for GeoJSON.
pub fn load_boundaries(path: &Path) -> Result<Vec<CountryBoundary>> {
    let boundaries = if has_extension(path, "shp") {
        read_shapefile(path)?
    } else if has_extension(path, "geojson") || has_extension(path, "json") {
        read_geojson(path)?
    } else {
        return Err(boundary_error(path, "unsupported format, expected .shp or .geojson"));
    };

    tracing::info!("Loaded {} country boundaries from {}", boundaries.len(), path.display());
    Ok(boundaries)
}

fn boundary_error(path: &Path, reason: impl Into<String>) -> SortieError {
    SortieError::Boundary { path: path.to_path_buf(), reason: reason.into() }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

/// Check that the `.shp`, `.shx` and `.dbf` files are all present.
pub fn verify_shapefile_components(path: &Path) -> Result<()> {
    let base: PathBuf = path.with_extension("");
    let missing: Vec<String> = ["shp", "shx", "dbf"]
        .iter()
        .filter(|ext| !base.with_extension(ext).exists())
        .map(|ext| format!(".{}", ext))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(boundary_error(
            path,
            format!("missing required component files: {}", missing.join(", ")),
        ))
    }
}

fn read_shapefile(path: &Path) -> Result<Vec<CountryBoundary>> {
    verify_shapefile_components(path)?;

    let mut reader = shapefile::Reader::from_path(path)
        .map_err(|e| boundary_error(path, format!("failed to open shapefile: {}", e)))?;

    let mut boundaries = Vec::new();
    for (idx, result) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = result
            .map_err(|e| boundary_error(path, format!("failed to read feature {}: {}", idx, e)))?;

        let rings = match shape {
            Shape::Polygon(polygon) => {
                shape_rings(polygon.rings(), |p: &shapefile::Point| Coord { x: p.x, y: p.y })
            }
            Shape::PolygonM(polygon) => {
                shape_rings(polygon.rings(), |p: &shapefile::PointM| Coord { x: p.x, y: p.y })
            }
            Shape::PolygonZ(polygon) => {
                shape_rings(polygon.rings(), |p: &shapefile::PointZ| Coord { x: p.x, y: p.y })
            }
            _ => continue,
        };

        let name = NAME_ATTRIBUTES.iter().find_map(|attr| match record.get(attr) {
            Some(FieldValue::Character(Some(value))) if !value.trim().is_empty() => {
                Some(value.trim().to_string())
            }
            _ => None,
        });

        match name {
            Some(name) => boundaries.push(CountryBoundary { name, shape: assemble(rings) }),
            None => tracing::debug!("Skipping unnamed boundary feature {} in {}", idx, path.display()),
        }
    }

    Ok(boundaries)
}

/// Shapefile rings as `(is_outer, ring)` pairs
fn shape_rings<P>(
    rings: &[PolygonRing<P>],
    to_coord: impl Fn(&P) -> Coord<f64>,
) -> Vec<(bool, LineString<f64>)> {
    rings
        .iter()
        .map(|ring| {
            let outer = matches!(ring, PolygonRing::Outer(_));
            let line: LineString<f64> = ring.points().iter().map(&to_coord).collect();
            (outer, line)
        })
        .collect()
}

/// Each outer ring opens a polygon; inner rings are holes of the last one.
fn assemble(rings: Vec<(bool, LineString<f64>)>) -> MultiPolygon<f64> {
    let mut polygons: Vec<(LineString<f64>, Vec<LineString<f64>>)> = Vec::new();
    for (outer, ring) in rings {
        match polygons.last_mut() {
            Some((_, holes)) if !outer => holes.push(ring),
            _ => polygons.push((ring, Vec::new())),
        }
    }

    MultiPolygon(
        polygons
            .into_iter()
            .map(|(exterior, holes)| Polygon::new(exterior, holes))
            .collect(),
    )
}

fn read_geojson(path: &Path) -> Result<Vec<CountryBoundary>> {
    let content = fs::read_to_string(path)
        .map_err(|e| boundary_error(path, format!("failed to read file: {}", e)))?;
    let parsed: geojson::GeoJson = content
        .parse()
        .map_err(|e| boundary_error(path, format!("invalid GeoJSON: {}", e)))?;

    let features = match parsed {
        geojson::GeoJson::FeatureCollection(collection) => collection.features,
        geojson::GeoJson::Feature(feature) => vec![feature],
        geojson::GeoJson::Geometry(_) => {
            return Err(boundary_error(path, "expected features with a name property"))
        }
    };

    let mut boundaries = Vec::new();
    for (idx, feature) in features.iter().enumerate() {
        let shape = match feature.geometry.as_ref().map(|g| &g.value) {
            Some(geojson::Value::Polygon(rings)) => MultiPolygon(vec![geojson_polygon(rings)]),
            Some(geojson::Value::MultiPolygon(polygons)) => {
                MultiPolygon(polygons.iter().map(|rings| geojson_polygon(rings)).collect())
            }
            _ => continue,
        };

        let name = NAME_ATTRIBUTES.iter().find_map(|attr| {
            feature
                .property(attr)
                .and_then(|value| value.as_str())
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        });

        match name {
            Some(name) => boundaries.push(CountryBoundary { name, shape }),
            None => tracing::debug!("Skipping unnamed boundary feature {} in {}", idx, path.display()),
        }
    }

    Ok(boundaries)
}

fn geojson_polygon(rings: &[Vec<Vec<f64>>]) -> Polygon<f64> {
    let mut lines = rings.iter().map(|ring| {
        ring.iter()
            .filter(|position| position.len() >= 2)
            .map(|position| Coord { x: position[0], y: position[1] })
            .collect::<LineString<f64>>()
    });

    let exterior = lines.next().unwrap_or_else(|| LineString::new(Vec::new()));
    Polygon::new(exterior, lines.collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SQUARES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "ADMIN": "Testland", "ISO_A3": "TST" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[10, 10], [20, 10], [20, 20], [10, 20], [10, 10]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "NAME": "Islandia" },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[30, 30], [31, 30], [31, 31], [30, 31], [30, 30]]],
                        [[[40, 40], [41, 40], [41, 41], [40, 41], [40, 40]]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": { "ISO_A3": "XXX" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]]
                }
            }
        ]
    }"#;

    #[test]
    fn test_read_geojson_boundaries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("countries.geojson");
        fs::write(&path, SQUARES).unwrap();

        let boundaries = load_boundaries(&path).unwrap();

        let names: Vec<&str> = boundaries.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Testland", "Islandia"]);
        assert_eq!(boundaries[1].shape.0.len(), 2);
    }

    #[test]
    fn test_assemble_attaches_holes() {
        let square = |min: f64, max: f64| -> LineString<f64> {
            vec![(min, min), (max, min), (max, max), (min, max), (min, min)].into()
        };
        let shape = assemble(vec![(true, square(0.0, 10.0)), (false, square(2.0, 3.0)), (true, square(20.0, 30.0))]);

        assert_eq!(shape.0.len(), 2);
        assert_eq!(shape.0[0].interiors().len(), 1);
        assert!(shape.0[1].interiors().is_empty());
    }

    #[test]
    fn test_missing_shapefile_components() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("countries.shp");
        fs::write(&path, b"").unwrap();

        let err = load_boundaries(&path).unwrap_err();
        let message = err.to_string();
        assert!(message.contains(".shx"), "{}", message);
        assert!(message.contains(".dbf"), "{}", message);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_boundaries(Path::new("countries.kml")).unwrap_err();
        assert!(matches!(err, SortieError::Boundary { .. }));
    }

    #[test]
    fn test_invalid_geojson() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(load_boundaries(&path), Err(SortieError::Boundary { .. })));
    }
}
