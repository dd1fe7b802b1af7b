//! Geo-bounds translation.
//!
//! Converts two corner coordinates into a closed GeoJSON polygon usable by a
//! "within region" storage predicate. Corners may arrive in either order:
//! the translator normalizes them so the region always spans exactly the
//! rectangle the two points imply.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A latitude/longitude pair as supplied by callers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees, `-90..=90`
    pub lat: f64,
    /// Longitude in degrees, `-180..=180`
    pub lng: f64,
}

impl Coordinates {
    /// Creates a coordinate pair without validating it.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Checks that both components are finite and in range.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` for NaN, infinities, or out-of-range values.
    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::Validation(format!(
                "latitude {} outside -90..=90",
                self.lat
            )));
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(Error::Validation(format!(
                "longitude {} outside -180..=180",
                self.lng
            )));
        }
        Ok(())
    }

    fn position(self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

/// A stored location, serialized as a GeoJSON `Point`.
///
/// GeoJSON orders positions as `[longitude, latitude]`. Points only come
/// from [`GeoPoint::new`] or deserialization, both of which validate:
///
/// ```compile_fail
/// let point = cat_gateway::geo::GeoPoint { lat: 500.0, lng: 0.0 };
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "PointRepr", try_from = "PointRepr")]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

impl GeoPoint {
    /// Creates a validated point.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the coordinates are out of range.
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        Coordinates::new(lat, lng).validate()?;
        Ok(Self { lat, lng })
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lng(&self) -> f64 {
        self.lng
    }
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type")]
enum PointRepr {
    Point { coordinates: [f64; 2] },
}

impl From<GeoPoint> for PointRepr {
    fn from(p: GeoPoint) -> Self {
        PointRepr::Point {
            coordinates: [p.lng, p.lat],
        }
    }
}

impl TryFrom<PointRepr> for GeoPoint {
    type Error = Error;

    fn try_from(repr: PointRepr) -> Result<Self> {
        let PointRepr::Point {
            coordinates: [lng, lat],
        } = repr;
        GeoPoint::new(lat, lng)
    }
}

/// A closed GeoJSON polygon with a single exterior ring.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "PolygonRepr")]
pub struct Polygon {
    ring: Vec<Coordinates>,
}

impl Polygon {
    /// Returns the exterior ring. The first and last positions are equal.
    pub fn ring(&self) -> &[Coordinates] {
        &self.ring
    }
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum PolygonRepr {
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
}

impl From<Polygon> for PolygonRepr {
    fn from(p: Polygon) -> Self {
        PolygonRepr::Polygon {
            coordinates: vec![p.ring.into_iter().map(Coordinates::position).collect()],
        }
    }
}

/// An axis-aligned region derived from two corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingRegion {
    south: f64,
    west: f64,
    north: f64,
    east: f64,
}

impl BoundingRegion {
    /// Returns the south-west corner.
    pub fn south_west(&self) -> Coordinates {
        Coordinates::new(self.south, self.west)
    }

    /// Returns the north-east corner.
    pub fn north_east(&self) -> Coordinates {
        Coordinates::new(self.north, self.east)
    }

    /// Returns `true` if the point lies inside the region or on its boundary.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.south..=self.north).contains(&point.lat)
            && (self.west..=self.east).contains(&point.lng)
    }

    /// Renders the region as a closed counter-clockwise polygon.
    pub fn polygon(&self) -> Polygon {
        let sw = Coordinates::new(self.south, self.west);
        let se = Coordinates::new(self.south, self.east);
        let ne = Coordinates::new(self.north, self.east);
        let nw = Coordinates::new(self.north, self.west);
        Polygon {
            ring: vec![sw, se, ne, nw, sw],
        }
    }
}

/// Translates two corners into a bounding region.
///
/// The arguments are named after the usual caller intent, but nothing
/// assumes `top_right` really is north-east of `bottom_left`.
///
/// # Errors
///
/// Returns `Error::Validation` if either corner is malformed.
///
/// # Examples
///
/// ```
/// use cat_gateway::geo::{translate_bounds, Coordinates, GeoPoint};
///
/// // Corners swapped on purpose.
/// let region = translate_bounds(
///     Coordinates::new(60.0, 24.0),
///     Coordinates::new(61.0, 25.0),
/// )
/// .unwrap();
///
/// assert!(region.contains(&GeoPoint::new(60.5, 24.5).unwrap()));
/// assert_eq!(region.north_east(), Coordinates::new(61.0, 25.0));
/// ```
pub fn translate_bounds(top_right: Coordinates, bottom_left: Coordinates) -> Result<BoundingRegion> {
    top_right.validate()?;
    bottom_left.validate()?;

    Ok(BoundingRegion {
        south: top_right.lat.min(bottom_left.lat),
        west: top_right.lng.min(bottom_left.lng),
        north: top_right.lat.max(bottom_left.lat),
        east: top_right.lng.max(bottom_left.lng),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn region(tr: (f64, f64), bl: (f64, f64)) -> BoundingRegion {
        translate_bounds(Coordinates::new(tr.0, tr.1), Coordinates::new(bl.0, bl.1)).unwrap()
    }

    #[test]
    fn ordered_corners_span_rectangle() {
        let r = region((61.0, 25.0), (60.0, 24.0));
        assert_eq!(r.south_west(), Coordinates::new(60.0, 24.0));
        assert_eq!(r.north_east(), Coordinates::new(61.0, 25.0));
    }

    #[test]
    fn swapped_corners_are_normalized() {
        let ordered = region((61.0, 25.0), (60.0, 24.0));
        assert_eq!(region((60.0, 24.0), (61.0, 25.0)), ordered);
        // Mixed: north-west and south-east supplied
        assert_eq!(region((61.0, 24.0), (60.0, 25.0)), ordered);
    }

    #[test]
    fn boundary_points_are_inside() {
        let r = region((61.0, 25.0), (60.0, 24.0));
        assert!(r.contains(&GeoPoint::new(60.0, 24.0).unwrap()));
        assert!(r.contains(&GeoPoint::new(61.0, 24.5).unwrap()));
        assert!(!r.contains(&GeoPoint::new(61.000_001, 24.5).unwrap()));
        assert!(!r.contains(&GeoPoint::new(60.5, 23.999_999).unwrap()));
    }

    #[test]
    fn rejects_malformed_input() {
        let ok = Coordinates::new(0.0, 0.0);
        assert!(matches!(
            translate_bounds(Coordinates::new(f64::NAN, 0.0), ok),
            Err(Error::Validation(_))
        ));
        assert!(translate_bounds(ok, Coordinates::new(0.0, f64::INFINITY)).is_err());
        assert!(translate_bounds(Coordinates::new(91.0, 0.0), ok).is_err());
        assert!(translate_bounds(ok, Coordinates::new(0.0, -180.5)).is_err());
    }

    #[test]
    fn polygon_is_closed_geojson() {
        let r = region((61.0, 25.0), (60.0, 24.0));
        let value = serde_json::to_value(r.polygon()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "Polygon",
                "coordinates": [[
                    [24.0, 60.0],
                    [25.0, 60.0],
                    [25.0, 61.0],
                    [24.0, 61.0],
                    [24.0, 60.0]
                ]]
            })
        );
        let ring = r.polygon();
        assert_eq!(ring.ring().first(), ring.ring().last());
    }

    #[test]
    fn point_uses_lng_lat_order() {
        let p = GeoPoint::new(60.2, 24.9).unwrap();
        assert_eq!((p.lat(), p.lng()), (60.2, 24.9));
        let value = serde_json::to_value(p).unwrap();
        assert_eq!(value, json!({"type": "Point", "coordinates": [24.9, 60.2]}));

        let back: GeoPoint = serde_json::from_value(value).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn point_rejects_out_of_range_on_deserialize() {
        let bad = json!({"type": "Point", "coordinates": [24.9, 95.0]});
        assert!(serde_json::from_value::<GeoPoint>(bad).is_err());
    }
}
