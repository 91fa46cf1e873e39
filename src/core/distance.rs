use crate::models::{BoundingBox, Coordinates};

/// Earth's mean radius in miles
const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Approximate length of one degree of latitude in miles
const MILES_PER_DEGREE: f64 = 69.0;

/// Calculate the Haversine distance between two points in miles
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in miles
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Haversine distance in miles between two coordinate pairs
#[inline]
pub fn distance_between(a: &Coordinates, b: &Coordinates) -> f64 {
    haversine_distance(a.latitude, a.longitude, b.latitude, b.longitude)
}

/// Calculate a bounding box around a center point
///
/// Used to shrink the candidate pool before the exact Haversine check.
/// 1° latitude ≈ 69 miles, 1° longitude ≈ 69 miles * cos(latitude).
/// The box is widened slightly so it always contains the full circle, and
/// falls back to the whole longitude range near the poles or when it would
/// wrap across the antimeridian.
///
/// # Arguments
/// * `lat` - Center latitude in degrees
/// * `lon` - Center longitude in degrees
/// * `radius_miles` - Radius in miles
pub fn calculate_bounding_box(lat: f64, lon: f64, radius_miles: f64) -> BoundingBox {
    let lat_delta = radius_miles / MILES_PER_DEGREE * 1.01;

    let min_lat = (lat - lat_delta).max(-90.0);
    let max_lat = (lat + lat_delta).min(90.0);

    // The widest parallel inside the box decides the longitude span
    let widest = lat.abs() + lat_delta;
    if widest >= 90.0 {
        return BoundingBox {
            min_lat,
            max_lat,
            min_lon: -180.0,
            max_lon: 180.0,
        };
    }

    let lon_delta = lat_delta / widest.to_radians().cos();
    let (min_lon, max_lon) = (lon - lon_delta, lon + lon_delta);

    if min_lon < -180.0 || max_lon > 180.0 {
        return BoundingBox {
            min_lat,
            max_lat,
            min_lon: -180.0,
            max_lon: 180.0,
        };
    }

    BoundingBox {
        min_lat,
        max_lat,
        min_lon,
        max_lon,
    }
}

/// Check if a point is within a bounding box
#[inline]
pub fn is_within_bounding_box(
    lat: f64,
    lon: f64,
    bbox: &BoundingBox,
) -> bool {
    lat >= bbox.min_lat
        && lat <= bbox.max_lat
        && lon >= bbox.min_lon
        && lon <= bbox.max_lon
}
