use crate::models::{BoundingBox, Coordinate};

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Sentinel returned when a distance cannot be computed.
///
/// Callers must read it as "unknown / infinitely far", never as a measurement.
pub const UNKNOWN_DISTANCE: f64 = f64::MAX;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance between two optional coordinates, rounded to the nearest kilometer
///
/// Returns [`UNKNOWN_DISTANCE`] when either side is absent.
pub fn distance_km(from: Option<Coordinate>, to: Option<Coordinate>) -> f64 {
    match (from, to) {
        (Some(a), Some(b)) => {
            haversine_distance(a.latitude, a.longitude, b.latitude, b.longitude).round()
        }
        _ => UNKNOWN_DISTANCE,
    }
}

/// Calculate a bounding box around a center point
///
/// Cheaper than Haversine, so it runs first when ranking by radius. The box
/// always contains the whole circle: longitudes may run past ±180°, and a
/// circle reaching a pole spans every longitude.
pub fn calculate_bounding_box(lat: f64, lon: f64, radius_km: f64) -> BoundingBox {
    let angular = radius_km / EARTH_RADIUS_KM;
    let lat_delta = angular.to_degrees();

    let cos_lat = lat.to_radians().cos();
    let lon_delta = if lat + lat_delta >= 90.0 || lat - lat_delta <= -90.0 || angular.sin() >= cos_lat {
        180.0
    } else {
        (angular.sin() / cos_lat).asin().to_degrees()
    };

    BoundingBox {
        min_lat: lat - lat_delta,
        max_lat: lat + lat_delta,
        min_lon: lon - lon_delta,
        max_lon: lon + lon_delta,
    }
}

/// Check if a point is within a bounding box, wrapping across the antimeridian
#[inline]
pub fn is_within_bounding_box(lat: f64, lon: f64, bbox: &BoundingBox) -> bool {
    if lat < bbox.min_lat || lat > bbox.max_lat {
        return false;
    }
    [lon, lon - 360.0, lon + 360.0]
        .iter()
        .any(|l| *l >= bbox.min_lon && *l <= bbox.max_lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance() {
        // Milan to Rome, approximately 477 km
        let distance = haversine_distance(45.4642, 9.1900, 41.9028, 12.4964);
        assert!((distance - 477.0).abs() < 10.0, "Distance should be ~477km, got {}", distance);
    }

    #[test]
    fn test_distance_km_same_point_is_zero() {
        let point = Some(Coordinate::new(45.0, 9.0));
        assert_eq!(distance_km(point, point), 0.0);
    }

    #[test]
    fn test_distance_km_one_degree_latitude() {
        let a = Some(Coordinate::new(46.0, 9.0));
        let b = Some(Coordinate::new(45.0, 9.0));
        assert_eq!(distance_km(a, b), 111.0);
    }

    #[test]
    fn test_distance_km_is_rounded() {
        let a = Some(Coordinate::new(45.4642, 9.1900));
        let b = Some(Coordinate::new(45.4700, 9.2000));
        let d = distance_km(a, b);
        assert_eq!(d, d.round());
    }

    #[test]
    fn test_distance_km_missing_input() {
        let point = Some(Coordinate::new(45.0, 9.0));
        assert_eq!(distance_km(None, point), UNKNOWN_DISTANCE);
        assert_eq!(distance_km(point, None), UNKNOWN_DISTANCE);
    }

    #[test]
    fn test_bounding_box() {
        let bbox = calculate_bounding_box(45.4642, 9.1900, 50.0);

        assert!(bbox.min_lat < 45.4642);
        assert!(bbox.max_lat > 45.4642);
        assert!(bbox.min_lon < 9.1900);
        assert!(bbox.max_lon > 9.1900);

        // 100km / 111km per degree = ~0.9 degrees
        let lat_span = bbox.max_lat - bbox.min_lat;
        assert!((lat_span - 0.9).abs() < 0.02, "Lat span should be ~0.9 degrees");
    }

    #[test]
    fn test_point_within_bbox() {
        let bbox = calculate_bounding_box(45.4642, 9.1900, 10.0);

        assert!(is_within_bounding_box(45.4642, 9.1900, &bbox));
        assert!(is_within_bounding_box(45.47, 9.2, &bbox));
        assert!(!is_within_bounding_box(41.9, 12.5, &bbox));
    }

    #[test]
    fn test_bbox_wraps_antimeridian() {
        let bbox = calculate_bounding_box(-17.8, 179.9, 50.0);
        assert!(bbox.max_lon > 180.0);
        assert!(is_within_bounding_box(-17.8, -179.9, &bbox));
        assert!(!is_within_bounding_box(-17.8, -170.0, &bbox));
    }

    #[test]
    fn test_bbox_contains_radius_in_every_direction() {
        let (lat, lon) = (60.0, 10.0);
        let bbox = calculate_bounding_box(lat, lon, 50.0);
        // Points just inside the circle along the box edges
        assert!(haversine_distance(lat, lon, bbox.max_lat - 1e-4, lon) < 50.0);
        assert!(is_within_bounding_box(bbox.max_lat - 1e-4, lon, &bbox));
        assert!(haversine_distance(lat, lon, lat, bbox.max_lon + 1e-3) > 50.0);
    }

    #[test]
    fn test_bbox_reaching_pole_spans_all_longitudes() {
        let bbox = calculate_bounding_box(89.9, 0.0, 50.0);
        assert!(is_within_bounding_box(89.9, 180.0, &bbox));
    }
}
