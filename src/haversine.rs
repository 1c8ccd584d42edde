//! Great-circle math and the straight-line routing fallback.
//!
//! Distances use the haversine formula on a spherical Earth. Coordinates
//! are not validated here; NaN input yields NaN output.

use crate::geo::GeoPoint;
use crate::polyline::Polyline;
use crate::traits::{RouteProvider, RoutingError};

/// Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Exact statute mile length in kilometers.
pub const KM_PER_MILE: f64 = 1.609344;

/// Great-circle distance between two points in kilometers.
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lon = (to.lon - from.lon).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Pairwise great-circle distances between `from[i]` and `to[i]`.
///
/// Both slices are expected to have the same length; extra elements of the
/// longer slice are ignored.
pub fn haversine_km_many(from: &[GeoPoint], to: &[GeoPoint]) -> Vec<f64> {
    debug_assert_eq!(from.len(), to.len());
    from.iter()
        .zip(to)
        .map(|(a, b)| haversine_km(*a, *b))
        .collect()
}

/// Converts statute miles to kilometers.
pub fn miles_to_km(miles: f64) -> f64 {
    miles * KM_PER_MILE
}

/// Converts kilometers to statute miles.
pub fn km_to_miles(km: f64) -> f64 {
    km / KM_PER_MILE
}

/// Routing provider that connects waypoints with straight lines.
///
/// Ignores roads entirely but never fails, which makes it usable offline
/// and as a stand-in when the routing service is unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLineRouter;

impl RouteProvider for StraightLineRouter {
    fn route(&self, waypoints: &[GeoPoint], _simplify: bool) -> Result<Polyline, RoutingError> {
        if waypoints.len() < 2 {
            return Err(RoutingError::TooFewWaypoints(waypoints.len()));
        }
        Ok(Polyline::new(waypoints.to_vec()))
    }
}
