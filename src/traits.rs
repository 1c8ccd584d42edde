//! Seams to the external collaborators the planner depends on.
//!
//! The planning core only ever talks to routing and geocoding services
//! through these traits, so hosts can swap OSRM/Nominatim for anything else
//! (or for fixtures in tests).

use thiserror::Error;

use crate::geo::GeoPoint;
use crate::polyline::{Polyline, PolylineError};

/// Failure of the routing collaborator.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("a route needs at least 2 waypoints, got {0}")]
    TooFewWaypoints(usize),
    #[error("routing request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("routing service answered with status {0}")]
    Status(u16),
    #[error("routing service found no route ({code}): {message}")]
    NoRoute { code: String, message: String },
    #[error("route geometry could not be decoded: {0}")]
    Geometry(#[from] PolylineError),
    #[error("route geometry is empty")]
    EmptyGeometry,
}

/// Failure of the geocoding collaborator. "Not found" is not an error.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("geocoding service answered with status {0}")]
    Status(u16),
    #[error("geocoding service returned an unparseable coordinate: {0}")]
    InvalidCoordinate(String),
}

/// Provides road geometry through an ordered list of waypoints.
pub trait RouteProvider {
    /// Returns the path through `waypoints` in order.
    ///
    /// `simplify` asks the provider for a reduced-density geometry, which is
    /// what the stop search runs against.
    fn route(&self, waypoints: &[GeoPoint], simplify: bool) -> Result<Polyline, RoutingError>;
}

/// Resolves free-text addresses to coordinates.
pub trait Geocoder {
    /// `Ok(None)` means the service answered but found nothing.
    fn resolve(&self, address: &str) -> Result<Option<GeoPoint>, GeocodeError>;
}

impl<T: RouteProvider + ?Sized> RouteProvider for &T {
    fn route(&self, waypoints: &[GeoPoint], simplify: bool) -> Result<Polyline, RoutingError> {
        (**self).route(waypoints, simplify)
    }
}

impl<T: Geocoder + ?Sized> Geocoder for &T {
    fn resolve(&self, address: &str) -> Result<Option<GeoPoint>, GeocodeError> {
        (**self).resolve(address)
    }
}
