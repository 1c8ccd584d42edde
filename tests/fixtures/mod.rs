//! Test fixtures for fuel-planner.
//!
//! Provides:
//! - Synthetic equatorial routes, where planar and great-circle geometry agree
//! - A scripted routing provider with configurable failures
//! - Real I-80 corridor coordinates (see `i80`)

#![allow(dead_code)]

pub mod i80;

use std::sync::Mutex;

use fuel_planner::catalog::Facility;
use fuel_planner::geo::GeoPoint;
use fuel_planner::haversine::{EARTH_RADIUS_KM, miles_to_km};
use fuel_planner::polyline::Polyline;
use fuel_planner::traits::{RouteProvider, RoutingError};

pub fn km_per_degree() -> f64 {
    EARTH_RADIUS_KM * 1f64.to_radians()
}

/// Longitude on the equator `miles` east of 0°.
pub fn lon_at_miles(miles: f64) -> f64 {
    miles_to_km(miles) / km_per_degree()
}

/// Point on the equator at `miles` from the origin, shifted north by
/// `offset_km`.
pub fn equator_point(miles: f64, offset_km: f64) -> GeoPoint {
    GeoPoint::new(offset_km / km_per_degree(), lon_at_miles(miles))
}

/// Eastbound equatorial route of `miles` with a vertex every `step_miles`.
pub fn equator_route(miles: f64, step_miles: f64) -> Vec<GeoPoint> {
    let steps = (miles / step_miles).round() as usize;
    (0..=steps)
        .map(|i| equator_point(i as f64 * step_miles, 0.0))
        .collect()
}

pub fn facility(id: u64, location: GeoPoint, price: f64) -> Facility {
    Facility {
        id,
        name: format!("TRUCK STOP #{id}"),
        address: format!("EXIT {id}"),
        city: "Testville".to_string(),
        state: "TX".to_string(),
        rack_id: None,
        price,
        location: Some(location),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refinement {
    /// Return the waypoints as the refined geometry.
    Echo,
    Fail,
}

/// Routing provider that serves a fixed base geometry and records calls.
pub struct ScriptedRouter {
    base: Option<Vec<GeoPoint>>,
    refinement: Refinement,
    calls: Mutex<Vec<Vec<GeoPoint>>>,
}

impl ScriptedRouter {
    pub fn new(base: Vec<GeoPoint>, refinement: Refinement) -> Self {
        Self {
            base: Some(base),
            refinement,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every request fails.
    pub fn offline() -> Self {
        Self {
            base: None,
            refinement: Refinement::Fail,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<GeoPoint>> {
        self.calls.lock().unwrap().clone()
    }
}

impl RouteProvider for ScriptedRouter {
    fn route(&self, waypoints: &[GeoPoint], _simplify: bool) -> Result<Polyline, RoutingError> {
        self.calls.lock().unwrap().push(waypoints.to_vec());
        if waypoints.len() == 2 {
            return self
                .base
                .clone()
                .map(Polyline::new)
                .ok_or(RoutingError::Status(503));
        }
        match self.refinement {
            Refinement::Echo => Ok(Polyline::new(waypoints.to_vec())),
            Refinement::Fail => Err(RoutingError::Status(504)),
        }
    }
}
