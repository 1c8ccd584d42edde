//! Trip planning: markers, stop selection, route refinement.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::context::FacilityContext;
use crate::geo::GeoPoint;
use crate::haversine::{km_to_miles, miles_to_km};
use crate::route::RouteCurve;
use crate::selector::{SelectOptions, SelectedStop, StopQuery, StopSelector};
use crate::traits::{RouteProvider, RoutingError};

/// Maximum driving distance between stops, miles.
pub const MILES_PER_STOP: f64 = 450.0;
/// Initial search radius around a marker, miles.
pub const MAX_DEVIATION_MILES: f64 = 20.0;
/// Shortest leg honored from configuration, miles. Smaller values are raised
/// to it so the marker count stays proportional to the route length.
pub const MIN_MILES_PER_STOP: f64 = 1.0;
/// Search radii tried in order until one yields a stop, miles.
pub const RADIUS_LADDER_MILES: [f64; 4] = [MAX_DEVIATION_MILES, 50.0, 100.0, 150.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub miles_per_stop: f64,
    pub radius_ladder_miles: Vec<f64>,
    pub select: SelectOptions,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            miles_per_stop: MILES_PER_STOP,
            radius_ladder_miles: RADIUS_LADDER_MILES.to_vec(),
            select: SelectOptions::default(),
        }
    }
}

/// Outcome of one planning request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripPlanResult {
    /// Stops in route order.
    pub stops: Vec<SelectedStop>,
    /// Simplified route the stops were searched against.
    pub base_route: RouteCurve,
    /// Route through all stops, or `base_route` when refinement was not
    /// needed or failed.
    pub final_route: RouteCurve,
    /// Length of `base_route`, miles.
    pub total_miles: f64,
    /// The routing service failed and `base_route` is a straight line.
    pub straight_line_fallback: bool,
    /// `final_route` came from a successful waypoint request.
    pub route_refined: bool,
}

pub struct TripPlanner<'a, R> {
    context: &'a FacilityContext,
    router: R,
    config: PlannerConfig,
}

impl<'a, R: RouteProvider> TripPlanner<'a, R> {
    /// Creates a planner over a shared facility context.
    pub fn new(context: &'a FacilityContext, router: R, config: PlannerConfig) -> Self {
        Self {
            context,
            router,
            config,
        }
    }

    /// Returns the planner configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plans fuel stops between `start` and `end`.
    ///
    /// Never fails: routing errors degrade to a straight-line base route or
    /// an unrefined final route, and markers without any eligible facility
    /// are skipped.
    pub fn plan_trip(&self, start: GeoPoint, end: GeoPoint) -> TripPlanResult {
        let (base_route, straight_line_fallback) = self.base_route(start, end);
        let total_miles = km_to_miles(base_route.total_km());

        let markers = self.markers_km(total_miles);
        if markers.is_empty() {
            info!(total_miles, "route shorter than one leg, no stops needed");
            return TripPlanResult {
                stops: Vec::new(),
                final_route: base_route.clone(),
                base_route,
                total_miles,
                straight_line_fallback,
                route_refined: false,
            };
        }

        let selector = StopSelector::new(self.context, &self.config.select);
        let mut stops: Vec<SelectedStop> = Vec::with_capacity(markers.len());
        let mut min_route_km = 0.0;

        for (marker, &marker_km) in markers.iter().enumerate() {
            match self.select_for_marker(&selector, &base_route, marker_km, min_route_km) {
                Some(stop) => {
                    debug!(
                        marker,
                        facility = %stop.facility.name,
                        route_km = stop.route_km,
                        score = stop.score,
                        "stop selected"
                    );
                    min_route_km = stop.route_km;
                    stops.push(stop);
                }
                None => warn!(marker, marker_km, "no facility within any search radius, skipping marker"),
            }
        }

        let (final_route, route_refined) = if stops.is_empty() {
            (base_route.clone(), false)
        } else {
            match self.refine(start, end, &stops) {
                Ok(route) => (route, true),
                Err(err) => {
                    warn!(error = %err, "waypoint route failed, keeping base route");
                    (base_route.clone(), false)
                }
            }
        };

        info!(
            total_miles,
            markers = markers.len(),
            stops = stops.len(),
            route_refined,
            "trip planned"
        );

        TripPlanResult {
            stops,
            base_route,
            final_route,
            total_miles,
            straight_line_fallback,
            route_refined,
        }
    }

    /// Marker positions (km) at every whole multiple of the leg length that
    /// fits within `total_miles`. Positive legs shorter than
    /// [`MIN_MILES_PER_STOP`] are raised to it.
    pub fn markers_km(&self, total_miles: f64) -> Vec<f64> {
        let leg = self.config.miles_per_stop;
        if leg.is_nan() || leg <= 0.0 || !total_miles.is_finite() {
            return Vec::new();
        }
        let leg = leg.max(MIN_MILES_PER_STOP);
        if total_miles < leg {
            return Vec::new();
        }
        let count = (total_miles / leg).floor() as usize;
        (1..=count).map(|i| miles_to_km(i as f64 * leg)).collect()
    }

    fn base_route(&self, start: GeoPoint, end: GeoPoint) -> (RouteCurve, bool) {
        let route = self
            .router
            .route(&[start, end], true)
            .and_then(|polyline| RouteCurve::from_polyline(polyline).ok_or(RoutingError::EmptyGeometry));

        match route {
            Ok(route) => (route, false),
            Err(err) => {
                warn!(error = %err, "routing failed, using straight line");
                (RouteCurve::straight(start, end), true)
            }
        }
    }

    fn select_for_marker(
        &self,
        selector: &StopSelector<'_>,
        route: &RouteCurve,
        marker_km: f64,
        min_route_km: f64,
    ) -> Option<SelectedStop> {
        let position = route.point_at_distance(marker_km);

        self.config.radius_ladder_miles.iter().find_map(|&radius_miles| {
            let query = StopQuery {
                target: position.point,
                segment: position.segment,
                min_route_km,
                radius_km: miles_to_km(radius_miles),
            };
            let stop = selector.select_stop(route, &query);
            if stop.is_none() {
                debug!(marker_km, radius_miles, "no eligible facility, widening search");
            }
            stop
        })
    }

    fn refine(&self, start: GeoPoint, end: GeoPoint, stops: &[SelectedStop]) -> Result<RouteCurve, RoutingError> {
        let mut waypoints = Vec::with_capacity(stops.len() + 2);
        waypoints.push(start);
        waypoints.extend(stops.iter().map(|stop| stop.location));
        waypoints.push(end);

        let polyline = self.router.route(&waypoints, true)?;
        RouteCurve::from_polyline(polyline).ok_or(RoutingError::EmptyGeometry)
    }
}
