//! OSRM HTTP adapter for route geometry.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geo::GeoPoint;
use crate::polyline::{OSRM_PRECISION, Polyline};
use crate::traits::{RouteProvider, RoutingError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    /// Timeout for plain start/end requests.
    pub timeout_secs: u64,
    /// Timeout for requests with intermediate waypoints.
    pub waypoint_timeout_secs: u64,
    /// Snapping radius per waypoint, meters. When set, a rejected request is
    /// retried once without it.
    pub snap_radius_m: Option<f64>,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "driving".to_string(),
            timeout_secs: 10,
            waypoint_timeout_secs: 20,
            snap_radius_m: Some(5000.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    /// Builds the HTTP client with the plain-request timeout as default.
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &OsrmConfig {
        &self.config
    }

    fn route_url(&self, waypoints: &[GeoPoint], simplify: bool, snap: Option<f64>) -> String {
        let coords = waypoints
            .iter()
            .map(|p| format!("{:.6},{:.6}", p.lon, p.lat))
            .collect::<Vec<_>>()
            .join(";");
        let overview = if simplify { "simplified" } else { "full" };

        let mut url = format!(
            "{}/route/v1/{}/{}?overview={}&geometries=polyline&steps=false",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            coords,
            overview
        );
        if let Some(radius) = snap {
            let radiuses = vec![format!("{radius}"); waypoints.len()].join(";");
            url.push_str("&radiuses=");
            url.push_str(&radiuses);
        }
        url
    }

    /// Requests through intermediate waypoints get the longer timeout.
    fn timeout_for(&self, waypoint_count: usize) -> Duration {
        let secs = if waypoint_count > 2 {
            self.config.waypoint_timeout_secs
        } else {
            self.config.timeout_secs
        };
        Duration::from_secs(secs)
    }

    fn request(&self, waypoints: &[GeoPoint], simplify: bool, snap: Option<f64>) -> Result<Polyline, RoutingError> {
        let response = self
            .client
            .get(self.route_url(waypoints, simplify, snap))
            .timeout(self.timeout_for(waypoints.len()))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(RoutingError::Status(status.as_u16()));
        }

        response.json::<OsrmRouteResponse>()?.into_polyline()
    }
}

impl RouteProvider for OsrmClient {
    fn route(&self, waypoints: &[GeoPoint], simplify: bool) -> Result<Polyline, RoutingError> {
        if waypoints.len() < 2 {
            return Err(RoutingError::TooFewWaypoints(waypoints.len()));
        }

        match self.request(waypoints, simplify, self.config.snap_radius_m) {
            Err(RoutingError::Status(status)) if self.config.snap_radius_m.is_some() => {
                debug!(status, "route request rejected, retrying without snap radius");
                self.request(waypoints, simplify, None)
            }
            other => other,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: String,
}

impl OsrmRouteResponse {
    fn into_polyline(self) -> Result<Polyline, RoutingError> {
        if self.code != "Ok" {
            return Err(RoutingError::NoRoute {
                code: self.code,
                message: self.message.unwrap_or_default(),
            });
        }

        let route = self.routes.into_iter().next().ok_or_else(|| RoutingError::NoRoute {
            code: "Ok".to_string(),
            message: "response contained no routes".to_string(),
        })?;

        let polyline = Polyline::decode(&route.geometry, OSRM_PRECISION)?;
        if polyline.is_empty() {
            return Err(RoutingError::EmptyGeometry);
        }
        Ok(polyline)
    }
}
