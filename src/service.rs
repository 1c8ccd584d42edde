//! Address-to-plan entry point.

use thiserror::Error;
use tracing::warn;

use crate::geo::GeoPoint;
use crate::planner::{TripPlanResult, TripPlanner};
use crate::summary::{FuelEconomy, TripSummary};
use crate::traits::{GeocodeError, Geocoder, RouteProvider};

#[derive(Debug, Error)]
pub enum TripRequestError {
    #[error("both origin and destination are required")]
    MissingAddress,
    #[error("location not found: {0}")]
    NotFound(String),
    #[error("geocoding unavailable: {0}")]
    Geocoding(#[from] GeocodeError),
}

/// A planned trip for two addresses.
#[derive(Debug, Clone)]
pub struct TripPlan {
    pub origin: String,
    pub destination: String,
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub plan: TripPlanResult,
    pub summary: TripSummary,
}

pub struct TripService<'a, G, R> {
    geocoder: G,
    planner: TripPlanner<'a, R>,
    economy: FuelEconomy,
}

impl<'a, G: Geocoder, R: RouteProvider> TripService<'a, G, R> {
    /// Combines a geocoder, a planner and fuel-economy settings.
    pub fn new(geocoder: G, planner: TripPlanner<'a, R>, economy: FuelEconomy) -> Self {
        Self {
            geocoder,
            planner,
            economy,
        }
    }

    /// Geocodes both addresses, plans the trip and summarizes its cost.
    ///
    /// An address the geocoder cannot place is [`TripRequestError::NotFound`];
    /// a geocoder failure is [`TripRequestError::Geocoding`].
    pub fn plan_between(&self, origin: &str, destination: &str) -> Result<TripPlan, TripRequestError> {
        if origin.trim().is_empty() || destination.trim().is_empty() {
            return Err(TripRequestError::MissingAddress);
        }

        let start = self.locate(origin)?;
        let end = self.locate(destination)?;

        let plan = self.planner.plan_trip(start, end);
        let summary = TripSummary::from_plan(&plan, &self.economy);

        Ok(TripPlan {
            origin: origin.to_string(),
            destination: destination.to_string(),
            start,
            end,
            plan,
            summary,
        })
    }

    fn locate(&self, address: &str) -> Result<GeoPoint, TripRequestError> {
        match self.geocoder.resolve(address) {
            Ok(Some(point)) => Ok(point),
            Ok(None) => Err(TripRequestError::NotFound(address.to_string())),
            Err(err) => {
                warn!(address, error = %err, "geocoding failed");
                Err(err.into())
            }
        }
    }
}
