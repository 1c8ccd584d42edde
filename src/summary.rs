//! Fuel and cost summary for a planned trip.

use serde::{Deserialize, Serialize};

use crate::planner::TripPlanResult;

/// Assumed truck fuel economy, miles per gallon.
pub const DEFAULT_MPG: f64 = 10.0;
/// Price assumed when a trip needs no stops, dollars per gallon.
pub const FALLBACK_PRICE: f64 = 3.80;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelEconomy {
    pub mpg: f64,
    pub fallback_price: f64,
}

impl Default for FuelEconomy {
    fn default() -> Self {
        Self {
            mpg: DEFAULT_MPG,
            fallback_price: FALLBACK_PRICE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripSummary {
    pub total_distance_miles: f64,
    pub total_fuel_gallons: f64,
    pub average_price: f64,
    pub total_fuel_cost: f64,
    pub stop_count: usize,
}

impl TripSummary {
    /// Fuel for the whole trip priced at the mean price of the selected
    /// stops (or the fallback price when there are none).
    pub fn from_plan(plan: &TripPlanResult, economy: &FuelEconomy) -> Self {
        let total_fuel_gallons = plan.total_miles / economy.mpg;
        let average_price = if plan.stops.is_empty() {
            economy.fallback_price
        } else {
            plan.stops.iter().map(|stop| stop.facility.price).sum::<f64>() / plan.stops.len() as f64
        };

        Self {
            total_distance_miles: plan.total_miles,
            total_fuel_gallons,
            average_price,
            total_fuel_cost: total_fuel_gallons * average_price,
            stop_count: plan.stops.len(),
        }
    }
}
