//! Best-facility selection for one distance marker.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog::Facility;
use crate::context::FacilityContext;
use crate::geo::GeoPoint;
use crate::projection::{SEGMENT_WINDOW, SegmentWindow, project_onto_route};
use crate::route::RouteCurve;

/// Weight of deviation (per km) in the score.
pub const ALPHA: f64 = 1.0;
/// Weight of price (per dollar) in the score.
pub const BETA: f64 = 3.0;
/// Deviation floor so co-located facilities don't score unrealistically well.
pub const MIN_DEVIATION_KM: f64 = 0.35;
/// Tolerance on the progression filter.
pub const PROGRESS_EPSILON_KM: f64 = 1e-3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectOptions {
    pub alpha: f64,
    pub beta: f64,
    pub min_deviation_km: f64,
    pub progress_epsilon_km: f64,
    /// Half-width of the segment window around the marker's segment.
    pub segment_window: usize,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            alpha: ALPHA,
            beta: BETA,
            min_deviation_km: MIN_DEVIATION_KM,
            progress_epsilon_km: PROGRESS_EPSILON_KM,
            segment_window: SEGMENT_WINDOW,
        }
    }
}

impl SelectOptions {
    /// Lower is better.
    pub fn score(&self, deviation_km: f64, price: f64) -> f64 {
        self.alpha * deviation_km + self.beta * price
    }
}

/// An eligible facility scored against one marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopCandidate {
    /// Catalog index.
    pub facility: usize,
    /// Deviation from the route, floored at `min_deviation_km`.
    pub deviation_km: f64,
    pub route_km: f64,
    pub score: f64,
}

/// A candidate chosen as a trip stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedStop {
    pub facility_index: usize,
    pub facility: Facility,
    pub location: GeoPoint,
    pub deviation_km: f64,
    pub route_km: f64,
    pub score: f64,
}

/// Search parameters for one marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopQuery {
    /// Approximate marker position on the route.
    pub target: GeoPoint,
    /// Segment the marker falls on; centers the segment window.
    pub segment: usize,
    /// Route position of the previous stop. Candidates behind it are ignored.
    pub min_route_km: f64,
    pub radius_km: f64,
}

pub struct StopSelector<'a> {
    context: &'a FacilityContext,
    options: &'a SelectOptions,
}

impl<'a> StopSelector<'a> {
    /// Creates a selector over `context` with the given scoring options.
    pub fn new(context: &'a FacilityContext, options: &'a SelectOptions) -> Self {
        Self { context, options }
    }

    /// All facilities within the query radius that pass the progression
    /// filter, scored, in catalog-index order.
    pub fn candidates(&self, curve: &RouteCurve, query: &StopQuery) -> Vec<StopCandidate> {
        let ids = self.context.index().query_radius(query.target, query.radius_km);
        if ids.is_empty() {
            return Vec::new();
        }

        let window = SegmentWindow::around(curve, query.segment, self.options.segment_window);
        let catalog = self.context.catalog();
        let min_route_km = query.min_route_km - self.options.progress_epsilon_km;

        ids.par_iter()
            .filter_map(|&id| {
                let facility = catalog.get(id)?;
                let location = facility.location?;
                let projection = project_onto_route(curve, window, location);
                if projection.route_km < min_route_km {
                    return None;
                }
                let deviation_km = projection.deviation_km.max(self.options.min_deviation_km);
                Some(StopCandidate {
                    facility: id,
                    deviation_km,
                    route_km: projection.route_km,
                    score: self.options.score(deviation_km, facility.price),
                })
            })
            .collect()
    }

    /// The lowest-scoring candidate, or `None` when nothing eligible lies
    /// within the radius. Ties go to the lowest catalog index.
    pub fn select_stop(&self, curve: &RouteCurve, query: &StopQuery) -> Option<SelectedStop> {
        let mut best: Option<StopCandidate> = None;
        for candidate in self.candidates(curve, query) {
            match &best {
                Some(current) if candidate.score >= current.score => {}
                _ => best = Some(candidate),
            }
        }

        let best = best?;
        let facility = self.context.catalog().get(best.facility)?;
        Some(SelectedStop {
            facility_index: best.facility,
            location: facility.location?,
            facility: facility.clone(),
            deviation_km: best.deviation_km,
            route_km: best.route_km,
            score: best.score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FacilityCatalog;
    use crate::haversine::EARTH_RADIUS_KM;

    fn km_per_degree() -> f64 {
        EARTH_RADIUS_KM * 1f64.to_radians()
    }

    fn facility(id: u64, lat: f64, lon: f64, price: f64) -> Facility {
        Facility {
            id,
            name: format!("Stop {id}"),
            address: String::new(),
            city: String::new(),
            state: "TX".into(),
            rack_id: None,
            price,
            location: Some(GeoPoint::new(lat, lon)),
        }
    }

    fn route() -> RouteCurve {
        RouteCurve::new((0..=10).map(|i| GeoPoint::new(0.0, i as f64)).collect()).unwrap()
    }

    fn query(lon: f64, min_route_km: f64, radius_km: f64) -> StopQuery {
        StopQuery {
            target: GeoPoint::new(0.0, lon),
            segment: lon as usize,
            min_route_km,
            radius_km,
        }
    }

    #[test]
    fn test_score_formula() {
        let options = SelectOptions::default();
        assert!((options.score(0.35, 3.0) - 9.35).abs() < 1e-12);
        assert!((options.score(100.0, 2.0) - 106.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_facilities_in_radius() {
        let context = FacilityContext::new(FacilityCatalog::new(vec![facility(1, 0.0, 9.0, 3.0)]));
        let options = SelectOptions::default();
        let selector = StopSelector::new(&context, &options);
        assert!(selector.select_stop(&route(), &query(5.0, 0.0, 50.0)).is_none());
    }

    #[test]
    fn test_deviation_floor_applied() {
        let context = FacilityContext::new(FacilityCatalog::new(vec![facility(1, 0.0, 5.0, 3.0)]));
        let options = SelectOptions::default();
        let selector = StopSelector::new(&context, &options);
        let stop = selector.select_stop(&route(), &query(5.0, 0.0, 50.0)).unwrap();
        assert_eq!(stop.deviation_km, MIN_DEVIATION_KM);
        assert!((stop.score - 9.35).abs() < 1e-9);
        assert!((stop.route_km - 5.0 * km_per_degree()).abs() < 1e-6);
    }

    #[test]
    fn test_cheaper_nearby_facility_wins() {
        let context = FacilityContext::new(FacilityCatalog::new(vec![
            facility(1, 0.0, 5.0, 3.50),
            facility(2, 0.01, 5.1, 3.00),
        ]));
        let options = SelectOptions::default();
        let selector = StopSelector::new(&context, &options);
        let stop = selector.select_stop(&route(), &query(5.0, 0.0, 50.0)).unwrap();
        assert_eq!(stop.facility.id, 2);
    }

    #[test]
    fn test_progression_filter() {
        let context = FacilityContext::new(FacilityCatalog::new(vec![
            facility(1, 0.0, 4.9, 2.00),
            facility(2, 0.0, 5.1, 4.00),
        ]));
        let options = SelectOptions::default();
        let selector = StopSelector::new(&context, &options);
        let min_route_km = 5.0 * km_per_degree();

        let candidates = selector.candidates(&route(), &query(5.0, min_route_km, 50.0));
        assert_eq!(candidates.len(), 1);
        assert!(candidates.iter().all(|c| c.route_km >= min_route_km - PROGRESS_EPSILON_KM));

        let stop = selector.select_stop(&route(), &query(5.0, min_route_km, 50.0)).unwrap();
        assert_eq!(stop.facility.id, 2, "cheaper facility is behind the previous stop");
    }

    #[test]
    fn test_progression_epsilon_admits_same_position() {
        let context = FacilityContext::new(FacilityCatalog::new(vec![facility(1, 0.0, 5.0, 3.0)]));
        let options = SelectOptions::default();
        let selector = StopSelector::new(&context, &options);
        let min_route_km = 5.0 * km_per_degree() + 0.0005;
        assert!(selector.select_stop(&route(), &query(5.0, min_route_km, 50.0)).is_some());
        let min_route_km = 5.0 * km_per_degree() + 0.01;
        assert!(selector.select_stop(&route(), &query(5.0, min_route_km, 50.0)).is_none());
    }

    #[test]
    fn test_ties_go_to_lowest_index() {
        let context = FacilityContext::new(FacilityCatalog::new(vec![
            facility(10, 0.0, 5.0, 3.0),
            facility(11, 0.0, 5.0, 3.0),
        ]));
        let options = SelectOptions::default();
        let selector = StopSelector::new(&context, &options);
        for _ in 0..5 {
            let stop = selector.select_stop(&route(), &query(5.0, 0.0, 50.0)).unwrap();
            assert_eq!(stop.facility_index, 0);
        }
    }

    #[test]
    fn test_weights_are_configurable() {
        let context = FacilityContext::new(FacilityCatalog::new(vec![
            facility(1, 0.0, 5.0, 3.50),
            facility(2, 0.2, 5.0, 3.00),
        ]));
        // Price-only scoring picks the cheaper, farther facility.
        let price_only = SelectOptions {
            alpha: 0.0,
            ..Default::default()
        };
        let stop = StopSelector::new(&context, &price_only)
            .select_stop(&route(), &query(5.0, 0.0, 50.0))
            .unwrap();
        assert_eq!(stop.facility.id, 2);

        // Distance-only scoring picks the on-route facility.
        let distance_only = SelectOptions {
            beta: 0.0,
            ..Default::default()
        };
        let stop = StopSelector::new(&context, &distance_only)
            .select_stop(&route(), &query(5.0, 0.0, 50.0))
            .unwrap();
        assert_eq!(stop.facility.id, 1);
    }
}
