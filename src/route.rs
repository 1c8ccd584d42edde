//! Distance-parameterized route curve.
//!
//! A `RouteCurve` pairs an ordered point sequence with the cumulative
//! great-circle distance at each point, so positions along the route can be
//! addressed in kilometers. Curves are immutable; new geometry means a new
//! curve.

use serde::Serialize;

use crate::geo::GeoPoint;
use crate::haversine::{haversine_km, haversine_km_many};
use crate::polyline::Polyline;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteCurve {
    points: Vec<GeoPoint>,
    cumdist: Vec<f64>,
}

/// Result of [`RouteCurve::point_at_distance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePosition {
    pub point: GeoPoint,
    /// Index of the segment containing the point (segment `i` runs from
    /// point `i` to point `i + 1`).
    pub segment: usize,
    /// Fraction along that segment, in [0, 1].
    pub fraction: f64,
}

/// One segment of a curve together with its along-route offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: GeoPoint,
    pub end: GeoPoint,
    /// Cumulative route distance at `start`, km.
    pub base_km: f64,
    pub length_km: f64,
}

impl RouteCurve {
    /// Builds a curve from an ordered point sequence. Returns `None` for an
    /// empty sequence.
    pub fn new(points: Vec<GeoPoint>) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let legs = haversine_km_many(&points[..points.len() - 1], &points[1..]);
        let mut cumdist = Vec::with_capacity(points.len());
        let mut total = 0.0;
        cumdist.push(total);
        for leg in legs {
            total += leg;
            cumdist.push(total);
        }

        Some(Self { points, cumdist })
    }

    /// Two-point curve from `from` to `to`.
    /// Two-point curve from `from` to `to`.
    pub fn straight(from: GeoPoint, to: GeoPoint) -> Self {
        Self {
            points: vec![from, to],
            cumdist: vec![0.0, haversine_km(from, to)],
        }
    }

    /// Builds a curve from decoded geometry; `None` when it has no points.
    pub fn from_polyline(polyline: Polyline) -> Option<Self> {
        Self::new(polyline.into_points())
    }

    /// Route points in travel order.
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    /// Cumulative distance (km) at each point; `cumulative_km()[0] == 0`.
    pub fn cumulative_km(&self) -> &[f64] {
        &self.cumdist
    }

    /// Length of the whole curve, km.
    pub fn total_km(&self) -> f64 {
        self.cumdist[self.cumdist.len() - 1]
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed curve.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of addressable segments. A single-point curve has one
    /// degenerate, zero-length segment.
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1).max(1)
    }

    /// Segment `index`, clamped to the last segment.
    pub fn segment(&self, index: usize) -> Segment {
        let last = self.points.len() - 1;
        let start_idx = index.min(self.segment_count() - 1);
        let end_idx = (start_idx + 1).min(last);
        Segment {
            start: self.points[start_idx],
            end: self.points[end_idx],
            base_km: self.cumdist[start_idx],
            length_km: self.cumdist[end_idx] - self.cumdist[start_idx],
        }
    }

    /// Locates the point `target_km` along the route.
    ///
    /// Coordinates are interpolated linearly in lat/lon within the segment,
    /// which is close enough at route-segment scale.
    pub fn point_at_distance(&self, target_km: f64) -> CurvePosition {
        let last = self.points.len() - 1;
        if target_km >= self.total_km() {
            return CurvePosition {
                point: self.points[last],
                segment: self.segment_count() - 1,
                fraction: 1.0,
            };
        }

        let idx = self.cumdist.partition_point(|&d| d <= target_km);
        let prev = idx.saturating_sub(1);

        let start_km = self.cumdist[prev];
        let seg_len = self.cumdist[idx] - start_km;
        let fraction = if seg_len > 0.0 {
            (target_km - start_km) / seg_len
        } else {
            0.0
        };

        let a = self.points[prev];
        let b = self.points[idx];
        CurvePosition {
            point: GeoPoint::new(
                a.lat + fraction * (b.lat - a.lat),
                a.lon + fraction * (b.lon - a.lon),
            ),
            segment: prev,
            fraction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn km_per_degree() -> f64 {
        crate::haversine::EARTH_RADIUS_KM * 1f64.to_radians()
    }

    fn equator(lons: &[f64]) -> RouteCurve {
        RouteCurve::new(lons.iter().map(|&lon| GeoPoint::new(0.0, lon)).collect()).unwrap()
    }

    #[test]
    fn test_empty_is_none() {
        assert!(RouteCurve::new(vec![]).is_none());
    }

    #[test]
    fn test_cumdist_starts_at_zero_and_never_decreases() {
        let curve = RouteCurve::new(vec![
            GeoPoint::new(36.17, -115.14),
            GeoPoint::new(36.17, -115.14),
            GeoPoint::new(35.0, -117.0),
            GeoPoint::new(34.05, -118.24),
        ])
        .unwrap();
        let cumdist = curve.cumulative_km();
        assert_eq!(cumdist[0], 0.0);
        assert!(cumdist.windows(2).all(|w| w[1] >= w[0]));
        assert_eq!(cumdist[1], 0.0);
        assert_eq!(curve.total_km(), cumdist[3]);
    }

    #[test]
    fn test_point_at_zero_is_first_point() {
        let curve = equator(&[0.0, 1.0, 2.0]);
        let pos = curve.point_at_distance(0.0);
        assert_eq!(pos.point, GeoPoint::new(0.0, 0.0));
        assert_eq!(pos.segment, 0);
        assert_eq!(pos.fraction, 0.0);
    }

    #[test]
    fn test_point_at_or_beyond_total_is_last_point() {
        let curve = equator(&[0.0, 1.0, 2.0]);
        for target in [curve.total_km(), curve.total_km() + 50.0] {
            let pos = curve.point_at_distance(target);
            assert_eq!(pos.point, GeoPoint::new(0.0, 2.0));
            assert_eq!(pos.segment, 1);
            assert_eq!(pos.fraction, 1.0);
        }
    }

    #[test]
    fn test_point_interpolates_within_segment() {
        let curve = equator(&[0.0, 1.0, 2.0]);
        let pos = curve.point_at_distance(1.5 * km_per_degree());
        assert_eq!(pos.segment, 1);
        assert!((pos.fraction - 0.5).abs() < 1e-9);
        assert!((pos.point.lon - 1.5).abs() < 1e-9);
        assert_eq!(pos.point.lat, 0.0);
    }

    #[test]
    fn test_point_on_vertex_starts_next_segment() {
        let curve = equator(&[0.0, 1.0, 2.0]);
        let pos = curve.point_at_distance(curve.cumulative_km()[1]);
        assert_eq!(pos.segment, 1);
        assert_eq!(pos.fraction, 0.0);
        assert_eq!(pos.point, GeoPoint::new(0.0, 1.0));
    }

    #[test]
    fn test_single_point_curve() {
        let curve = RouteCurve::new(vec![GeoPoint::new(10.0, 20.0)]).unwrap();
        assert_eq!(curve.total_km(), 0.0);
        assert_eq!(curve.segment_count(), 1);

        let seg = curve.segment(0);
        assert_eq!(seg.start, seg.end);
        assert_eq!(seg.length_km, 0.0);

        let pos = curve.point_at_distance(0.0);
        assert_eq!(pos.point, GeoPoint::new(10.0, 20.0));
        assert_eq!(pos.segment, 0);
        assert_eq!(pos.fraction, 1.0);
    }

    #[test]
    fn test_straight_matches_new() {
        let a = GeoPoint::new(41.88, -87.63);
        let b = GeoPoint::new(39.74, -104.99);
        assert_eq!(RouteCurve::straight(a, b), RouteCurve::new(vec![a, b]).unwrap());
    }

    #[test]
    fn test_segment_offsets() {
        let curve = equator(&[0.0, 1.0, 3.0]);
        let seg = curve.segment(1);
        assert_eq!(seg.start, GeoPoint::new(0.0, 1.0));
        assert_eq!(seg.end, GeoPoint::new(0.0, 3.0));
        assert!((seg.base_km - km_per_degree()).abs() < 1e-9);
        assert!((seg.length_km - 2.0 * km_per_degree()).abs() < 1e-9);
        // Clamped past the end.
        assert_eq!(curve.segment(10), seg);
    }
}
