//! Projection of candidate points onto a window of route segments.
//!
//! The nearest position on each segment is located with a planar
//! equirectangular approximation (lon as x, lat as y). The reported
//! deviation is then the great-circle distance from the candidate to that
//! position, so the approximation only affects *where* on the segment the
//! candidate lands, not how far away it is reported to be.

use crate::geo::GeoPoint;
use crate::haversine::haversine_km;
use crate::route::RouteCurve;

/// Default half-width of the segment window, in segments.
pub const SEGMENT_WINDOW: usize = 200;

/// Inclusive range of segment indices searched for one marker.
///
/// The window assumes candidates lie near their expected position along the
/// route. On geometry with very uneven point density the true nearest
/// segment can fall outside it; the window is not widened to compensate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentWindow {
    pub first: usize,
    pub last: usize,
}

impl SegmentWindow {
    /// Segments `center - half_width ..= center + half_width`, clamped to the
    /// curve. A center past the end of the curve selects every segment.
    pub fn around(curve: &RouteCurve, center: usize, half_width: usize) -> Self {
        let max = curve.segment_count() - 1;
        let first = center.saturating_sub(half_width);
        let last = center.saturating_add(half_width).min(max);
        if first > last {
            return Self::full(curve);
        }
        Self { first, last }
    }

    /// Window covering every segment of `curve`.
    pub fn full(curve: &RouteCurve) -> Self {
        Self {
            first: 0,
            last: curve.segment_count() - 1,
        }
    }

    /// Number of segments in the window.
    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }
}

/// Where a candidate lands on the route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Great-circle distance from the candidate to the route, km (unfloored).
    pub deviation_km: f64,
    /// Along-route distance of the projected point, km.
    pub route_km: f64,
    pub segment: usize,
    /// Position along the segment, in [0, 1].
    pub t: f64,
}

/// Planar projection of `point` onto segment `a -> b`.
///
/// Returns the clamped parameter `t` and the projected point. A zero-length
/// segment projects to `a` with `t = 0`.
pub fn project_onto_segment(point: GeoPoint, a: GeoPoint, b: GeoPoint) -> (f64, GeoPoint) {
    let vx = b.lon - a.lon;
    let vy = b.lat - a.lat;
    let wx = point.lon - a.lon;
    let wy = point.lat - a.lat;

    let vv = vx * vx + vy * vy;
    let t = if vv > 0.0 { (wx * vx + wy * vy) / vv } else { 0.0 };
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

    (t, GeoPoint::new(a.lat + t * vy, a.lon + t * vx))
}

/// Projects `point` onto every segment in `window` and keeps the one with
/// the smallest deviation (first one wins ties).
pub fn project_onto_route(curve: &RouteCurve, window: SegmentWindow, point: GeoPoint) -> Projection {
    let project = |index: usize| {
        let segment = curve.segment(index);
        let (t, projected) = project_onto_segment(point, segment.start, segment.end);
        Projection {
            deviation_km: haversine_km(point, projected),
            route_km: segment.base_km + t * segment.length_km,
            segment: index,
            t,
        }
    };

    let mut best = project(window.first);
    for index in window.first + 1..=window.last {
        let candidate = project(index);
        if candidate.deviation_km < best.deviation_km {
            best = candidate;
        }
    }
    best
}
