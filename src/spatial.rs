//! Spatial index over facility locations.
//!
//! Facilities are placed on a sphere of radius [`EARTH_RADIUS_KM`] in
//! Earth-centered cartesian coordinates and bulk-loaded into an R*-tree.
//! Straight-line (chord) distance is monotonic in great-circle distance, so
//! a chord-radius query returns a superset of the great-circle ball; the
//! superset is then filtered with [`haversine_km`], which makes results
//! identical to a linear scan using the same distance function.

use std::fmt;

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::catalog::FacilityCatalog;
use crate::geo::GeoPoint;
use crate::haversine::{EARTH_RADIUS_KM, haversine_km};

/// Slack on the chord radius so rounding never drops a boundary point.
const CHORD_SLACK_KM: f64 = 1e-6;

#[derive(Debug, Clone, Copy)]
struct IndexedFacility {
    coords: [f64; 3],
    location: GeoPoint,
    id: usize,
}

impl RTreeObject for IndexedFacility {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.coords)
    }
}

impl PointDistance for IndexedFacility {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        (self.coords[0] - point[0]).powi(2)
            + (self.coords[1] - point[1]).powi(2)
            + (self.coords[2] - point[2]).powi(2)
    }
}

/// Immutable radius-query index over the located facilities of a catalog.
pub struct FacilityIndex {
    tree: RTree<IndexedFacility>,
}

impl fmt::Debug for FacilityIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FacilityIndex").field("len", &self.len()).finish()
    }
}

impl FacilityIndex {
    /// Indexes every catalog facility that has a location.
    pub fn new(catalog: &FacilityCatalog) -> Self {
        let indexed = catalog
            .located()
            .map(|(id, location)| IndexedFacility {
                coords: to_cartesian(location),
                location,
                id,
            })
            .collect();
        Self {
            tree: RTree::bulk_load(indexed),
        }
    }

    /// Number of indexed facilities.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// True when no facility has coordinates.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Catalog indices of all facilities within `radius_km` great-circle
    /// distance of `center`, in ascending index order.
    pub fn query_radius(&self, center: GeoPoint, radius_km: f64) -> Vec<usize> {
        if radius_km.is_nan() || radius_km < 0.0 {
            return Vec::new();
        }

        let half_angle = (radius_km / (2.0 * EARTH_RADIUS_KM)).min(std::f64::consts::FRAC_PI_2);
        let chord = 2.0 * EARTH_RADIUS_KM * half_angle.sin() + CHORD_SLACK_KM;

        let mut ids: Vec<usize> = self
            .tree
            .locate_within_distance(to_cartesian(center), chord * chord)
            .filter(|item| haversine_km(center, item.location) <= radius_km)
            .map(|item| item.id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

fn to_cartesian(point: GeoPoint) -> [f64; 3] {
    let (lat, lon) = point.to_radians();
    [
        EARTH_RADIUS_KM * lat.cos() * lon.cos(),
        EARTH_RADIUS_KM * lat.cos() * lon.sin(),
        EARTH_RADIUS_KM * lat.sin(),
    ]
}
