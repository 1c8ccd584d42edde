//! Interstate 80 corridor, Chicago to Salt Lake City.
//!
//! Vertices are city-center coordinates along the corridor; the matching
//! truck-stop catalog lives in `i80_truckstops.csv` next to this file.

use fuel_planner::geo::GeoPoint;

pub const CORRIDOR: &[(&str, f64, f64)] = &[
    ("Chicago, IL", 41.8781, -87.6298),
    ("Joliet, IL", 41.5250, -88.0817),
    ("Davenport, IA", 41.5236, -90.5776),
    ("Iowa City, IA", 41.6611, -91.5302),
    ("Des Moines, IA", 41.5868, -93.6250),
    ("Council Bluffs, IA", 41.2619, -95.8608),
    ("Lincoln, NE", 40.8136, -96.7026),
    ("Grand Island, NE", 40.9264, -98.3420),
    ("Kearney, NE", 40.6993, -99.0832),
    ("North Platte, NE", 41.1240, -100.7654),
    ("Sidney, NE", 41.1428, -102.9774),
    ("Cheyenne, WY", 41.1400, -104.8202),
    ("Laramie, WY", 41.3114, -105.5911),
    ("Rawlins, WY", 41.7911, -107.2387),
    ("Rock Springs, WY", 41.5875, -109.2029),
    ("Evanston, WY", 41.2683, -110.9632),
    ("Salt Lake City, UT", 40.7608, -111.8910),
];

pub fn corridor() -> Vec<GeoPoint> {
    CORRIDOR.iter().map(|&(_, lat, lon)| GeoPoint::new(lat, lon)).collect()
}

pub fn start() -> GeoPoint {
    corridor()[0]
}

pub fn end() -> GeoPoint {
    corridor()[CORRIDOR.len() - 1]
}

pub fn catalog_path() -> String {
    format!("{}/tests/fixtures/i80_truckstops.csv", env!("CARGO_MANIFEST_DIR"))
}
