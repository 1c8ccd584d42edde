//! fuel-planner: fuel-stop planning along long-haul driving routes.
//!
//! Given a route and a catalog of fuel retailers, picks one stop per
//! fixed-length leg, trading detour distance against price while only
//! ever moving forward along the route.

pub mod catalog;
pub mod context;
pub mod geo;
pub mod geocode;
pub mod haversine;
pub mod osrm;
pub mod planner;
pub mod polyline;
pub mod projection;
pub mod route;
pub mod selector;
pub mod service;
pub mod spatial;
pub mod summary;
pub mod traits;
