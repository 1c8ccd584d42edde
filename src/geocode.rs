//! Nominatim geocoding adapter and helpers.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geo::GeoPoint;
use crate::traits::{GeocodeError, Geocoder};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NominatimConfig {
    pub base_url: String,
    /// Nominatim rejects requests without an identifying user agent.
    pub user_agent: String,
    /// Comma-separated ISO country codes results are restricted to.
    pub country_codes: String,
    pub timeout_secs: u64,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: concat!("fuel-planner/", env!("CARGO_PKG_VERSION")).to_string(),
            country_codes: "us".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NominatimClient {
    config: NominatimConfig,
    client: reqwest::blocking::Client,
}

impl NominatimClient {
    /// Builds the HTTP client with the configured timeout and user agent.
    pub fn new(config: NominatimConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { config, client })
    }
}

impl Geocoder for NominatimClient {
    fn resolve(&self, address: &str) -> Result<Option<GeoPoint>, GeocodeError> {
        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(url)
            .query(&[
                ("q", address),
                ("format", "json"),
                ("countrycodes", self.config.country_codes.as_str()),
                ("limit", "1"),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let places: Vec<NominatimPlace> = response.json()?;
        places.into_iter().next().map(NominatimPlace::into_point).transpose()
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

impl NominatimPlace {
    fn into_point(self) -> Result<GeoPoint, GeocodeError> {
        let parse = |value: &str| {
            value
                .trim()
                .parse::<f64>()
                .map_err(|_| GeocodeError::InvalidCoordinate(value.to_string()))
        };
        let point = GeoPoint::new(parse(&self.lat)?, parse(&self.lon)?);
        if !point.is_valid() {
            return Err(GeocodeError::InvalidCoordinate(format!("{},{}", self.lat, self.lon)));
        }
        Ok(point)
    }
}

/// Memoizes answers of an inner geocoder by normalized query.
///
/// Both hits and "not found" answers are cached; errors are not, so a
/// transient outage does not poison the cache.
#[derive(Debug)]
pub struct CachingGeocoder<G> {
    inner: G,
    cache: Mutex<HashMap<String, Option<GeoPoint>>>,
}

impl<G: Geocoder> CachingGeocoder<G> {
    /// Wraps `inner` with an empty cache.
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Seeds the cache, e.g. from a previous run.
    pub fn with_entries(inner: G, entries: impl IntoIterator<Item = (String, Option<GeoPoint>)>) -> Self {
        let cache = entries
            .into_iter()
            .map(|(query, point)| (normalize(&query), point))
            .collect();
        Self {
            inner,
            cache: Mutex::new(cache),
        }
    }

    /// Snapshot of the cache contents.
    pub fn entries(&self) -> Vec<(String, Option<GeoPoint>)> {
        self.cache
            .lock()
            .map(|cache| cache.iter().map(|(k, v)| (k.clone(), *v)).collect())
            .unwrap_or_default()
    }
}

impl<G: Geocoder> Geocoder for CachingGeocoder<G> {
    fn resolve(&self, address: &str) -> Result<Option<GeoPoint>, GeocodeError> {
        let key = normalize(address);
        if let Some(hit) = self.cache.lock().ok().and_then(|cache| cache.get(&key).copied()) {
            debug!(query = %key, "geocode cache hit");
            return Ok(hit);
        }

        let answer = self.inner.resolve(address)?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, answer);
        }
        Ok(answer)
    }
}

/// Tries `queries` in order and returns the first location found.
///
/// A service error aborts the search; "not found" moves on to the next
/// query.
pub fn resolve_first<G, I, S>(geocoder: &G, queries: I) -> Result<Option<GeoPoint>, GeocodeError>
where
    G: Geocoder + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for query in queries {
        if let Some(point) = geocoder.resolve(query.as_ref())? {
            return Ok(Some(point));
        }
    }
    Ok(None)
}

fn normalize(query: &str) -> String {
    query.trim().to_lowercase()
}
