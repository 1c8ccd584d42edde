//! Fuel-retailer catalog.
//!
//! Loaded once from CSV and read-only afterwards. Rows without usable
//! coordinates stay in the catalog but never become stop candidates.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::geo::GeoPoint;

/// The 50 US state postal codes.
pub const US_STATES: [&str; 50] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA", "KS",
    "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ", "NM", "NY",
    "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA", "WV",
    "WI", "WY",
];

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// A fuel retailer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    /// Reference id (OPIS id when the source has one, else the row ordinal).
    pub id: u64,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub rack_id: Option<u64>,
    /// Retail price per gallon.
    pub price: f64,
    /// `None` when the source row had no usable coordinates.
    pub location: Option<GeoPoint>,
}

impl Facility {
    /// Geocoding queries for backfilling a missing location, most specific
    /// first.
    pub fn geocode_queries(&self) -> Vec<String> {
        vec![
            format!("{}, {}, {}, USA", self.address, self.city, self.state),
            format!("{}, {}, {}, USA", self.name, self.city, self.state),
            format!("{}, {}, USA", self.city, self.state),
            format!("{}, USA", self.state),
        ]
    }

    fn address_key(&self) -> String {
        format!(
            "{}, {}, {}",
            self.address.trim(),
            self.city.trim(),
            self.state.trim()
        )
    }
}

/// Raw CSV row.
#[derive(Debug, Deserialize)]
struct FacilityRecord {
    #[serde(rename = "OPIS Truckstop ID", default)]
    opis_id: Option<u64>,
    #[serde(rename = "Truckstop Name")]
    name: String,
    #[serde(rename = "Address", default)]
    address: String,
    #[serde(rename = "City", default)]
    city: String,
    #[serde(rename = "State", default)]
    state: String,
    #[serde(rename = "Rack ID", default)]
    rack_id: Option<u64>,
    #[serde(rename = "Retail Price")]
    price: f64,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
}

impl FacilityRecord {
    fn into_facility(self, ordinal: u64) -> Facility {
        let location = match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)).filter(GeoPoint::is_valid),
            _ => None,
        };
        Facility {
            id: self.opis_id.unwrap_or(ordinal),
            name: self.name.trim().to_string(),
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            rack_id: self.rack_id,
            price: self.price,
            location,
        }
    }
}

/// Row filters applied while loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogOptions {
    /// Keep only rows whose state is a US state code.
    pub us_states_only: bool,
    /// Keep only the first row per (address, city, state).
    pub dedupe_addresses: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FacilityCatalog {
    facilities: Vec<Facility>,
}

impl FacilityCatalog {
    /// Wraps already-loaded facilities; their order defines the catalog indices.
    pub fn new(facilities: Vec<Facility>) -> Self {
        Self { facilities }
    }

    /// Loads a catalog CSV from disk.
    pub fn from_path<P: AsRef<Path>>(path: P, options: &CatalogOptions) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        Self::from_reader(file, options)
    }

    /// Loads catalog rows from any CSV source, applying `options`.
    pub fn from_reader<R: Read>(reader: R, options: &CatalogOptions) -> Result<Self, CatalogError> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut facilities = Vec::new();
        let mut seen = HashSet::new();
        let mut bad_price = 0usize;
        let mut filtered = 0usize;

        for (ordinal, row) in reader.deserialize::<FacilityRecord>().enumerate() {
            let facility = row?.into_facility(ordinal as u64);

            if !facility.price.is_finite() || facility.price < 0.0 {
                bad_price += 1;
                continue;
            }
            if options.us_states_only && !US_STATES.contains(&facility.state.as_str()) {
                filtered += 1;
                continue;
            }
            if options.dedupe_addresses && !seen.insert(facility.address_key()) {
                filtered += 1;
                continue;
            }
            facilities.push(facility);
        }

        if bad_price > 0 {
            warn!(rows = bad_price, "dropped catalog rows with invalid price");
        }

        let catalog = Self { facilities };
        info!(
            facilities = catalog.len(),
            located = catalog.located().count(),
            filtered,
            "facility catalog loaded"
        );
        Ok(catalog)
    }

    /// All facilities, indexed by catalog index.
    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    /// Facility at catalog `index`.
    pub fn get(&self, index: usize) -> Option<&Facility> {
        self.facilities.get(index)
    }

    /// Number of facilities.
    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    /// True when the catalog has no facilities.
    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    /// (catalog index, location) for every facility that has coordinates.
    pub fn located(&self) -> impl Iterator<Item = (usize, GeoPoint)> + '_ {
        self.facilities
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.location.map(|loc| (i, loc)))
    }
}
