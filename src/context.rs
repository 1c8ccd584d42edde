//! Shared read-only facility data.

use crate::catalog::FacilityCatalog;
use crate::spatial::FacilityIndex;

/// The facility catalog together with its spatial index.
///
/// Built once at startup and then shared by reference (or behind an `Arc`)
/// across concurrent planning calls. Nothing mutates it after construction.
#[derive(Debug)]
pub struct FacilityContext {
    catalog: FacilityCatalog,
    index: FacilityIndex,
}

impl FacilityContext {
    /// Indexes `catalog` once; the context is then read-only.
    pub fn new(catalog: FacilityCatalog) -> Self {
        let index = FacilityIndex::new(&catalog);
        Self { catalog, index }
    }

    /// The facility catalog.
    pub fn catalog(&self) -> &FacilityCatalog {
        &self.catalog
    }

    /// Spatial index over the catalog's located facilities.
    pub fn index(&self) -> &FacilityIndex {
        &self.index
    }
}
