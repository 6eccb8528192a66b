//! Region resolution.
//!
//! The set of valid regions is fetched from the provider every time it is
//! needed. A region argument is accepted in canonical form (`uksouth`) or as
//! its display name (`UK South`), case-insensitively.

use crate::error::{Error, Result};
use crate::provider::{CloudProvider, Region, RegionInfo};
use tracing::debug;

/// The regions the provider currently offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSet {
    regions: Vec<RegionInfo>,
}

impl RegionSet {
    /// Fetches the region set from the provider.
    pub async fn fetch(provider: &dyn CloudProvider) -> Result<Self> {
        let regions = provider.list_regions().await?;
        debug!(count = regions.len(), "Fetched region set");
        Ok(Self::from_regions(regions))
    }

    /// Builds a set from known regions, sorted by canonical name.
    pub fn from_regions(mut regions: Vec<RegionInfo>) -> Self {
        regions.sort_by(|a, b| a.name.cmp(&b.name));
        Self { regions }
    }

    /// Regions sorted by canonical name.
    pub fn regions(&self) -> &[RegionInfo] {
        &self.regions
    }

    /// Canonical region names.
    pub fn names(&self) -> Vec<String> {
        self.regions.iter().map(|r| r.name.clone()).collect()
    }

    /// Returns the canonical region for `input`.
    pub fn resolve(&self, input: &str) -> Result<Region> {
        let wanted = input.trim();
        self.regions
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(wanted) || r.display_name.eq_ignore_ascii_case(wanted))
            .map(|r| Region::new(r.name.clone()))
            .ok_or_else(|| Error::InvalidRegion {
                region: input.to_string(),
                valid: self.names(),
            })
    }
}

/// Fetches the region set and resolves `input` against it.
pub async fn resolve_region(provider: &dyn CloudProvider, input: &str) -> Result<Region> {
    RegionSet::fetch(provider).await?.resolve(input)
}
