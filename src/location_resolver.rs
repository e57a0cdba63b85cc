//! Location Resolution Module
//!
//! Resolves free-text queries to coordinates: stored exact match, then
//! stored fuzzy match, then the geocoding service. Also hosts the pure
//! coordinate parser and the landmark lookup used for provider parameters.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::geocode::GeocodingClient;
use crate::models::{Coordinate, Landmark, ResolutionSource, ResolvedLocation, StoredLocation};
use crate::similarity::{self, FUZZY_CUTOFF};
use crate::store::LocationStore;
use crate::{ForecastError, Result};

/// Service for resolving location queries
#[derive(Clone)]
pub struct LocationResolver {
    store: Arc<dyn LocationStore>,
    geocoder: GeocodingClient,
}

impl LocationResolver {
    pub fn new(store: Arc<dyn LocationStore>, geocoder: GeocodingClient) -> Self {
        Self { store, geocoder }
    }

    /// Resolve a query into a location, geocoding and storing it on a cache miss
    pub async fn resolve(&self, query: &str) -> Result<ResolvedLocation> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ForecastError::invalid_input("Location is required"));
        }
        debug!("Resolving location query: {}", query);

        if let Some(stored) = self.cached_exact(query).await {
            debug!("Exact cache hit for '{}'", query);
            return Ok(ResolvedLocation::from_stored(query, stored, ResolutionSource::CacheExact));
        }

        if let Some(stored) = self.cached_fuzzy(query).await {
            debug!("Fuzzy cache hit for '{}': '{}'", query, stored.name);
            return Ok(ResolvedLocation::from_stored(query, stored, ResolutionSource::CacheFuzzy));
        }

        let place = self.geocoder.search(query).await?.ok_or_else(|| {
            ForecastError::not_found("Location not found; try a different query or spelling.")
        })?;

        let display_name = if place.display_name.is_empty() {
            query.to_string()
        } else {
            place.display_name.clone()
        };
        let stored = StoredLocation::new(
            query.to_string(),
            display_name,
            place.coordinate,
            place.country(),
        );

        if let Err(e) = self.store.insert(stored.clone()).await {
            warn!("Failed to store resolved location '{}': {:#}", query, e);
        }

        info!(
            "Resolved '{}' via geocoder to ({})",
            query,
            stored.coordinate.format_coordinates()
        );
        Ok(ResolvedLocation::from_stored(query, stored, ResolutionSource::Geocoder))
    }

    /// Resolve a landmark to coordinates and a municipality name.
    ///
    /// `Ok(None)` when the geocoder has no usable answer.
    pub async fn resolve_landmark(&self, text: &str) -> Result<Option<Landmark>> {
        let place = self.geocoder.search(text.trim()).await?;
        Ok(place.map(|place| Landmark {
            coordinate: place.coordinate,
            city_name: place.municipality(),
        }))
    }

    async fn cached_exact(&self, query: &str) -> Option<StoredLocation> {
        self.store
            .find_exact(query)
            .await
            .inspect_err(|e| warn!("Location store lookup failed: {:#}", e))
            .ok()
            .flatten()
    }

    async fn cached_fuzzy(&self, query: &str) -> Option<StoredLocation> {
        let names = self
            .store
            .names()
            .await
            .inspect_err(|e| warn!("Location store snapshot failed: {:#}", e))
            .ok()?;

        let best = similarity::best_match(query, &names, FUZZY_CUTOFF)?;
        self.cached_exact(best).await
    }
}

/// Parse "lat,lon" or "lat lon" into a coordinate.
///
/// Requires exactly two numeric tokens within range; never fails loudly.
#[must_use]
pub fn parse_coordinates(text: &str) -> Option<Coordinate> {
    let text = text.trim();
    if text.starts_with(',') || text.ends_with(',') {
        return None;
    }

    let parts: Vec<&str> = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();

    let [lat, lon] = parts.as_slice() else {
        return None;
    };

    Coordinate::new(lat.parse().ok()?, lon.parse().ok()?)
}
