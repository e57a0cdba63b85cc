//! Forward geocoding against a Nominatim-compatible search endpoint

use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::config::GeocoderConfig;
use crate::models::Coordinate;
use crate::{ForecastError, Result, http};

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: Option<String>,
    #[serde(default)]
    address: GeocodeAddress,
}

/// Address hierarchy of a geocoding hit
#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
pub struct GeocodeAddress {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// First geocoding hit for a query
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodePlace {
    pub coordinate: Coordinate,
    pub display_name: String,
    pub address: GeocodeAddress,
}

impl GeocodePlace {
    /// City, then town, village, region, finally the display name
    #[must_use]
    pub fn municipality(&self) -> String {
        let address = &self.address;
        [&address.city, &address.town, &address.village, &address.state]
            .into_iter()
            .flatten()
            .find(|name| !name.is_empty())
            .cloned()
            .unwrap_or_else(|| self.display_name.clone())
    }

    #[must_use]
    pub fn country(&self) -> String {
        self.address.country.clone().unwrap_or_default()
    }
}

impl TryFrom<NominatimPlace> for GeocodePlace {
    type Error = ForecastError;

    fn try_from(place: NominatimPlace) -> Result<Self> {
        let latitude: f64 = place
            .lat
            .trim()
            .parse()
            .map_err(|_| ForecastError::malformed(format!("invalid latitude '{}'", place.lat)))?;
        let longitude: f64 = place
            .lon
            .trim()
            .parse()
            .map_err(|_| ForecastError::malformed(format!("invalid longitude '{}'", place.lon)))?;
        let coordinate = Coordinate::new(latitude, longitude).ok_or_else(|| {
            ForecastError::malformed(format!("coordinates out of range: {latitude}, {longitude}"))
        })?;

        Ok(Self {
            coordinate,
            display_name: place.display_name.unwrap_or_default(),
            address: place.address,
        })
    }
}

/// Geocoding service client
#[derive(Clone)]
pub struct GeocodingClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl GeocodingClient {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let client = http::build_client(config.timeout(), &config.user_agent, config.max_retries)?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Look up `query` and return the first hit.
    ///
    /// `Ok(None)` covers both an empty result list and a non-success status.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Option<GeocodePlace>> {
        info!("Geocoding '{}'", query);
        let started = Instant::now();

        let url = format!(
            "{}/search?q={}&format=json&limit=1&addressdetails=1",
            self.base_url,
            urlencoding::encode(query)
        );

        let response = http::get(&self.client, &url).await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Geocoder returned HTTP {} for '{}'", status.as_u16(), query);
            return Ok(None);
        }

        let places: Vec<NominatimPlace> = http::json(response).await?;
        let Some(first) = places.into_iter().next() else {
            warn!("No geocoding results for '{}'", query);
            return Ok(None);
        };

        let place = GeocodePlace::try_from(first)?;
        debug!(
            "Geocoded '{}' to {} ({}) in {:.3}s",
            query,
            place.display_name,
            place.coordinate.format_coordinates(),
            started.elapsed().as_secs_f64()
        );
        Ok(Some(place))
    }
}
