//! Weather provider gateway
//!
//! Issues current-conditions and 3-hour forecast requests for a resolved
//! parameter set. Raw provider payloads are decoded in [`openweather`].

use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::config::WeatherConfig;
use crate::models::{Coordinate, RawForecastSample};
use crate::{ForecastError, Result, http};

pub mod openweather;

/// How the provider is asked for a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderParams {
    /// Postal code, passed through verbatim
    Zip(String),
    Coordinates(Coordinate),
    /// Free-text place name
    Name(String),
}

impl ProviderParams {
    /// Location part of the query string
    #[must_use]
    pub fn query_string(&self) -> String {
        match self {
            ProviderParams::Zip(zip) => format!("zip={}", urlencoding::encode(zip)),
            ProviderParams::Coordinates(coordinate) => {
                format!("lat={}&lon={}", coordinate.latitude, coordinate.longitude)
            }
            ProviderParams::Name(name) => format!("q={}", urlencoding::encode(name)),
        }
    }
}

impl fmt::Display for ProviderParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderParams::Zip(zip) => write!(f, "zip {zip}"),
            ProviderParams::Coordinates(coordinate) => {
                write!(f, "coordinates {}", coordinate.format_coordinates())
            }
            ProviderParams::Name(name) => write!(f, "name '{name}'"),
        }
    }
}

/// Current conditions as reported by the provider, metric units
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentObservation {
    pub name: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub description: String,
    pub icon: String,
    pub wind_speed_ms: f64,
    pub visibility_m: f64,
    pub sunrise: i64,
    pub sunset: i64,
}

/// Client for the weather provider's `/weather` and `/forecast` endpoints
#[derive(Clone)]
pub struct ForecastGateway {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
    units: String,
}

impl ForecastGateway {
    /// Fails with a configuration error when no API key is configured
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ForecastError::config(
                    "Missing weather API key. Set weather.api_key or SKYCAST_WEATHER__API_KEY.",
                )
            })?;

        let client = http::build_client(
            config.timeout(),
            &format!("Skycast/{}", crate::VERSION),
            config.max_retries,
        )?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            units: config.units.clone(),
        })
    }

    /// Fetch current conditions. Any non-2xx status is an error carrying the code.
    #[instrument(skip(self, params), fields(params = %params))]
    pub async fn current_conditions(&self, params: &ProviderParams) -> Result<CurrentObservation> {
        let started = Instant::now();
        let response = self.request("weather", params).await?;

        let payload: openweather::CurrentResponse = http::json(response).await?;
        let observation = CurrentObservation::try_from(payload)?;

        info!(
            "Retrieved current weather for {} in {:.3}s",
            observation.name,
            started.elapsed().as_secs_f64()
        );
        Ok(observation)
    }

    /// Fetch the multi-day 3-hour forecast samples
    #[instrument(skip(self, params), fields(params = %params))]
    pub async fn forecast(&self, params: &ProviderParams) -> Result<Vec<RawForecastSample>> {
        let started = Instant::now();
        let response = self.request("forecast", params).await?;

        let payload: openweather::ForecastResponse = http::json(response).await?;
        let samples = payload.into_samples()?;

        info!(
            "Retrieved {} forecast samples in {:.3}s",
            samples.len(),
            started.elapsed().as_secs_f64()
        );
        Ok(samples)
    }

    async fn request(&self, endpoint: &str, params: &ProviderParams) -> Result<reqwest::Response> {
        let url = format!(
            "{}/{}?{}&appid={}&units={}",
            self.base_url,
            endpoint,
            params.query_string(),
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.units)
        );

        let response = http::get(&self.client, &url).await?;
        let status = response.status();
        if !status.is_success() {
            warn!(
                "Weather API {} returned HTTP {} ({})",
                endpoint,
                status.as_u16(),
                http::redact(&url)
            );
            return Err(ForecastError::upstream_status("Weather API", status.as_u16()));
        }
        Ok(response)
    }
}
