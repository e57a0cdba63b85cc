//! Pipeline orchestration
//!
//! classify → pick provider parameters → current conditions + forecast →
//! daily aggregation → hazard warnings → result envelope.
//!
//! [`PipelineOrchestrator::run`] and [`PipelineOrchestrator::process`] never
//! return an error: every failure is folded into a [`ForecastEnvelope`].

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::aggregate;
use crate::classifier::{AddressClassifier, AddressLabel};
use crate::config::SkycastConfig;
use crate::geocode::GeocodingClient;
use crate::hazards;
use crate::location_resolver::{LocationResolver, parse_coordinates};
use crate::models::weather::ms_to_kmh;
use crate::models::{CurrentConditions, DailySummary, ForecastEnvelope, RangeForecast};
use crate::store::LocationStore;
use crate::weather::{CurrentObservation, ForecastGateway, ProviderParams};
use crate::{ForecastError, Result};

/// Target temperature for picking the most temperate day
pub const COMFORT_TEMP_C: f64 = 20.0;

/// Longest inclusive date range accepted by [`PipelineOrchestrator::forecast_range`]
pub const MAX_RANGE_DAYS: i64 = 5;

/// Day label used for warnings on current conditions
const CURRENT_DAY_LABEL: &str = "Today";

pub struct PipelineOrchestrator {
    classifier: Arc<dyn AddressClassifier>,
    resolver: LocationResolver,
    gateway: ForecastGateway,
}

impl PipelineOrchestrator {
    pub fn new(
        classifier: Arc<dyn AddressClassifier>,
        resolver: LocationResolver,
        gateway: ForecastGateway,
    ) -> Self {
        Self {
            classifier,
            resolver,
            gateway,
        }
    }

    /// Wire up the geocoder, resolver and gateway from configuration
    pub fn from_config(
        config: &SkycastConfig,
        classifier: Arc<dyn AddressClassifier>,
        store: Arc<dyn LocationStore>,
    ) -> Result<Self> {
        let geocoder = GeocodingClient::new(&config.geocoder)?;
        let gateway = ForecastGateway::new(&config.weather)?;
        Ok(Self::new(
            classifier,
            LocationResolver::new(store, geocoder),
            gateway,
        ))
    }

    #[must_use]
    pub fn resolver(&self) -> &LocationResolver {
        &self.resolver
    }

    /// Normalize and classify the query, then process it
    #[instrument(skip(self))]
    pub async fn run(&self, query: &str) -> ForecastEnvelope {
        let query = normalize_query(query);
        if query.is_empty() {
            return ForecastEnvelope::failure(&ForecastError::invalid_input("Location is required"));
        }

        let label = self.classifier.classify(&query);
        info!("Classified '{}' as {}", query, label);
        self.process(&query, label).await
    }

    /// Process a query whose address type is already known
    pub async fn process(&self, query: &str, label: AddressLabel) -> ForecastEnvelope {
        match self.try_process(query, label).await {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Weather request for '{}' failed: {}", query, e);
                ForecastEnvelope::failure(&e)
            }
        }
    }

    async fn try_process(&self, query: &str, label: AddressLabel) -> Result<ForecastEnvelope> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ForecastError::invalid_input("Location is required"));
        }

        let params = self.select_params(query, label).await?;
        debug!("Provider parameters for '{}': {}", query, params);

        let observation = self.gateway.current_conditions(&params).await?;
        let current = summarize_current(observation, label);

        let forecast = match self.gateway.forecast(&params).await {
            Ok(samples) => aggregate::aggregate(&samples),
            Err(e) => {
                warn!("Forecast unavailable, returning current conditions only: {}", e);
                Vec::new()
            }
        };

        Ok(ForecastEnvelope::success(current, forecast))
    }

    /// Map an address label to the provider parameter set
    pub async fn select_params(&self, query: &str, label: AddressLabel) -> Result<ProviderParams> {
        match label {
            AddressLabel::ZipCode => Ok(ProviderParams::Zip(query.to_string())),
            AddressLabel::GpsCoordinates => parse_coordinates(query)
                .map(ProviderParams::Coordinates)
                .ok_or_else(|| {
                    ForecastError::invalid_input(format!(
                        "'{query}' is not a valid 'lat,lon' coordinate pair"
                    ))
                }),
            AddressLabel::Landmarks => {
                let landmark = self
                    .resolver
                    .resolve_landmark(query)
                    .await?
                    .ok_or_else(|| ForecastError::not_found("Could not resolve landmark"))?;
                debug!(
                    "Landmark '{}' resolved to {} ({})",
                    query,
                    landmark.city_name,
                    landmark.coordinate.format_coordinates()
                );
                Ok(ProviderParams::Name(landmark.city_name))
            }
            AddressLabel::City
            | AddressLabel::Town
            | AddressLabel::Country
            | AddressLabel::Unknown => Ok(ProviderParams::Name(query.to_string())),
        }
    }

    /// Daily forecast for a stored or geocoded location, limited to `[start, end]`
    #[instrument(skip(self))]
    pub async fn forecast_range(
        &self,
        query: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RangeForecast> {
        if start > end {
            return Err(ForecastError::invalid_input(
                "Start date must be on or before the end date",
            ));
        }
        if (end - start).num_days() + 1 > MAX_RANGE_DAYS {
            return Err(ForecastError::invalid_input(format!(
                "Maximum allowed period is {MAX_RANGE_DAYS} days"
            )));
        }

        let location = self.resolver.resolve(query).await?;
        let samples = self
            .gateway
            .forecast(&ProviderParams::Coordinates(location.coordinate))
            .await?;

        let days: Vec<DailySummary> = aggregate::aggregate(&samples)
            .into_iter()
            .filter(|day| (start..=end).contains(&day.date))
            .collect();

        if days.is_empty() {
            return Err(ForecastError::not_found(
                "No forecast data available for that date range.",
            ));
        }

        let most_temperate = most_temperate_day(&days, COMFORT_TEMP_C);
        info!(
            "Range forecast for '{}': {} days, most temperate {:?}",
            location.query,
            days.len(),
            most_temperate
        );

        Ok(RangeForecast {
            location,
            start,
            end,
            days,
            most_temperate,
        })
    }
}

/// Trim and title-case a query: the first letter of each alphabetic run is upper-cased
#[must_use]
pub fn normalize_query(query: &str) -> String {
    let mut normalized = String::with_capacity(query.len());
    let mut in_word = false;

    for c in query.trim().chars() {
        if c.is_alphabetic() {
            if in_word {
                normalized.extend(c.to_lowercase());
            } else {
                normalized.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            normalized.push(c);
            in_word = false;
        }
    }

    normalized
}

/// Day whose average temperature is closest to `comfort`; first wins on ties
#[must_use]
pub fn most_temperate_day(days: &[DailySummary], comfort: f64) -> Option<NaiveDate> {
    days.iter()
        .min_by(|a, b| {
            (a.temperature - comfort)
                .abs()
                .total_cmp(&(b.temperature - comfort).abs())
        })
        .map(|day| day.date)
}

fn summarize_current(observation: CurrentObservation, label: AddressLabel) -> CurrentConditions {
    let mut current = CurrentConditions {
        location: observation.name,
        country: observation.country,
        temperature: observation.temperature,
        feels_like: observation.feels_like,
        description: observation.description,
        humidity: observation.humidity,
        wind_speed: ms_to_kmh(observation.wind_speed_ms),
        visibility: observation.visibility_m / 1000.0,
        icon: observation.icon,
        sunrise: observation.sunrise,
        sunset: observation.sunset,
        address_type: label,
        warnings: Vec::new(),
    };
    current.warnings = hazards::evaluate(&current.reading(), CURRENT_DAY_LABEL);
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn day(date: (i32, u32, u32), temperature: f64) -> DailySummary {
        DailySummary {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            day_name: String::new(),
            temperature,
            max_temp: temperature,
            min_temp: temperature,
            feels_like: temperature,
            description: String::new(),
            icon: String::new(),
            humidity: 50,
            wind_speed: 10.0,
            rain_chance: 0,
            visibility: 10.0,
            warnings: Vec::new(),
        }
    }

    #[rstest]
    #[case("  new york  ", "New York")]
    #[case("NEW YORK", "New York")]
    #[case("o'neil", "O'Neil")]
    #[case("10001", "10001")]
    #[case("40.7,-74.0", "40.7,-74.0")]
    #[case("são paulo", "São Paulo")]
    #[case("   ", "")]
    fn test_normalize_query(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_query(raw), expected);
    }

    #[test]
    fn test_most_temperate_day() {
        let days = vec![day((2024, 6, 11), 25.0), day((2024, 6, 12), 18.5), day((2024, 6, 13), 21.5)];
        assert_eq!(
            most_temperate_day(&days, COMFORT_TEMP_C),
            NaiveDate::from_ymd_opt(2024, 6, 12)
        );
        assert_eq!(most_temperate_day(&[], COMFORT_TEMP_C), None);
    }

    #[test]
    fn test_most_temperate_day_tie_keeps_first() {
        let days = vec![day((2024, 6, 11), 22.0), day((2024, 6, 12), 18.0)];
        assert_eq!(
            most_temperate_day(&days, COMFORT_TEMP_C),
            NaiveDate::from_ymd_opt(2024, 6, 11)
        );
    }

    #[test]
    fn test_summarize_current_converts_units_and_warns() {
        let observation = CurrentObservation {
            name: "Jacobabad".to_string(),
            country: "PK".to_string(),
            temperature: 44.0,
            feels_like: 49.0,
            humidity: 20.0,
            description: "haze".to_string(),
            icon: "50d".to_string(),
            wind_speed_ms: 20.0,
            visibility_m: 1_000.0,
            sunrise: 0,
            sunset: 0,
        };

        let current = summarize_current(observation, AddressLabel::City);
        assert!((current.wind_speed - 72.0).abs() < 1e-9);
        assert_eq!(current.visibility, 1.0);
        assert_eq!(current.address_type, AddressLabel::City);
        assert_eq!(
            current.warnings,
            vec![
                "Today".to_string(),
                hazards::HEATSTROKE.to_string(),
                hazards::EXTREME_HEAT.to_string(),
                hazards::STRONG_WIND.to_string(),
                hazards::POOR_VISIBILITY.to_string(),
            ]
        );
    }
}
