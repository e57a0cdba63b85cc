//! Daily summary, range forecast and result envelope

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{CurrentConditions, ResolvedLocation, WeatherReading};
use crate::ForecastError;

/// Aggregated forecast for one calendar day
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailySummary {
    pub date: NaiveDate,
    /// Weekday name, e.g. "Saturday"
    pub day_name: String,
    /// Average temperature in Celsius
    pub temperature: f64,
    pub max_temp: f64,
    pub min_temp: f64,
    pub feels_like: f64,
    /// Most frequent description of the day
    pub description: String,
    /// Most frequent icon code of the day
    pub icon: String,
    /// Average humidity in percent
    pub humidity: u8,
    /// Average wind speed in km/h
    pub wind_speed: f64,
    /// Average precipitation chance in percent
    pub rain_chance: u8,
    /// Visibility in km from the first sample of the day
    pub visibility: f64,
    pub warnings: Vec<String>,
}

impl DailySummary {
    #[must_use]
    pub fn reading(&self) -> WeatherReading {
        WeatherReading {
            temperature: self.temperature,
            feels_like: self.feels_like,
            humidity: f64::from(self.humidity),
            wind_speed_kmh: self.wind_speed,
            visibility_km: self.visibility,
        }
    }

    /// Average temperature in Fahrenheit, 1 decimal
    #[must_use]
    pub fn temperature_f(&self) -> f64 {
        celsius_to_fahrenheit(self.temperature)
    }
}

#[must_use]
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    round_to_tenth(celsius * 9.0 / 5.0 + 32.0)
}

/// Round to 1 decimal on the exact decimal value of `value`, ties to even.
///
/// `0.15` is stored as `0.1499…` and rounds down; `10.25` is exact and goes to `10.2`.
#[must_use]
pub fn round_to_tenth(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}

/// What the pipeline hands back to its caller
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastEnvelope {
    pub success: bool,
    pub data: Option<CurrentConditions>,
    pub forecast: Vec<DailySummary>,
    /// Empty on success
    pub error: String,
}

impl ForecastEnvelope {
    #[must_use]
    pub fn success(data: CurrentConditions, forecast: Vec<DailySummary>) -> Self {
        Self {
            success: true,
            data: Some(data),
            forecast,
            error: String::new(),
        }
    }

    #[must_use]
    pub fn failure(error: &ForecastError) -> Self {
        Self {
            success: false,
            data: None,
            forecast: Vec::new(),
            error: error.to_string(),
        }
    }
}

/// Forecast for a resolved location restricted to a date range
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RangeForecast {
    pub location: ResolvedLocation,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: Vec<DailySummary>,
    /// Day whose average temperature is closest to the comfort target
    pub most_temperate: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_celsius_to_fahrenheit() {
        assert_eq!(celsius_to_fahrenheit(0.0), 32.0);
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert_eq!(celsius_to_fahrenheit(21.3), 70.3);
        assert_eq!(celsius_to_fahrenheit(19.0), 66.2);
    }

    #[test]
    fn test_round_to_tenth_ties_and_binary_values() {
        assert_eq!(round_to_tenth(10.25), 10.2);
        assert_eq!(round_to_tenth(10.35), 10.3);
        assert_eq!(round_to_tenth(0.15), 0.1);
        assert_eq!(round_to_tenth(0.25), 0.2);
        assert_eq!(round_to_tenth(12.166_666), 12.2);
        assert_eq!(round_to_tenth(-3.04), -3.0);
    }

    #[test]
    fn test_failure_envelope_is_empty() {
        let envelope = ForecastEnvelope::failure(&ForecastError::upstream_status("Weather API", 500));
        assert!(!envelope.success);
        assert!(envelope.data.is_none());
        assert!(envelope.forecast.is_empty());
        assert_eq!(envelope.error, "Weather API error: 500");
    }
}
