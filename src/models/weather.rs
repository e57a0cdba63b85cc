//! Weather sample and current-conditions models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::AddressLabel;

/// One provider-reported 3-hour forecast slot
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RawForecastSample {
    pub timestamp: DateTime<Utc>,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Apparent temperature in Celsius, when reported
    pub feels_like: Option<f64>,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Wind speed in m/s
    pub wind_speed_ms: f64,
    /// Probability of precipitation, 0..1
    pub precipitation_probability: f64,
    pub description: String,
    /// Provider icon code, e.g. "10d"
    pub icon: String,
    /// Visibility in meters
    pub visibility_m: f64,
}

/// Current conditions as returned to callers
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentConditions {
    /// Place name reported by the provider
    pub location: String,
    pub country: String,
    /// Temperature in Celsius
    pub temperature: f64,
    pub feels_like: f64,
    pub description: String,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Wind speed in km/h
    pub wind_speed: f64,
    /// Visibility in kilometers
    pub visibility: f64,
    pub icon: String,
    /// Unix timestamps (seconds)
    pub sunrise: i64,
    pub sunset: i64,
    pub address_type: AddressLabel,
    /// Day label followed by hazard messages
    pub warnings: Vec<String>,
}

impl CurrentConditions {
    #[must_use]
    pub fn reading(&self) -> WeatherReading {
        WeatherReading {
            temperature: self.temperature,
            feels_like: self.feels_like,
            humidity: self.humidity,
            wind_speed_kmh: self.wind_speed,
            visibility_km: self.visibility,
        }
    }
}

/// The values hazard thresholds are checked against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherReading {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub wind_speed_kmh: f64,
    pub visibility_km: f64,
}

/// Convert wind speed from m/s to km/h
#[must_use]
pub fn ms_to_kmh(speed: f64) -> f64 {
    speed * 3.6
}
