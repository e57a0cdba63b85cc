//! Provider response structures and conversion to internal models

use chrono::DateTime;
use serde::Deserialize;

use super::CurrentObservation;
use crate::models::RawForecastSample;
use crate::{ForecastError, Result};

/// `/weather` response
#[derive(Debug, Deserialize)]
pub struct CurrentResponse {
    pub name: String,
    pub sys: CurrentSys,
    pub main: MainBlock,
    #[serde(default)]
    pub weather: Vec<Condition>,
    #[serde(default)]
    pub wind: Wind,
    /// Meters; absent means 0
    pub visibility: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CurrentSys {
    pub country: Option<String>,
    #[serde(default)]
    pub sunrise: i64,
    #[serde(default)]
    pub sunset: i64,
}

#[derive(Debug, Deserialize)]
pub struct MainBlock {
    pub temp: f64,
    pub feels_like: Option<f64>,
    #[serde(default)]
    pub humidity: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct Wind {
    /// m/s
    #[serde(default)]
    pub speed: f64,
}

#[derive(Debug, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

/// `/forecast` response, 3-hour samples under `list`
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub list: Vec<ForecastItem>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastItem {
    /// Unix seconds
    pub dt: i64,
    pub main: MainBlock,
    #[serde(default)]
    pub wind: Wind,
    /// Probability of precipitation, 0..1
    #[serde(default)]
    pub pop: f64,
    pub visibility: Option<f64>,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

fn first_condition(conditions: Vec<Condition>) -> (String, String) {
    conditions
        .into_iter()
        .next()
        .map(|c| (c.description, c.icon))
        .unwrap_or_default()
}

impl TryFrom<CurrentResponse> for CurrentObservation {
    type Error = ForecastError;

    fn try_from(response: CurrentResponse) -> Result<Self> {
        if response.weather.is_empty() {
            return Err(ForecastError::malformed("current weather has no conditions"));
        }
        let (description, icon) = first_condition(response.weather);

        Ok(Self {
            name: response.name,
            country: response.sys.country.unwrap_or_default(),
            temperature: response.main.temp,
            feels_like: response.main.feels_like.unwrap_or(response.main.temp),
            humidity: response.main.humidity,
            description,
            icon,
            wind_speed_ms: response.wind.speed,
            visibility_m: response.visibility.unwrap_or(0.0),
            sunrise: response.sys.sunrise,
            sunset: response.sys.sunset,
        })
    }
}

impl ForecastResponse {
    pub fn into_samples(self) -> Result<Vec<RawForecastSample>> {
        self.list
            .into_iter()
            .map(|item| {
                let timestamp = DateTime::from_timestamp(item.dt, 0).ok_or_else(|| {
                    ForecastError::malformed(format!("invalid forecast timestamp {}", item.dt))
                })?;
                let (description, icon) = first_condition(item.weather);

                Ok(RawForecastSample {
                    timestamp,
                    temperature: item.main.temp,
                    feels_like: item.main.feels_like,
                    humidity: item.main.humidity,
                    wind_speed_ms: item.wind.speed,
                    precipitation_probability: item.pop,
                    description,
                    icon,
                    visibility_m: item.visibility.unwrap_or(0.0),
                })
            })
            .collect()
    }
}
