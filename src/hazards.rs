//! Hazard warnings for a day of weather
//!
//! Every matching rule appends its message; only the heat/cold pair is
//! mutually exclusive. The list always starts with the day label.

use crate::models::WeatherReading;

pub const HEATSTROKE_FEELS_LIKE_C: f64 = 45.0;
pub const EXTREME_HEAT_C: f64 = 40.0;
pub const EXTREME_COLD_C: f64 = 0.0;
pub const HIGH_HUMIDITY_PERCENT: f64 = 70.0;
pub const STRONG_WIND_KMH: f64 = 60.0;
pub const POOR_VISIBILITY_KM: f64 = 2.0;

pub const HEATSTROKE: &str = "⚠️ Feels like temperature is dangerously high! Risk of heatstroke.";
pub const EXTREME_HEAT: &str =
    "⚠️ Extreme heat detected! Stay hydrated and search for air conditioned places.";
pub const EXTREME_COLD: &str = "⚠️ Extreme cold detected! Wear something thick.";
pub const HIGH_HUMIDITY: &str = "⚠️ Very high humidity! It may feel hotter and cause discomfort.";
pub const STRONG_WIND: &str = "⚠️ Strong winds! Risk of damage and travel disruption";
pub const POOR_VISIBILITY: &str = "⚠️ Poor visibility! Avoid travelling and long rides.";

/// Evaluate thresholds in fixed order: heat/cold, humidity, wind, visibility
#[must_use]
pub fn evaluate(reading: &WeatherReading, day_label: &str) -> Vec<String> {
    let mut warnings = vec![day_label.to_string()];

    if reading.feels_like > HEATSTROKE_FEELS_LIKE_C {
        warnings.push(HEATSTROKE.to_string());
    }

    if reading.temperature > EXTREME_HEAT_C {
        warnings.push(EXTREME_HEAT.to_string());
    } else if reading.temperature < EXTREME_COLD_C {
        warnings.push(EXTREME_COLD.to_string());
    }

    if reading.humidity > HIGH_HUMIDITY_PERCENT {
        warnings.push(HIGH_HUMIDITY.to_string());
    }

    if reading.wind_speed_kmh > STRONG_WIND_KMH {
        warnings.push(STRONG_WIND.to_string());
    }

    if reading.visibility_km < POOR_VISIBILITY_KM {
        warnings.push(POOR_VISIBILITY.to_string());
    }

    warnings
}
