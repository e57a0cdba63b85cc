//! Data models for the forecast pipeline
//!
//! This module contains the core domain models organized by concern:
//! - Location: coordinates, resolved and stored locations
//! - Weather: raw provider samples and the current-conditions summary
//! - Forecast: daily summaries and the result envelope

pub mod forecast;
pub mod location;
pub mod weather;

pub use forecast::{DailySummary, ForecastEnvelope, RangeForecast};
pub use location::{Coordinate, Landmark, ResolutionSource, ResolvedLocation, StoredLocation};
pub use weather::{CurrentConditions, RawForecastSample, WeatherReading};
