//! `Skycast` - weather lookups for free-text locations
//!
//! This library classifies a location query, resolves it to provider
//! parameters, fetches current conditions and the 3-hour forecast, condenses
//! the forecast into daily summaries and attaches hazard warnings.

pub mod aggregate;
pub mod classifier;
pub mod config;
pub mod error;
pub mod geocode;
pub mod hazards;
pub mod http;
pub mod location_resolver;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod similarity;
pub mod store;
pub mod weather;

// Re-export core types for public API
pub use classifier::{AddressClassifier, AddressLabel, FixedClassifier, HeuristicClassifier};
pub use config::SkycastConfig;
pub use error::ForecastError;
pub use location_resolver::LocationResolver;
pub use models::{
    CurrentConditions, DailySummary, ForecastEnvelope, RangeForecast, ResolvedLocation,
};
pub use pipeline::PipelineOrchestrator;
pub use store::{LocationStore, MemoryLocationStore, PersistentLocationStore};
pub use weather::{ForecastGateway, ProviderParams};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ForecastError>;
