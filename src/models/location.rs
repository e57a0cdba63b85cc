//! Location models: coordinates, resolution results and stored records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geographic coordinate in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude, within [-90, 90]
    pub latitude: f64,
    /// Longitude, within [-180, 180]
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, returning `None` when either value is out of range
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let in_range =
            (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude);
        in_range.then_some(Self {
            latitude,
            longitude,
        })
    }

    /// Format as "lat, lon" with 4 decimals
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Which lookup strategy produced a [`ResolvedLocation`]
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionSource {
    CacheExact,
    CacheFuzzy,
    Geocoder,
}

/// Result of resolving a free-text query
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResolvedLocation {
    /// The text that was resolved
    pub query: String,
    /// Full display name from the store or geocoder
    pub display_name: String,
    pub coordinate: Coordinate,
    pub country: String,
    pub source: ResolutionSource,
}

impl ResolvedLocation {
    #[must_use]
    pub fn from_stored(query: &str, stored: StoredLocation, source: ResolutionSource) -> Self {
        let display_name = if stored.display_name.is_empty() {
            stored.name
        } else {
            stored.display_name
        };
        Self {
            query: query.to_string(),
            display_name,
            coordinate: stored.coordinate,
            country: stored.country,
            source,
        }
    }
}

/// A location record kept by a [`crate::store::LocationStore`]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StoredLocation {
    /// Name the location was first queried by
    pub name: String,
    pub display_name: String,
    pub coordinate: Coordinate,
    pub country: String,
    pub geocoded_at: DateTime<Utc>,
}

impl StoredLocation {
    #[must_use]
    pub fn new(name: String, display_name: String, coordinate: Coordinate, country: String) -> Self {
        Self {
            name,
            display_name,
            coordinate,
            country,
            geocoded_at: Utc::now(),
        }
    }

    /// Store key: names match case-insensitively
    #[must_use]
    pub fn key(name: &str) -> String {
        format!("location:{}", name.trim().to_lowercase())
    }
}

/// A landmark resolved to coordinates plus a municipality-level name
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Landmark {
    pub coordinate: Coordinate,
    /// City, town, village or region name usable as a provider query
    pub city_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_range_checks() {
        assert!(Coordinate::new(46.8182, 8.2275).is_some());
        assert!(Coordinate::new(-90.0, 180.0).is_some());
        assert!(Coordinate::new(90.1, 0.0).is_none());
        assert!(Coordinate::new(0.0, -180.5).is_none());
        assert!(Coordinate::new(f64::NAN, 0.0).is_none());
    }

    #[test]
    fn test_store_key_is_case_insensitive() {
        assert_eq!(StoredLocation::key("  Paris "), StoredLocation::key("PARIS"));
    }

    #[test]
    fn test_resolved_location_falls_back_to_name() {
        let coordinate = Coordinate::new(48.85, 2.35).unwrap();
        let stored = StoredLocation::new("Paris".into(), String::new(), coordinate, "France".into());
        let resolved = ResolvedLocation::from_stored("paris", stored, ResolutionSource::CacheExact);
        assert_eq!(resolved.display_name, "Paris");
        assert_eq!(resolved.query, "paris");
        assert_eq!(resolved.source, ResolutionSource::CacheExact);
    }
}
