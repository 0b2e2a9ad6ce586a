// Application configuration
// Read once from the environment (and an optional .env file) at startup

use std::str::FromStr;
use std::time::Duration;

use crate::api_client::NEOWS_BASE_URL;
use crate::error::ConfigError;
use crate::geology_client::{USGS_EARTHQUAKE_URL, USGS_ELEVATION_URL};

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub nasa_api_key: String,
    pub neo_base_url: String,
    pub earthquake_url: String,
    pub elevation_url: String,
    pub neo_timeout: Duration,
    pub seismic_timeout: Duration,
    pub elevation_timeout: Duration,
    pub seismic_radius_km: f64,
    pub feed_window_days: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nasa_api_key: "DEMO_KEY".to_string(),
            neo_base_url: NEOWS_BASE_URL.to_string(),
            earthquake_url: USGS_EARTHQUAKE_URL.to_string(),
            elevation_url: USGS_ELEVATION_URL.to_string(),
            neo_timeout: Duration::from_secs(15),
            seismic_timeout: Duration::from_secs(10),
            elevation_timeout: Duration::from_secs(8),
            seismic_radius_km: 100.0,
            feed_window_days: 7,
        }
    }
}

impl AppConfig {
    /// Load `.env` if present, then read overrides from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let secs = |key: &'static str, default: Duration| -> Result<Duration, ConfigError> {
            parse_or(&lookup, key, default.as_secs()).map(Duration::from_secs)
        };

        Ok(Self {
            nasa_api_key: lookup("NASA_API_KEY").unwrap_or(defaults.nasa_api_key),
            neo_base_url: lookup("NEO_BASE_URL").unwrap_or(defaults.neo_base_url),
            earthquake_url: lookup("USGS_EARTHQUAKE_URL").unwrap_or(defaults.earthquake_url),
            elevation_url: lookup("USGS_ELEVATION_URL").unwrap_or(defaults.elevation_url),
            neo_timeout: secs("NEO_TIMEOUT_SECS", defaults.neo_timeout)?,
            seismic_timeout: secs("SEISMIC_TIMEOUT_SECS", defaults.seismic_timeout)?,
            elevation_timeout: secs("ELEVATION_TIMEOUT_SECS", defaults.elevation_timeout)?,
            seismic_radius_km: parse_or(&lookup, "SEISMIC_RADIUS_KM", defaults.seismic_radius_km)?,
            feed_window_days: parse_or(&lookup, "NEO_FEED_WINDOW_DAYS", defaults.feed_window_days)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError { key, value: raw }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.nasa_api_key, "DEMO_KEY");
        assert_eq!(config.neo_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("NASA_API_KEY", "abc123"),
            ("NEO_TIMEOUT_SECS", "3"),
            ("SEISMIC_RADIUS_KM", "250.5"),
            ("NEO_FEED_WINDOW_DAYS", " 2 "),
        ]))
        .unwrap();
        assert_eq!(config.nasa_api_key, "abc123");
        assert_eq!(config.neo_timeout, Duration::from_secs(3));
        assert_eq!(config.seismic_radius_km, 250.5);
        assert_eq!(config.feed_window_days, 2);
        assert_eq!(config.elevation_timeout, Duration::from_secs(8));
    }

    #[test]
    fn test_bad_value_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("SEISMIC_TIMEOUT_SECS", "ten")])).unwrap_err();
        assert_eq!(err.key, "SEISMIC_TIMEOUT_SECS");
        assert_eq!(err.value, "ten");
    }
}
