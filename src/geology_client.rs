// USGS Geological Data Client
// Historical seismicity (FDSN event service) and point elevation lookups

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::consequences::Earthquake;
use crate::error::UpstreamError;
use crate::upstream::{GeologicalSource, Upstream};

pub const USGS_EARTHQUAKE_URL: &str = "https://earthquake.usgs.gov/fdsnws/event/1/query";
pub const USGS_ELEVATION_URL: &str = "https://nationalmap.gov/epqs/pqs.php";

/// Smallest magnitude worth reporting as historical context
const MIN_MAGNITUDE: f64 = 4.0;
const MAX_EVENTS: u32 = 100;

// =============================================================================
// API RESPONSE TYPES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarthquakeCollection {
    #[serde(default)]
    pub features: Vec<EarthquakeFeature>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarthquakeFeature {
    pub id: Option<String>,
    pub properties: EarthquakeProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarthquakeProperties {
    pub mag: Option<f64>,
    pub place: Option<String>,
    pub time: Option<i64>,
}

impl From<EarthquakeFeature> for Earthquake {
    fn from(feature: EarthquakeFeature) -> Self {
        Earthquake {
            magnitude: feature.properties.mag,
            place: feature.properties.place,
            time_ms: feature.properties.time,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElevationResponse {
    #[serde(rename = "USGS_Elevation_Point_Query_Service")]
    pub service: Option<ElevationService>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElevationService {
    #[serde(rename = "Elevation_Query")]
    pub query: Option<ElevationQuery>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElevationQuery {
    #[serde(rename = "Elevation")]
    pub elevation: Option<serde_json::Value>,
}

impl ElevationResponse {
    /// Elevation in meters; the service reports it as a number or a string
    pub fn meters(&self) -> Option<f64> {
        let value = self.service.as_ref()?.query.as_ref()?.elevation.as_ref()?;
        match value {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

// =============================================================================
// API CLIENT
// =============================================================================

pub struct UsgsClient {
    earthquake_url: String,
    elevation_url: String,
    seismic_client: reqwest::Client,
    elevation_client: reqwest::Client,
}

impl UsgsClient {
    pub fn new(
        earthquake_url: String,
        elevation_url: String,
        seismic_timeout: Duration,
        elevation_timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        Ok(Self {
            earthquake_url,
            elevation_url,
            seismic_client: reqwest::Client::builder().timeout(seismic_timeout).build()?,
            elevation_client: reqwest::Client::builder()
                .timeout(elevation_timeout)
                .build()?,
        })
    }

    /// Historical M4+ earthquakes within `radius_km` of a point
    pub async fn fetch_earthquakes(
        &self,
        lat: f64,
        lon: f64,
        radius_km: f64,
    ) -> Result<Vec<Earthquake>, UpstreamError> {
        log::info!("Fetching earthquake data for ({:.2}, {:.2})", lat, lon);
        let response = self
            .seismic_client
            .get(&self.earthquake_url)
            .query(&[
                ("format", "geojson".to_string()),
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("maxradiuskm", radius_km.to_string()),
                ("minmagnitude", MIN_MAGNITUDE.to_string()),
                ("limit", MAX_EVENTS.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status()));
        }

        let collection: EarthquakeCollection = response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;

        log::info!("Retrieved {} earthquake records", collection.features.len());
        Ok(collection.features.into_iter().map(Earthquake::from).collect())
    }

    /// Terrain elevation at a point (meters)
    pub async fn fetch_elevation(&self, lat: f64, lon: f64) -> Result<f64, UpstreamError> {
        let response = self
            .elevation_client
            .get(&self.elevation_url)
            .query(&[
                ("x", lon.to_string()),
                ("y", lat.to_string()),
                ("units", "Meters".to_string()),
                ("output", "json".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status()));
        }

        let data: ElevationResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;

        let meters = data
            .meters()
            .ok_or_else(|| UpstreamError::Decode("no elevation in response".to_string()))?;
        log::info!("Elevation at impact site: {} meters", meters);
        Ok(meters)
    }
}

impl GeologicalSource for UsgsClient {
    async fn nearby_seismicity(
        &self,
        lat: f64,
        lon: f64,
        radius_km: f64,
    ) -> Upstream<Vec<Earthquake>> {
        self.fetch_earthquakes(lat, lon, radius_km).await.into()
    }

    async fn elevation(&self, lat: f64, lon: f64) -> Upstream<f64> {
        self.fetch_elevation(lat, lon).await.into()
    }
}

// =============================================================================
// TESTS
// =============================================================================
