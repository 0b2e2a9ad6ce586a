// NASA NeoWs API Client
// Fetches Near-Earth Object close approach data from NASA's API

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::{UpstreamError, ValidationError};
use crate::parameters::{ImpactParameters, DEFAULT_ANGLE_DEG};
use crate::physics_engine::{ImpactEnergy, ROCK_DENSITY};
use crate::upstream::{NeoSource, Upstream};

pub const NEOWS_BASE_URL: &str = "https://api.nasa.gov/neo/rest/v1";

/// Diameter assumed when the feed omits an estimate (km)
const FALLBACK_DIAMETER_KM: f64 = 0.1;

/// Velocity assumed when the feed omits close approach data (km/h)
const FALLBACK_VELOCITY_KMH: f64 = 50_000.0;

// =============================================================================
// API RESPONSE TYPES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeoWsResponse {
    pub links: Option<Links>,
    pub element_count: Option<i32>,
    pub near_earth_objects: Option<BTreeMap<String, Vec<NeoObject>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Links {
    pub next: Option<String>,
    pub prev: Option<String>,
    #[serde(rename = "self")]
    pub self_link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeoObject {
    pub id: Option<String>,
    pub name: Option<String>,
    pub nasa_jpl_url: Option<String>,
    pub absolute_magnitude_h: Option<f64>,
    pub estimated_diameter: Option<EstimatedDiameter>,
    pub is_potentially_hazardous_asteroid: Option<bool>,
    pub close_approach_data: Option<Vec<CloseApproachData>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatedDiameter {
    pub kilometers: Option<DiameterRange>,
    pub meters: Option<DiameterRange>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiameterRange {
    pub estimated_diameter_min: Option<f64>,
    pub estimated_diameter_max: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseApproachData {
    pub close_approach_date: Option<String>,
    pub relative_velocity: Option<RelativeVelocity>,
    pub miss_distance: Option<MissDistance>,
    pub orbiting_body: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelativeVelocity {
    pub kilometers_per_second: Option<String>,
    pub kilometers_per_hour: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissDistance {
    pub astronomical: Option<String>,
    pub lunar: Option<String>,
    pub kilometers: Option<String>,
}

// =============================================================================
// PROCESSED ASTEROID DATA
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeoAsteroid {
    pub id: String,
    pub name: String,
    /// Upper bound of the diameter estimate (km)
    pub diameter_km: f64,
    pub velocity_kmh: f64,
    pub miss_distance_km: Option<f64>,
    pub is_hazardous: bool,
    pub approach_date: Option<NaiveDate>,
}

impl NeoAsteroid {
    /// Impact parameters for this body striking the given point
    pub fn impact_parameters(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ImpactParameters, ValidationError> {
        ImpactParameters::new(
            self.diameter_km * 1000.0,
            self.velocity_kmh / 3600.0,
            ROCK_DENSITY,
            DEFAULT_ANGLE_DEG,
            (latitude, longitude),
        )
    }

    /// Impact energy assuming the given bulk density
    pub fn impact_energy(&self, density_kg_m3: f64) -> ImpactEnergy {
        ImpactEnergy::from_body(self.diameter_km * 1000.0, self.velocity_kmh / 3600.0, density_kg_m3)
    }

    /// Matches the feed id or the display name
    pub fn matches(&self, key: &str) -> bool {
        self.id == key || self.name == key
    }
}

fn parse_number(raw: Option<&String>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
}

impl NeoObject {
    /// Convert a NeoWs record to our internal format
    pub fn to_asteroid(&self) -> NeoAsteroid {
        let name = self.name.clone().unwrap_or_else(|| "Unknown".to_string());
        let id = self.id.clone().unwrap_or_else(|| name.clone());

        let diameter_km = self
            .estimated_diameter
            .as_ref()
            .and_then(|d| d.kilometers.as_ref())
            .and_then(|km| km.estimated_diameter_max)
            .unwrap_or(FALLBACK_DIAMETER_KM);

        let approach = self
            .close_approach_data
            .as_ref()
            .and_then(|approaches| approaches.first());

        let velocity_kmh = approach
            .and_then(|ca| ca.relative_velocity.as_ref())
            .and_then(|v| parse_number(v.kilometers_per_hour.as_ref()))
            .unwrap_or(FALLBACK_VELOCITY_KMH);

        let miss_distance_km = approach
            .and_then(|ca| ca.miss_distance.as_ref())
            .and_then(|m| parse_number(m.kilometers.as_ref()));

        let approach_date = approach
            .and_then(|ca| ca.close_approach_date.as_deref())
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());

        NeoAsteroid {
            id,
            name,
            diameter_km,
            velocity_kmh,
            miss_distance_km,
            is_hazardous: self.is_potentially_hazardous_asteroid.unwrap_or(false),
            approach_date,
        }
    }
}

impl NeoWsResponse {
    pub fn into_asteroids(self) -> Vec<NeoAsteroid> {
        self.near_earth_objects
            .unwrap_or_default()
            .into_values()
            .flatten()
            .map(|neo| neo.to_asteroid())
            .collect()
    }
}

/// Sample close approaches served when the live feed cannot be reached
pub fn fallback_feed(date: NaiveDate) -> Vec<NeoAsteroid> {
    vec![
        NeoAsteroid {
            id: "2024 TM3".to_string(),
            name: "2024 TM3".to_string(),
            diameter_km: 0.0298,
            velocity_kmh: 45_000.0,
            miss_distance_km: Some(54_723.0),
            is_hazardous: true,
            approach_date: Some(date),
        },
        NeoAsteroid {
            id: "186822".to_string(),
            name: "186822 (2004 FE31)".to_string(),
            diameter_km: 2.7,
            velocity_kmh: 25_000.0,
            miss_distance_km: Some(15_000_000.0),
            is_hazardous: false,
            approach_date: Some(date),
        },
    ]
}

// =============================================================================
// API CLIENT
// =============================================================================

pub struct NeoWsClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl NeoWsClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, UpstreamError> {
        Ok(Self {
            api_key,
            base_url,
            client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }

    /// Fetch NEOs that approach Earth in a date range
    pub async fn fetch_feed(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<NeoAsteroid>, UpstreamError> {
        let url = format!(
            "{}/feed?start_date={}&end_date={}&api_key={}",
            self.base_url, start_date, end_date, self.api_key
        );

        log::info!("Fetching NEO feed for {} to {}", start_date, end_date);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status()));
        }

        let data: NeoWsResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;

        let asteroids = data.into_asteroids();
        log::info!("Retrieved {} NEO records", asteroids.len());
        Ok(asteroids)
    }
}

impl NeoSource for NeoWsClient {
    async fn feed(&self, start_date: &str, end_date: &str) -> Upstream<Vec<NeoAsteroid>> {
        self.fetch_feed(start_date, end_date).await.into()
    }
}

// =============================================================================
// TESTS
// =============================================================================
