// State Manager - Request handling around the impact pipeline
// Owns the injected data sources and turns requests into JSON envelopes

use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::api_client::{fallback_feed, NeoAsteroid, NeoWsClient};
use crate::config::AppConfig;
use crate::consequences::{assess_impact, GeologicalContext, ImpactResult, THREAT_MAP_CITIES};
use crate::error::{ImpactError, UpstreamError, ValidationError};
use crate::geology_client::UsgsClient;
use crate::parameters::{normalize, AsteroidImpactRequest, SimulationRequest};
use crate::physics_engine::{
    blast_radius_km, simulate_atmospheric_entry, CraterScaling, TrajectorySample, DEFAULT_DENSITY,
};
use crate::upstream::{GeologicalSource, NeoSource, Upstream};

/// Number of largest feed asteroids placed on the threat map
const THREAT_MAP_ASTEROIDS: usize = 3;
/// Objects considered per approach date when picking threat map asteroids
const THREAT_MAP_PER_DATE: usize = 10;

// =============================================================================
// RESPONSE ENVELOPE
// =============================================================================

/// JSON body plus the HTTP-style status that accompanies it
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    fn failure(status: u16, message: String) -> Self {
        Self {
            status,
            body: serde_json::json!({ "success": false, "error": message }),
        }
    }
}

#[derive(Serialize)]
struct Envelope<'a, T> {
    success: bool,
    #[serde(flatten)]
    data: &'a T,
}

/// Wrap a handler result in the `{success, ...}` envelope
pub fn respond<T: Serialize>(result: Result<T, ImpactError>) -> ApiResponse {
    match result {
        Ok(data) => match serde_json::to_value(Envelope {
            success: true,
            data: &data,
        }) {
            Ok(body) => ApiResponse { status: 200, body },
            Err(err) => ApiResponse::failure(500, err.to_string()),
        },
        Err(err) => {
            log::warn!("Request failed: {}", err);
            ApiResponse::failure(err.status_code(), err.to_string())
        }
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

// =============================================================================
// ADVANCED SIMULATION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedMetrics {
    pub energy_megatons: f64,
    pub crater_diameter_km: f64,
    pub blast_radius_km: f64,
    pub overpressure_kpa: f64,
    pub population_affected: u64,
    pub impact_location: (f64, f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub altitude: f64,
    pub velocity: f64,
    pub mass_percentage: f64,
    pub energy_liberated: f64,
}

impl From<&TrajectorySample> for EntryPoint {
    fn from(sample: &TrajectorySample) -> Self {
        Self {
            altitude: round_to(sample.altitude_km, 1),
            velocity: round_to(sample.velocity_kms, 1),
            mass_percentage: round_to(sample.mass_fraction_percent, 1),
            energy_liberated: round_to(sample.energy_liberated, 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedSimulation {
    pub metrics: AdvancedMetrics,
    pub atmospheric_entry: Vec<EntryPoint>,
}

/// Normalize, assess and step an impactor through the atmosphere
pub fn run_advanced_simulation(
    request: &SimulationRequest,
) -> Result<AdvancedSimulation, ValidationError> {
    let params = normalize(request)?;
    let result = assess_impact("Custom impactor", &params, CraterScaling::JouleRoot);
    let trajectory =
        simulate_atmospheric_entry(params.diameter_m, params.velocity_kms, params.density_kg_m3);

    Ok(AdvancedSimulation {
        metrics: AdvancedMetrics {
            energy_megatons: round_to(result.energy_megatons, 2),
            crater_diameter_km: round_to(result.crater_diameter_km, 2),
            blast_radius_km: round_to(result.blast_radius_km, 2),
            overpressure_kpa: round_to(result.overpressure_kpa, 0),
            population_affected: result.population_affected,
            impact_location: result.impact_location,
        },
        atmospheric_entry: trajectory.iter().map(EntryPoint::from).collect(),
    })
}

/// Advanced simulation endpoint. Needs no external data.
pub fn advanced_simulate(request: &SimulationRequest) -> ApiResponse {
    log::info!("Advanced impact simulation requested");
    respond(run_advanced_simulation(request).map_err(ImpactError::from))
}

// =============================================================================
// FEED-DERIVED VIEWS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsteroidImpactData {
    pub asteroid_name: String,
    pub diameter_km: f64,
    pub velocity_kmh: f64,
    pub impact_energy_megatons: f64,
    pub crater_diameter_km: f64,
    pub blast_radius_km: f64,
    pub seismic_magnitude: f64,
    pub population_affected: u64,
    pub economic_damage_usd: f64,
    pub impact_location: (f64, f64),
    pub usgs_earthquakes: usize,
    pub elevation_meters: Option<f64>,
}

impl From<&ImpactResult> for AsteroidImpactData {
    fn from(result: &ImpactResult) -> Self {
        Self {
            asteroid_name: result.asteroid_name.clone(),
            diameter_km: result.diameter_km,
            velocity_kmh: result.velocity_kmh,
            impact_energy_megatons: result.energy_megatons,
            crater_diameter_km: result.crater_diameter_km,
            blast_radius_km: result.blast_radius_km,
            seismic_magnitude: result.seismic_magnitude,
            population_affected: result.population_affected,
            economic_damage_usd: result.economic_damage_usd,
            impact_location: result.impact_location,
            usgs_earthquakes: result.earthquake_count(),
            elevation_meters: result
                .geological_context
                .as_ref()
                .and_then(|ctx| ctx.elevation_meters),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsteroidImpact {
    pub impact_data: AsteroidImpactData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentNeos {
    pub count: usize,
    pub asteroids: Vec<NeoAsteroid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatZone {
    pub city: String,
    pub lat: f64,
    pub lon: f64,
    pub asteroid: String,
    pub energy_megatons: f64,
    pub blast_radius_km: f64,
    pub hazardous: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatMap {
    pub zones: Vec<ThreatZone>,
}

/// Name, diameter (km) and velocity (km/h) of a standout feed object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsteroidBrief {
    pub name: String,
    pub diameter: f64,
    pub velocity: f64,
}

impl From<&NeoAsteroid> for AsteroidBrief {
    fn from(asteroid: &NeoAsteroid) -> Self {
        Self {
            name: asteroid.name.clone(),
            diameter: asteroid.diameter_km,
            velocity: asteroid.velocity_kmh,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatSummary {
    pub total_asteroids: usize,
    pub hazardous_asteroids: usize,
    pub hazard_percentage: f64,
    pub total_energy_megatons: f64,
    pub average_energy: f64,
    pub max_energy_megatons: f64,
    pub largest_asteroid: Option<AsteroidBrief>,
    pub fastest_asteroid: Option<AsteroidBrief>,
    pub mean_velocity_kmh: f64,
    pub closest_miss_km: Option<f64>,
}

/// Sort largest first
pub fn sort_by_size(asteroids: &mut [NeoAsteroid]) {
    asteroids.sort_by(|a, b| b.diameter_km.total_cmp(&a.diameter_km));
}

/// Largest asteroids among the first few of each approach date, in feed order
fn threat_candidates(asteroids: &[NeoAsteroid]) -> Vec<NeoAsteroid> {
    let mut seen: HashMap<Option<NaiveDate>, usize> = HashMap::new();
    let mut candidates: Vec<NeoAsteroid> = asteroids
        .iter()
        .filter(|asteroid| {
            let count = seen.entry(asteroid.approach_date).or_insert(0);
            *count += 1;
            *count <= THREAT_MAP_PER_DATE
        })
        .cloned()
        .collect();
    sort_by_size(&mut candidates);
    candidates.truncate(THREAT_MAP_ASTEROIDS);
    candidates
}

/// Cross the largest asteroids with the threat map cities
pub fn build_threat_map(asteroids: &[NeoAsteroid]) -> Vec<ThreatZone> {
    let largest = threat_candidates(asteroids);

    THREAT_MAP_CITIES
        .iter()
        .flat_map(|city| {
            largest.iter().map(move |asteroid| {
                let energy = asteroid.impact_energy(DEFAULT_DENSITY);
                ThreatZone {
                    city: city.name.to_string(),
                    lat: city.lat,
                    lon: city.lon,
                    asteroid: asteroid.name.clone(),
                    energy_megatons: energy.megatons,
                    blast_radius_km: blast_radius_km(energy.megatons),
                    hazardous: asteroid.is_hazardous,
                }
            })
        })
        .collect()
}

/// First object strictly ahead of all others on `key`
fn standout<F>(asteroids: &[NeoAsteroid], key: F) -> Option<AsteroidBrief>
where
    F: Fn(&NeoAsteroid) -> f64,
{
    asteroids
        .iter()
        .fold(None::<&NeoAsteroid>, |best, a| match best {
            Some(b) if key(a) <= key(b) => Some(b),
            _ => Some(a),
        })
        .map(AsteroidBrief::from)
}

/// Aggregate statistics over a feed
pub fn summarize_threats(asteroids: &[NeoAsteroid]) -> ThreatSummary {
    let energies: Vec<f64> = asteroids
        .iter()
        .map(|a| a.impact_energy(DEFAULT_DENSITY).megatons)
        .collect();
    let count = asteroids.len();
    let mean = |total: f64| if count > 0 { total / count as f64 } else { 0.0 };
    let hazardous = asteroids.iter().filter(|a| a.is_hazardous).count();
    let total_energy: f64 = energies.iter().sum();

    ThreatSummary {
        total_asteroids: count,
        hazardous_asteroids: hazardous,
        hazard_percentage: round_to(mean(hazardous as f64) * 100.0, 1),
        total_energy_megatons: round_to(total_energy, 2),
        average_energy: round_to(mean(total_energy), 2),
        max_energy_megatons: round_to(energies.iter().copied().fold(0.0, f64::max), 2),
        largest_asteroid: standout(asteroids, |a| a.diameter_km),
        fastest_asteroid: standout(asteroids, |a| a.velocity_kmh),
        mean_velocity_kmh: mean(asteroids.iter().map(|a| a.velocity_kmh).sum()),
        closest_miss_km: asteroids
            .iter()
            .filter_map(|a| a.miss_distance_km)
            .min_by(f64::total_cmp),
    }
}

// =============================================================================
// APPLICATION STATE
// =============================================================================

/// Request-handling state. Data sources are injected at construction and
/// shared read-only across requests.
pub struct AppState<N, G> {
    pub config: AppConfig,
    neo: N,
    geology: G,
}

/// State backed by the live NASA and USGS services
pub type LiveState = AppState<NeoWsClient, UsgsClient>;

impl LiveState {
    pub fn from_config(config: AppConfig) -> Result<Self, UpstreamError> {
        let neo = NeoWsClient::new(
            config.nasa_api_key.clone(),
            config.neo_base_url.clone(),
            config.neo_timeout,
        )?;
        let geology = UsgsClient::new(
            config.earthquake_url.clone(),
            config.elevation_url.clone(),
            config.seismic_timeout,
            config.elevation_timeout,
        )?;
        Ok(AppState::new(config, neo, geology))
    }
}

impl<N: NeoSource, G: GeologicalSource> AppState<N, G> {
    pub fn new(config: AppConfig, neo: N, geology: G) -> Self {
        Self {
            config,
            neo,
            geology,
        }
    }

    /// Feed window ending today
    pub fn feed_window(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = today
            .checked_sub_days(Days::new(self.config.feed_window_days))
            .unwrap_or(today);
        (start, today)
    }

    /// Current feed, or the built-in sample when the source is unavailable
    pub async fn load_feed(&self) -> Vec<NeoAsteroid> {
        let (start, end) = self.feed_window(Local::now().date_naive());
        let start_str = start.format("%Y-%m-%d").to_string();
        let end_str = end.format("%Y-%m-%d").to_string();

        match self.neo.feed(&start_str, &end_str).await {
            Upstream::Available(asteroids) => asteroids,
            Upstream::Unavailable { reason } => {
                log::warn!("NEO feed unavailable ({}), using fallback data", reason);
                fallback_feed(start)
            }
        }
    }

    /// Best-effort geological annotation; `None` when both lookups fail
    pub async fn geological_context(&self, lat: f64, lon: f64) -> Option<GeologicalContext> {
        let quakes = self
            .geology
            .nearby_seismicity(lat, lon, self.config.seismic_radius_km)
            .await;
        let elevation = self.geology.elevation(lat, lon).await;

        if let Upstream::Unavailable { reason } = &quakes {
            log::warn!("Earthquake data unavailable: {}", reason);
        }
        if let Upstream::Unavailable { reason } = &elevation {
            log::warn!("Elevation data unavailable: {}", reason);
        }
        if !quakes.is_available() && !elevation.is_available() {
            return None;
        }

        Some(GeologicalContext {
            earthquakes: quakes.ok().unwrap_or_default(),
            elevation_meters: elevation.ok(),
        })
    }

    /// Simulate a catalogued asteroid striking a point
    pub async fn run_asteroid_impact(
        &self,
        request: &AsteroidImpactRequest,
    ) -> Result<ImpactResult, ImpactError> {
        let asteroid_id = request
            .asteroid_id
            .as_deref()
            .ok_or(ValidationError::MissingField("asteroid_id"))?;
        let (lat, lon) = request.target()?;

        let feed = self.load_feed().await;
        let asteroid = feed
            .iter()
            .find(|a| a.matches(asteroid_id))
            .ok_or_else(|| ImpactError::AsteroidNotFound(asteroid_id.to_string()))?;

        log::info!(
            "Simulating impact: {} at ({:.2}, {:.2})",
            asteroid.name,
            lat,
            lon
        );
        let params = asteroid.impact_parameters(lat, lon)?;
        let mut result = assess_impact(&asteroid.name, &params, CraterScaling::MegatonPower);
        result.geological_context = self.geological_context(lat, lon).await;
        Ok(result)
    }

    pub async fn simulate_asteroid(&self, request: &AsteroidImpactRequest) -> ApiResponse {
        respond(
            self.run_asteroid_impact(request)
                .await
                .map(|result| AsteroidImpact {
                    impact_data: AsteroidImpactData::from(&result),
                }),
        )
    }

    pub async fn recent_neos(&self) -> ApiResponse {
        let mut asteroids = self.load_feed().await;
        sort_by_size(&mut asteroids);
        respond(Ok(RecentNeos {
            count: asteroids.len(),
            asteroids,
        }))
    }

    pub async fn threat_map(&self) -> ApiResponse {
        let asteroids = self.load_feed().await;
        respond(Ok(ThreatMap {
            zones: build_threat_map(&asteroids),
        }))
    }

    pub async fn threat_summary(&self) -> ApiResponse {
        let asteroids = self.load_feed().await;
        respond(Ok(summarize_threats(&asteroids)))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consequences::{estimate_population, Earthquake};

    struct FakeNeo(Upstream<Vec<NeoAsteroid>>);

    impl NeoSource for FakeNeo {
        async fn feed(&self, _start: &str, _end: &str) -> Upstream<Vec<NeoAsteroid>> {
            self.0.clone()
        }
    }

    struct FakeGeology {
        quakes: Upstream<Vec<Earthquake>>,
        elevation: Upstream<f64>,
    }

    impl GeologicalSource for FakeGeology {
        async fn nearby_seismicity(
            &self,
            _lat: f64,
            _lon: f64,
            _radius_km: f64,
        ) -> Upstream<Vec<Earthquake>> {
            self.quakes.clone()
        }

        async fn elevation(&self, _lat: f64, _lon: f64) -> Upstream<f64> {
            self.elevation.clone()
        }
    }

    fn asteroid(id: &str, diameter_km: f64, hazardous: bool) -> NeoAsteroid {
        NeoAsteroid {
            id: id.to_string(),
            name: format!("({})", id),
            diameter_km,
            velocity_kmh: 60_000.0,
            miss_distance_km: Some(diameter_km * 1.0e6),
            is_hazardous: hazardous,
            approach_date: NaiveDate::from_ymd_opt(2025, 10, 4),
        }
    }

    fn quake(magnitude: f64) -> Earthquake {
        Earthquake {
            magnitude: Some(magnitude),
            place: Some("offshore".to_string()),
            time_ms: Some(0),
        }
    }

    fn state(
        feed: Upstream<Vec<NeoAsteroid>>,
        geology: FakeGeology,
    ) -> AppState<FakeNeo, FakeGeology> {
        AppState::new(AppConfig::default(), FakeNeo(feed), geology)
    }

    fn offline_geology() -> FakeGeology {
        FakeGeology {
            quakes: Upstream::unavailable("timeout"),
            elevation: Upstream::unavailable("timeout"),
        }
    }

    #[test]
    fn test_advanced_response_shape() {
        let response = advanced_simulate(&SimulationRequest::default());
        assert_eq!(response.status, 200);
        assert_eq!(response.body["success"], true);

        let metrics = &response.body["metrics"];
        let energy = metrics["energy_megatons"].as_f64().unwrap();
        assert!((energy - 75.0).abs() / 75.0 < 0.05);
        assert_eq!(metrics["impact_location"][0], 19.4326);
        assert_eq!(metrics["impact_location"][1], -99.1332);
        assert!(metrics["blast_radius_km"].as_f64().unwrap() > 0.0);
        // Mexico City falls in the urban tier
        assert!(metrics["population_affected"].as_u64().unwrap() > 1000);

        let entry = response.body["atmospheric_entry"].as_array().unwrap();
        assert_eq!(entry.len(), 24);
        assert_eq!(entry[0]["altitude"], 115.0);
        assert_eq!(entry[23]["altitude"], 0.0);
        assert!(entry[0].get("mass_percentage").is_some());
        assert!(entry[0].get("energy_liberated").is_some());
    }

    #[test]
    fn test_advanced_population_uses_exposure_model() {
        let request = SimulationRequest {
            location: Some("40.7128, -74.0060".to_string()),
            ..Default::default()
        };
        let simulation = run_advanced_simulation(&request).unwrap();
        let params = normalize(&request).unwrap();
        let exact = assess_impact("x", &params, CraterScaling::JouleRoot);
        assert_eq!(
            simulation.metrics.population_affected,
            estimate_population(40.7128, -74.0060, exact.blast_radius_km)
        );
    }

    #[test]
    fn test_advanced_validation_failure() {
        let request = SimulationRequest {
            location: Some("abc".to_string()),
            ..Default::default()
        };
        let response = advanced_simulate(&request);
        assert_eq!(response.status, 500);
        assert_eq!(response.body["success"], false);
        assert!(response.body["error"].as_str().unwrap().contains("abc"));
        assert!(response.body.get("metrics").is_none());
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_to(75.0849, 2), 75.08);
        assert_eq!(round_to(7508.49, 0), 7508.0);
        assert_eq!(round_to(2.25, 1), 2.3);
    }

    #[tokio::test]
    async fn test_asteroid_impact_with_geology() {
        let app = state(
            Upstream::Available(vec![asteroid("3542519", 0.25, true)]),
            FakeGeology {
                quakes: Upstream::Available(vec![quake(4.5), quake(5.1)]),
                elevation: Upstream::Available(10.0),
            },
        );
        let request = AsteroidImpactRequest {
            asteroid_id: Some("3542519".to_string()),
            ..Default::default()
        };

        let result = app.run_asteroid_impact(&request).await.unwrap();
        assert_eq!(result.asteroid_name, "(3542519)");
        assert_eq!(result.impact_location, (40.7128, -74.0060));
        assert!(result.seismic_magnitude > 0.0);
        assert!(result.economic_damage_usd > 0.0);
        assert_eq!(result.earthquake_count(), 2);

        let response = app.simulate_asteroid(&request).await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body["impact_data"]["usgs_earthquakes"], 2);
        assert_eq!(response.body["impact_data"]["elevation_meters"], 10.0);
    }

    #[tokio::test]
    async fn test_geology_outage_does_not_fail_request() {
        let app = state(
            Upstream::Available(vec![asteroid("3542519", 0.25, true)]),
            offline_geology(),
        );
        let request = AsteroidImpactRequest {
            asteroid_id: Some("(3542519)".to_string()),
            latitude: Some("35.6762".into()),
            longitude: Some("139.6503".into()),
        };

        let result = app.run_asteroid_impact(&request).await.unwrap();
        assert!(result.geological_context.is_none());

        let response = app.simulate_asteroid(&request).await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body["impact_data"]["usgs_earthquakes"], 0);
    }

    #[tokio::test]
    async fn test_partial_geology_kept() {
        let app = state(
            Upstream::Available(vec![]),
            FakeGeology {
                quakes: Upstream::unavailable("503"),
                elevation: Upstream::Available(2240.0),
            },
        );
        let ctx = app.geological_context(19.43, -99.13).await.unwrap();
        assert!(ctx.earthquakes.is_empty());
        assert_eq!(ctx.elevation_meters, Some(2240.0));
    }

    #[tokio::test]
    async fn test_asteroid_not_found() {
        let app = state(Upstream::Available(vec![]), offline_geology());
        let request = AsteroidImpactRequest {
            asteroid_id: Some("nope".to_string()),
            ..Default::default()
        };
        let response = app.simulate_asteroid(&request).await;
        assert_eq!(response.status, 404);
        assert_eq!(response.body["success"], false);
        assert_eq!(response.body["error"], "Asteroid not found: nope");
    }

    #[tokio::test]
    async fn test_missing_asteroid_id() {
        let app = state(Upstream::Available(vec![]), offline_geology());
        let response = app.simulate_asteroid(&AsteroidImpactRequest::default()).await;
        assert_eq!(response.status, 500);
        assert!(response.body["error"].as_str().unwrap().contains("asteroid_id"));
    }

    #[tokio::test]
    async fn test_feed_outage_uses_fallback() {
        let app = state(Upstream::unavailable("connection refused"), offline_geology());
        let feed = app.load_feed().await;
        assert_eq!(feed.len(), 2);

        let request = AsteroidImpactRequest {
            asteroid_id: Some("2024 TM3".to_string()),
            ..Default::default()
        };
        let result = app.run_asteroid_impact(&request).await.unwrap();
        assert_eq!(result.asteroid_name, "2024 TM3");
    }

    #[tokio::test]
    async fn test_recent_neos_sorted_by_size() {
        let app = state(
            Upstream::Available(vec![
                asteroid("a", 0.1, false),
                asteroid("b", 1.2, true),
                asteroid("c", 0.4, false),
            ]),
            offline_geology(),
        );
        let response = app.recent_neos().await;
        assert_eq!(response.body["count"], 3);
        let ids: Vec<&str> = response.body["asteroids"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_threat_map_grid() {
        let feed = vec![
            asteroid("a", 0.1, false),
            asteroid("b", 1.2, true),
            asteroid("c", 0.4, false),
            asteroid("d", 0.05, false),
        ];
        let zones = build_threat_map(&feed);
        assert_eq!(zones.len(), 8 * 3);
        assert!(zones.iter().all(|z| z.asteroid != "(d)"));
        assert_eq!(zones[0].city, "New York");
        assert_eq!(zones[0].asteroid, "(b)");
        assert!(zones[0].hazardous);
        assert!(zones[0].blast_radius_km > zones[1].blast_radius_km);
    }

    #[test]
    fn test_threat_map_caps_objects_per_date() {
        // Eleven small objects on one date push the big twelfth out of the pool
        let mut feed: Vec<NeoAsteroid> = (0..11)
            .map(|i| asteroid(&format!("s{}", i), 0.01 + i as f64 * 0.001, false))
            .collect();
        feed.push(asteroid("late", 5.0, true));
        let mut other_day = asteroid("next", 0.5, false);
        other_day.approach_date = NaiveDate::from_ymd_opt(2025, 10, 5);
        feed.push(other_day);

        let zones = build_threat_map(&feed);
        let names: Vec<&str> = zones[..3].iter().map(|z| z.asteroid.as_str()).collect();
        assert_eq!(names, vec!["(next)", "(s9)", "(s8)"]);
        assert!(zones.iter().all(|z| z.asteroid != "(late)"));
    }

    #[test]
    fn test_threat_summary() {
        let empty = summarize_threats(&[]);
        assert_eq!(empty.total_asteroids, 0);
        assert_eq!(empty.hazard_percentage, 0.0);
        assert_eq!(empty.average_energy, 0.0);
        assert_eq!(empty.largest_asteroid, None);
        assert_eq!(empty.fastest_asteroid, None);
        assert_eq!(empty.closest_miss_km, None);

        let mut quick = asteroid("c", 0.4, false);
        quick.velocity_kmh = 90_000.0;
        let feed = vec![asteroid("a", 0.1, false), asteroid("b", 1.2, true), quick];
        let summary = summarize_threats(&feed);
        assert_eq!(summary.total_asteroids, 3);
        assert_eq!(summary.hazardous_asteroids, 1);
        assert_eq!(summary.hazard_percentage, 33.3);
        assert_eq!(summary.mean_velocity_kmh, 70_000.0);
        assert_eq!(summary.closest_miss_km, Some(0.1 * 1.0e6));

        let largest = summary.largest_asteroid.unwrap();
        assert_eq!(largest.name, "(b)");
        assert_eq!(largest.diameter, 1.2);
        assert_eq!(largest.velocity, 60_000.0);
        assert_eq!(summary.fastest_asteroid.unwrap().name, "(c)");

        let energies: f64 = feed
            .iter()
            .map(|a| a.impact_energy(DEFAULT_DENSITY).megatons)
            .sum();
        assert!((summary.total_energy_megatons - energies).abs() < 0.01);
        assert!((summary.average_energy - energies / 3.0).abs() < 0.01);
        assert!(summary.max_energy_megatons >= summary.average_energy);
    }

    #[test]
    fn test_threat_summary_ties_keep_first() {
        let feed = vec![asteroid("a", 0.3, false), asteroid("b", 0.3, false)];
        let summary = summarize_threats(&feed);
        assert_eq!(summary.largest_asteroid.unwrap().name, "(a)");
        assert_eq!(summary.fastest_asteroid.unwrap().name, "(a)");
    }

    #[test]
    fn test_feed_window() {
        let app = state(Upstream::Available(vec![]), offline_geology());
        let today = NaiveDate::from_ymd_opt(2025, 10, 4).unwrap();
        let (start, end) = app.feed_window(today);
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 9, 27).unwrap());
        assert_eq!(end, today);
    }
}
