// Consequence Model - Population exposure, economic loss, result aggregation
// Coarse heuristics layered on top of the physics engine; not census data

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::parameters::ImpactParameters;
use crate::physics_engine::{CraterScaling, ImpactEnergy, PhysicalEffects};

/// Mean Earth radius (km) for great-circle distances
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance from a listed city that counts as urban (km)
pub const URBAN_RADIUS_KM: f64 = 100.0;

/// Global average GDP per capita (USD)
pub const GDP_PER_CAPITA_USD: f64 = 12_000.0;

/// Years of lost output charged per affected person
pub const HUMAN_CAPITAL_YEARS: f64 = 10.0;

/// Infrastructure replacement cost (USD per km²)
pub const INFRASTRUCTURE_COST_PER_KM2: f64 = 50_000_000.0;

/// Land value destroyed by the crater (USD per km²)
pub const LAND_VALUE_PER_KM2: f64 = 1_000_000.0;

/// Emergency response overhead on infrastructure and human capital losses
pub const RESPONSE_COST_FACTOR: f64 = 0.3;

// =============================================================================
// GEOGRAPHY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct City {
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
}

const fn city(name: &'static str, lat: f64, lon: f64) -> City {
    City { name, lat, lon }
}

/// Cities treated as dense urban cores by the exposure heuristic
pub const URBAN_CENTERS: [City; 5] = [
    city("New York", 40.7128, -74.0060),
    city("London", 51.5074, -0.1278),
    city("Tokyo", 35.6762, 139.6503),
    city("Mexico City", 19.4326, -99.1332),
    city("Delhi", 28.6139, 77.2090),
];

/// Cities used as targets for the threat map
pub const THREAT_MAP_CITIES: [City; 8] = [
    city("New York", 40.7128, -74.0060),
    city("London", 51.5074, -0.1278),
    city("Tokyo", 35.6762, 139.6503),
    city("Mexico City", 19.4326, -99.1332),
    city("Delhi", 28.6139, 77.2090),
    city("São Paulo", -23.5505, -46.6333),
    city("Cairo", 30.0444, 31.2357),
    city("Sydney", -33.8688, 151.2093),
];

/// Great-circle distance (km) using the Haversine formula
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

// =============================================================================
// POPULATION EXPOSURE
// =============================================================================

/// Population density tier selected for a location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DensityTier {
    Urban,
    Tropical,
    Temperate,
    Polar,
}

impl DensityTier {
    pub fn for_location(lat: f64, lon: f64) -> Self {
        let near_city = URBAN_CENTERS
            .iter()
            .any(|c| haversine_km(lat, lon, c.lat, c.lon) < URBAN_RADIUS_KM);
        if near_city {
            return DensityTier::Urban;
        }

        match lat.abs() {
            l if l < 30.0 => DensityTier::Tropical,
            l if l < 60.0 => DensityTier::Temperate,
            _ => DensityTier::Polar,
        }
    }

    /// People per km²
    pub fn people_per_km2(self) -> f64 {
        match self {
            DensityTier::Urban => 1000.0,
            DensityTier::Tropical => 50.0,
            DensityTier::Temperate => 20.0,
            DensityTier::Polar => 1.0,
        }
    }
}

/// Estimated population inside the blast circle
pub fn estimate_population(lat: f64, lon: f64, blast_radius_km: f64) -> u64 {
    let area_km2 = PI * blast_radius_km * blast_radius_km;
    let density = DensityTier::for_location(lat, lon).people_per_km2();
    // Saturating cast: NaN maps to 0
    (area_km2 * density).round().max(0.0) as u64
}

// =============================================================================
// ECONOMIC LOSS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EconomicLoss {
    pub infrastructure_usd: f64,
    pub human_capital_usd: f64,
    pub land_value_usd: f64,
    pub response_usd: f64,
}

impl EconomicLoss {
    pub fn estimate(population_affected: u64, blast_radius_km: f64, crater_diameter_km: f64) -> Self {
        let infrastructure_usd = PI * blast_radius_km.powi(2) * INFRASTRUCTURE_COST_PER_KM2;
        let human_capital_usd =
            population_affected as f64 * GDP_PER_CAPITA_USD * HUMAN_CAPITAL_YEARS;
        let land_value_usd = PI * (crater_diameter_km / 2.0).powi(2) * LAND_VALUE_PER_KM2;
        let response_usd = RESPONSE_COST_FACTOR * (infrastructure_usd + human_capital_usd);

        Self {
            infrastructure_usd,
            human_capital_usd,
            land_value_usd,
            response_usd,
        }
    }

    pub fn total_usd(&self) -> f64 {
        self.infrastructure_usd + self.human_capital_usd + self.land_value_usd + self.response_usd
    }
}

// =============================================================================
// AGGREGATED RESULT
// =============================================================================

/// A nearby historical earthquake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Earthquake {
    pub magnitude: Option<f64>,
    pub place: Option<String>,
    /// Event time, milliseconds since the Unix epoch
    pub time_ms: Option<i64>,
}

/// Geological annotation attached after the physics is done
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeologicalContext {
    pub earthquakes: Vec<Earthquake>,
    pub elevation_meters: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactResult {
    pub asteroid_name: String,
    pub diameter_km: f64,
    pub velocity_kmh: f64,
    pub impact_location: (f64, f64),
    pub energy_megatons: f64,
    pub crater_diameter_km: f64,
    pub blast_radius_km: f64,
    pub overpressure_kpa: f64,
    pub seismic_magnitude: f64,
    pub population_affected: u64,
    pub economic_damage_usd: f64,
    pub geological_context: Option<GeologicalContext>,
}

impl ImpactResult {
    pub fn earthquake_count(&self) -> usize {
        self.geological_context
            .as_ref()
            .map_or(0, |ctx| ctx.earthquakes.len())
    }
}

/// Run the physical and human consequence chain for one impactor
pub fn assess_impact(
    asteroid_name: &str,
    params: &ImpactParameters,
    crater: CraterScaling,
) -> ImpactResult {
    let energy = ImpactEnergy::from_body(params.diameter_m, params.velocity_kms, params.density_kg_m3);
    let effects = PhysicalEffects::compute(energy, crater);
    let (lat, lon) = params.location();

    let population_affected = estimate_population(lat, lon, effects.blast_radius_km);
    let loss = EconomicLoss::estimate(
        population_affected,
        effects.blast_radius_km,
        effects.crater_diameter_km,
    );

    log::debug!(
        "{}: {:.3} MT, crater {:.3} km, blast {:.3} km, {} people",
        asteroid_name,
        energy.megatons,
        effects.crater_diameter_km,
        effects.blast_radius_km,
        population_affected
    );

    ImpactResult {
        asteroid_name: asteroid_name.to_string(),
        diameter_km: params.diameter_m / 1000.0,
        velocity_kmh: params.velocity_kms * 3600.0,
        impact_location: (lat, lon),
        energy_megatons: energy.megatons,
        crater_diameter_km: effects.crater_diameter_km,
        blast_radius_km: effects.blast_radius_km,
        overpressure_kpa: effects.overpressure_kpa,
        seismic_magnitude: effects.seismic_magnitude,
        population_affected,
        economic_damage_usd: loss.total_usd(),
        geological_context: None,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_known_distance() {
        // New York to London is roughly 5570 km
        let d = haversine_km(40.7128, -74.0060, 51.5074, -0.1278);
        assert!((d - 5570.0).abs() < 20.0, "distance was {}", d);
        assert!(haversine_km(10.0, 20.0, 10.0, 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_density_tiers() {
        assert_eq!(DensityTier::for_location(40.7128, -74.0060), DensityTier::Urban);
        // ~50 km from central London
        assert_eq!(DensityTier::for_location(51.9, -0.3), DensityTier::Urban);
        assert_eq!(DensityTier::for_location(0.0, -150.0), DensityTier::Tropical);
        assert_eq!(DensityTier::for_location(-45.0, 170.0), DensityTier::Temperate);
        assert_eq!(DensityTier::for_location(75.0, 40.0), DensityTier::Polar);
        assert_eq!(DensityTier::for_location(-90.0, 0.0), DensityTier::Polar);
    }

    #[test]
    fn test_population_at_city_center() {
        let population = estimate_population(40.7128, -74.0060, 10.0);
        assert_eq!(population, (PI * 100.0 * 1000.0).round() as u64);
        assert_eq!(population, 314_159);
    }

    #[test]
    fn test_population_zero_radius() {
        assert_eq!(estimate_population(10.0, 10.0, 0.0), 0);
    }

    #[test]
    fn test_economic_loss_components() {
        let loss = EconomicLoss::estimate(1000, 2.0, 4.0);
        let infrastructure = PI * 4.0 * 50_000_000.0;
        let human = 1000.0 * 12_000.0 * 10.0;
        let land = PI * 4.0 * 1_000_000.0;
        let response = 0.3 * (infrastructure + human);

        assert!((loss.infrastructure_usd - infrastructure).abs() < 1e-3);
        assert!((loss.human_capital_usd - human).abs() < 1e-3);
        assert!((loss.land_value_usd - land).abs() < 1e-3);
        assert!((loss.response_usd - response).abs() < 1e-3);
        assert!((loss.total_usd() - (infrastructure + human + land + response)).abs() < 1e-3);
    }

    #[test]
    fn test_estimates_non_negative_across_globe() {
        for lat in [-90.0, -45.0, 0.0, 29.9, 60.0, 90.0] {
            for lon in [-180.0, -74.006, 0.0, 139.65, 180.0] {
                for radius in [0.0, 0.5, 12.0] {
                    let population = estimate_population(lat, lon, radius);
                    let loss = EconomicLoss::estimate(population, radius, radius);
                    assert!(loss.total_usd() >= 0.0);
                }
            }
        }
    }

    #[test]
    fn test_assess_impact_reference() {
        let params = ImpactParameters::new(100.0, 20.0, 3000.0, 45.0, (40.7128, -74.0060)).unwrap();
        let result = assess_impact("Reference", &params, CraterScaling::JouleRoot);

        assert!((result.energy_megatons - 75.0).abs() / 75.0 < 0.05);
        assert!(result.crater_diameter_km > 0.0);
        assert!(result.blast_radius_km > 0.0);
        assert!(result.seismic_magnitude > 0.0);
        assert!((result.diameter_km - 0.1).abs() < 1e-12);
        assert!((result.velocity_kmh - 72_000.0).abs() < 1e-9);
        assert_eq!(
            result.population_affected,
            estimate_population(40.7128, -74.0060, result.blast_radius_km)
        );
        let expected_loss = EconomicLoss::estimate(
            result.population_affected,
            result.blast_radius_km,
            result.crater_diameter_km,
        );
        assert_eq!(result.economic_damage_usd, expected_loss.total_usd());
        assert_eq!(result.earthquake_count(), 0);
    }

    #[test]
    fn test_assess_impact_deterministic() {
        let params = ImpactParameters::new(250.0, 17.0, 2600.0, 30.0, (-33.0, 151.0)).unwrap();
        let a = assess_impact("Repeat", &params, CraterScaling::MegatonPower);
        let b = assess_impact("Repeat", &params, CraterScaling::MegatonPower);
        assert_eq!(a, b);
    }
}
