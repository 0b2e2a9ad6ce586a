// Physics Engine - Impact Consequence Physics
// Empirical scaling laws for impact energy, cratering, blast and seismic coupling,
// plus a simple atmospheric entry stepper with drag and ablation

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

// =============================================================================
// PHYSICAL CONSTANTS (SI Units)
// =============================================================================

/// Joules per megaton of TNT
pub const JOULES_PER_MEGATON: f64 = 4.184e15;

/// Divisor for the per-step liberated energy estimate in the entry stepper
pub const ENTRY_ENERGY_DIVISOR: f64 = 4.184e12;

/// Overpressure ceiling (kPa)
pub const MAX_OVERPRESSURE_KPA: f64 = 50_000.0;

/// Default bulk density for stony impactors (kg/m³)
pub const DEFAULT_DENSITY: f64 = 3000.0;

/// Rock density used for catalogued NEOs with unknown composition (kg/m³)
pub const ROCK_DENSITY: f64 = 2600.0;

/// Entry interface altitude (km)
pub const ENTRY_ALTITUDE_KM: f64 = 120.0;

/// Number of discrete descent steps
pub const ENTRY_STEPS: usize = 24;

/// Atmospheric scale height used by the density factor (km)
pub const SCALE_HEIGHT_KM: f64 = 10.0;

/// Residual mass fraction that survives ablation
pub const MIN_MASS_FRACTION: f64 = 0.05;

// =============================================================================
// IMPACT PHYSICS
// =============================================================================

/// Mass of a spherical body (kg)
pub fn sphere_mass(diameter_m: f64, density_kg_m3: f64) -> f64 {
    let radius = diameter_m / 2.0;
    (4.0 / 3.0) * PI * radius.powi(3) * density_kg_m3
}

/// Kinetic energy in joules for a mass moving at `velocity_kms`
pub fn kinetic_energy_joules(mass_kg: f64, velocity_kms: f64) -> f64 {
    let velocity_ms = velocity_kms * 1000.0;
    0.5 * mass_kg * velocity_ms * velocity_ms
}

pub fn joules_to_megatons(energy_joules: f64) -> f64 {
    energy_joules / JOULES_PER_MEGATON
}

/// Crater scaling law. Two incompatible empirical fits are in use and the
/// caller picks the one matching its request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CraterScaling {
    /// D = (E_J · 1e-12)^(1/3.4) · 0.05, used by the advanced simulation
    JouleRoot,
    /// D = 1.8 · E_MT^0.28, used by catalogued asteroid simulations
    MegatonPower,
}

impl CraterScaling {
    /// Final crater diameter (km) for an impact of the given energy
    pub fn crater_diameter_km(self, energy: &ImpactEnergy) -> f64 {
        match self {
            CraterScaling::JouleRoot => (energy.joules * 1e-12).powf(1.0 / 3.4) * 0.05,
            CraterScaling::MegatonPower => 1.8 * energy.megatons.powf(0.28),
        }
    }
}

/// Severe-damage blast radius (km)
pub fn blast_radius_km(energy_megatons: f64) -> f64 {
    0.28 * energy_megatons.powf(0.33)
}

/// Simplified peak overpressure (kPa), hard-capped
pub fn overpressure_kpa(energy_megatons: f64) -> f64 {
    (energy_megatons * 100.0).min(MAX_OVERPRESSURE_KPA)
}

/// Equivalent earthquake magnitude. Zero for non-positive energy (log guard).
pub fn seismic_magnitude(energy_megatons: f64) -> f64 {
    if energy_megatons > 0.0 {
        ((2.0 / 3.0) * energy_megatons.log10() + 3.2).max(0.0)
    } else {
        0.0
    }
}

/// Energy budget of an impactor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactEnergy {
    pub mass_kg: f64,
    pub joules: f64,
    pub megatons: f64,
}

impl ImpactEnergy {
    pub fn from_body(diameter_m: f64, velocity_kms: f64, density_kg_m3: f64) -> Self {
        let mass_kg = sphere_mass(diameter_m, density_kg_m3);
        let joules = kinetic_energy_joules(mass_kg, velocity_kms);
        Self {
            mass_kg,
            joules,
            megatons: joules_to_megatons(joules),
        }
    }
}

/// Physical consequences derived from a single energy release
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalEffects {
    pub energy: ImpactEnergy,
    pub crater_diameter_km: f64,
    pub blast_radius_km: f64,
    pub overpressure_kpa: f64,
    pub seismic_magnitude: f64,
}

impl PhysicalEffects {
    pub fn compute(energy: ImpactEnergy, crater: CraterScaling) -> Self {
        Self {
            crater_diameter_km: crater.crater_diameter_km(&energy),
            blast_radius_km: blast_radius_km(energy.megatons),
            overpressure_kpa: overpressure_kpa(energy.megatons),
            seismic_magnitude: seismic_magnitude(energy.megatons),
            energy,
        }
    }
}

// =============================================================================
// ATMOSPHERIC ENTRY
// =============================================================================

/// One descent step of the entry stepper
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    pub altitude_km: f64,
    pub velocity_kms: f64,
    pub mass_fraction_percent: f64,
    /// Cumulative ablation energy, in the stepper's megaton-equivalent scale
    pub energy_liberated: f64,
}

/// Fraction of full atmospheric effect at a given altitude
pub fn atmospheric_density_factor(altitude_km: f64) -> f64 {
    1.0 - (-altitude_km / SCALE_HEIGHT_KM).exp()
}

/// Step a body from the entry interface to the ground.
///
/// Drag is applied first; ablation then uses the already-slowed velocity.
/// Mass never drops below `MIN_MASS_FRACTION` of the initial mass, and the
/// run stops at the first step that reaches the ground.
pub fn simulate_atmospheric_entry(
    diameter_m: f64,
    velocity_kms: f64,
    density_kg_m3: f64,
) -> Vec<TrajectorySample> {
    let altitude_step = ENTRY_ALTITUDE_KM / ENTRY_STEPS as f64;
    let initial_mass = sphere_mass(diameter_m, density_kg_m3);
    let floor_mass = initial_mass * MIN_MASS_FRACTION;

    let mut altitude = ENTRY_ALTITUDE_KM;
    let mut velocity = velocity_kms;
    let mut mass = initial_mass;
    let mut trajectory = Vec::with_capacity(ENTRY_STEPS);

    for _ in 0..ENTRY_STEPS {
        altitude -= altitude_step;

        let density_factor = atmospheric_density_factor(altitude);
        let drag = 0.05 * density_factor;
        velocity *= 1.0 - drag;

        let ablation_rate = 0.02 * density_factor * (velocity / 20.0);
        mass = (mass * (1.0 - ablation_rate)).max(floor_mass);

        let velocity_ms = velocity * 1000.0;

        trajectory.push(TrajectorySample {
            altitude_km: altitude.max(0.0),
            velocity_kms: velocity,
            mass_fraction_percent: mass / initial_mass * 100.0,
            energy_liberated: (initial_mass - mass) * velocity_ms.powi(2) / ENTRY_ENERGY_DIVISOR,
        });

        if altitude <= 0.0 {
            break;
        }
    }

    trajectory
}

// =============================================================================
// TESTS
// =============================================================================
