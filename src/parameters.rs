// Parameter Normalizer
// Turns loosely-typed request fields into validated impact parameters

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::consequences::DensityTier;
use crate::error::ValidationError;
use crate::physics_engine::{blast_radius_km, ImpactEnergy, DEFAULT_DENSITY};

pub const DEFAULT_DIAMETER_M: f64 = 100.0;
pub const DEFAULT_VELOCITY_KMS: f64 = 20.0;
pub const DEFAULT_ANGLE_DEG: f64 = 45.0;
/// Mexico City
pub const DEFAULT_LOCATION: &str = "19.4326, -99.1332";
/// New York, used when an asteroid simulation omits coordinates
pub const DEFAULT_TARGET: (f64, f64) = (40.7128, -74.0060);

// =============================================================================
// REQUEST TYPES
// =============================================================================

/// A numeric field that clients may send either as a JSON number or a string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    fn parse(&self, field: &'static str) -> Result<f64, ValidationError> {
        let value = match self {
            NumericInput::Number(n) => *n,
            NumericInput::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                ValidationError::InvalidNumber {
                    field,
                    value: s.clone(),
                }
            })?,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ValidationError::InvalidNumber {
                field,
                value: value.to_string(),
            })
        }
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        NumericInput::Number(value)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        NumericInput::Text(value.to_string())
    }
}

/// Body of an advanced simulation request. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub diameter: Option<NumericInput>,
    pub velocity: Option<NumericInput>,
    pub density: Option<NumericInput>,
    pub angle: Option<NumericInput>,
    pub location: Option<String>,
}

/// Body of a catalogued-asteroid simulation request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AsteroidImpactRequest {
    pub asteroid_id: Option<String>,
    pub latitude: Option<NumericInput>,
    pub longitude: Option<NumericInput>,
}

impl AsteroidImpactRequest {
    /// Validated impact coordinates, defaulting to New York
    pub fn target(&self) -> Result<(f64, f64), ValidationError> {
        let latitude = field_or(&self.latitude, "latitude", DEFAULT_TARGET.0)?;
        let longitude = field_or(&self.longitude, "longitude", DEFAULT_TARGET.1)?;
        check_coordinates(latitude, longitude)?;
        Ok((latitude, longitude))
    }
}

// =============================================================================
// NORMALIZED PARAMETERS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactParameters {
    pub diameter_m: f64,
    pub velocity_kms: f64,
    pub density_kg_m3: f64,
    pub entry_angle_deg: f64,
    pub impact_latitude: f64,
    pub impact_longitude: f64,
}

impl ImpactParameters {
    /// Build parameters from already-numeric values, applying range checks
    pub fn new(
        diameter_m: f64,
        velocity_kms: f64,
        density_kg_m3: f64,
        entry_angle_deg: f64,
        location: (f64, f64),
    ) -> Result<Self, ValidationError> {
        require_positive("diameter", diameter_m)?;
        require_positive("velocity", velocity_kms)?;
        require_positive("density", density_kg_m3)?;
        if !(0.0..=90.0).contains(&entry_angle_deg) {
            return Err(ValidationError::OutOfRange {
                field: "angle",
                value: entry_angle_deg,
                expected: "between 0 and 90 degrees",
            });
        }
        check_coordinates(location.0, location.1)?;
        check_energy(diameter_m, velocity_kms, density_kg_m3)?;

        Ok(Self {
            diameter_m,
            velocity_kms,
            density_kg_m3,
            entry_angle_deg,
            impact_latitude: location.0,
            impact_longitude: location.1,
        })
    }

    pub fn location(&self) -> (f64, f64) {
        (self.impact_latitude, self.impact_longitude)
    }
}

/// Apply defaults, parse and range-check a raw simulation request.
///
/// Nothing downstream runs if any field fails.
pub fn normalize(request: &SimulationRequest) -> Result<ImpactParameters, ValidationError> {
    let diameter = field_or(&request.diameter, "diameter", DEFAULT_DIAMETER_M)?;
    let velocity = field_or(&request.velocity, "velocity", DEFAULT_VELOCITY_KMS)?;
    let density = field_or(&request.density, "density", DEFAULT_DENSITY)?;
    let angle = field_or(&request.angle, "angle", DEFAULT_ANGLE_DEG)?;
    let location = parse_location(request.location.as_deref().unwrap_or(DEFAULT_LOCATION))?;

    ImpactParameters::new(diameter, velocity, density, angle, location)
}

/// Parse a "lat, lon" pair
pub fn parse_location(raw: &str) -> Result<(f64, f64), ValidationError> {
    let invalid = || ValidationError::InvalidLocation(raw.to_string());

    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    let [lat, lon] = parts.as_slice() else {
        return Err(invalid());
    };
    let lat: f64 = lat.parse().map_err(|_| invalid())?;
    let lon: f64 = lon.parse().map_err(|_| invalid())?;
    if !lat.is_finite() || !lon.is_finite() {
        return Err(invalid());
    }
    Ok((lat, lon))
}

fn field_or(
    input: &Option<NumericInput>,
    field: &'static str,
    default: f64,
) -> Result<f64, ValidationError> {
    input.as_ref().map_or(Ok(default), |v| v.parse(field))
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            expected: "greater than zero",
        })
    }
}

/// Energy must stay finite and its densest blast circle must fit a population count
fn check_energy(
    diameter_m: f64,
    velocity_kms: f64,
    density_kg_m3: f64,
) -> Result<(), ValidationError> {
    let megatons = ImpactEnergy::from_body(diameter_m, velocity_kms, density_kg_m3).megatons;
    if !megatons.is_finite() {
        return Err(ValidationError::OutOfRange {
            field: "energy_megatons",
            value: megatons,
            expected: "finite",
        });
    }

    let peak_population =
        PI * blast_radius_km(megatons).powi(2) * DensityTier::Urban.people_per_km2();
    if peak_population >= u64::MAX as f64 {
        return Err(ValidationError::OutOfRange {
            field: "energy_megatons",
            value: megatons,
            expected: "small enough for a population estimate",
        });
    }
    Ok(())
}

fn check_coordinates(latitude: f64, longitude: f64) -> Result<(), ValidationError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ValidationError::OutOfRange {
            field: "latitude",
            value: latitude,
            expected: "between -90 and 90",
        });
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ValidationError::OutOfRange {
            field: "longitude",
            value: longitude,
            expected: "between -180 and 180",
        });
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
