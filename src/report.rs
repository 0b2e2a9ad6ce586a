// Impact assessment report
// Plain-text summary over a batch of simulated impact scenarios

use chrono::{DateTime, TimeZone};
use std::fmt::{self, Write};

use crate::consequences::{assess_impact, ImpactResult};
use crate::parameters::{ImpactParameters, DEFAULT_ANGLE_DEG};
use crate::physics_engine::{CraterScaling, ROCK_DENSITY};

const RULE_WIDTH: usize = 70;

struct SampleScenario {
    name: &'static str,
    diameter_km: f64,
    velocity_kmh: f64,
    target: (f64, f64),
}

const SAMPLE_SCENARIOS: [SampleScenario; 3] = [
    SampleScenario {
        name: "2024 TM3",
        diameter_km: 0.030,
        velocity_kmh: 45_000.0,
        target: (40.7128, -74.0060),
    },
    SampleScenario {
        name: "186822 (2004 FE31)",
        diameter_km: 1.637,
        velocity_kmh: 25_000.0,
        target: (51.5074, -0.1278),
    },
    SampleScenario {
        name: "2019 FT",
        diameter_km: 0.025,
        velocity_kmh: 108_673.0,
        target: (35.6762, 139.6503),
    },
];

/// Built-in scenarios: three catalogued bodies striking New York, London and Tokyo
pub fn sample_scenarios() -> Vec<ImpactResult> {
    SAMPLE_SCENARIOS
        .iter()
        .map(|s| {
            let params = ImpactParameters {
                diameter_m: s.diameter_km * 1000.0,
                velocity_kms: s.velocity_kmh / 3600.0,
                density_kg_m3: ROCK_DENSITY,
                entry_angle_deg: DEFAULT_ANGLE_DEG,
                impact_latitude: s.target.0,
                impact_longitude: s.target.1,
            };
            assess_impact(s.name, &params, CraterScaling::MegatonPower)
        })
        .collect()
}

/// Group digits in thousands: 1234567 -> "1,234,567"
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn usd(amount: f64) -> String {
    format!("${}", group_thousands(amount.max(0.0).round() as u64))
}

/// Write the assessment report for a set of impacts
pub fn write_report<W, Tz>(
    out: &mut W,
    events: &[ImpactResult],
    generated_at: &DateTime<Tz>,
) -> fmt::Result
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let rule = "=".repeat(RULE_WIDTH);
    let total_population: u64 = events.iter().map(|e| e.population_affected).sum();
    let total_damage: f64 = events.iter().map(|e| e.economic_damage_usd).sum();

    writeln!(out, "METEOR IMPACT CONSEQUENCE ASSESSMENT REPORT")?;
    writeln!(out, "{}", rule)?;
    writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out)?;
    writeln!(out, "SCENARIO ANALYSIS:")?;
    writeln!(out, "Total Scenarios Analyzed: {}", events.len())?;
    writeln!(out, "Combined Population at Risk: {}", group_thousands(total_population))?;
    writeln!(out, "Total Economic Damage: {}", usd(total_damage))?;
    writeln!(out)?;
    writeln!(out, "INDIVIDUAL IMPACT SCENARIOS:")?;

    for (i, event) in events.iter().enumerate() {
        writeln!(out)?;
        writeln!(out, "Scenario {}: {}", i + 1, event.asteroid_name)?;
        writeln!(out, "{}", "-".repeat(40))?;
        writeln!(
            out,
            "Location: {:.2}°N, {:.2}°E",
            event.impact_location.0, event.impact_location.1
        )?;
        writeln!(out, "Energy: {:.2} megatons TNT equivalent", event.energy_megatons)?;
        writeln!(out, "Crater: {:.2} km diameter", event.crater_diameter_km)?;
        writeln!(out, "Blast: {:.2} km radius", event.blast_radius_km)?;
        writeln!(out, "Seismic: Magnitude {:.1} earthquake", event.seismic_magnitude)?;
        writeln!(
            out,
            "Casualties: {} people affected",
            group_thousands(event.population_affected)
        )?;
        writeln!(out, "Economic: {} in damages", usd(event.economic_damage_usd))?;
        if let Some(ctx) = &event.geological_context {
            writeln!(out, "Nearby M4+ earthquakes: {}", ctx.earthquakes.len())?;
            if let Some(elevation) = ctx.elevation_meters {
                writeln!(out, "Elevation: {:.0} m", elevation)?;
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "{}", rule)
}

/// Render the assessment report into a string
pub fn render_report<Tz>(
    events: &[ImpactResult],
    generated_at: &DateTime<Tz>,
) -> Result<String, fmt::Error>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut out = String::new();
    write_report(&mut out, events, generated_at)?;
    Ok(out)
}
