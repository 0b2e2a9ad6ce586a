// External data capabilities
// Collaborators are injected into AppState; each call is a single bounded attempt

use std::future::Future;

use crate::api_client::NeoAsteroid;
use crate::consequences::Earthquake;

/// Outcome of a best-effort fetch. Failures are values, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Upstream<T> {
    Available(T),
    Unavailable { reason: String },
}

impl<T> Upstream<T> {
    pub fn unavailable(reason: impl ToString) -> Self {
        Upstream::Unavailable {
            reason: reason.to_string(),
        }
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Upstream::Available(value) => Some(value),
            Upstream::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Upstream::Available(_))
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for Upstream<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Upstream::Available(value),
            Err(err) => Upstream::unavailable(err),
        }
    }
}

/// Source of near-earth-object close approach data
pub trait NeoSource {
    /// NEOs with close approaches between two `YYYY-MM-DD` dates
    fn feed(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> impl Future<Output = Upstream<Vec<NeoAsteroid>>> + Send;
}

/// Source of historical seismicity and terrain data
pub trait GeologicalSource {
    fn nearby_seismicity(
        &self,
        lat: f64,
        lon: f64,
        radius_km: f64,
    ) -> impl Future<Output = Upstream<Vec<Earthquake>>> + Send;

    fn elevation(&self, lat: f64, lon: f64) -> impl Future<Output = Upstream<f64>> + Send;
}
