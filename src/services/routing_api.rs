//! Traits and types for the external routing providers an observed trip is
//! compared against.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::trips::TripRecord;

/// A single driving route as reported by a provider, in SI units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteMeasure {
    pub distance_m: f64,
    pub duration_s: f64,
    pub fare: f64,
}

/// One leg of a public transport itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitStep {
    pub distance_m: f64,
    pub duration_s: f64,
    /// `WALKING`, or the vehicle type (`BUS`, `SUBWAY`, ...) for ridden legs.
    pub travel_type: String,
}

impl TransitStep {
    pub fn is_walking(&self) -> bool {
        self.travel_type == "WALKING"
    }
}

/// A provider of driving routes between a trip's pickup and dropoff.
#[async_trait]
pub trait TaxiRouter: Send + Sync {
    /// Short provider name, used in the summary label (`taxi-<name>`).
    fn name(&self) -> &str;

    async fn route(&self, trip: &TripRecord) -> Result<RouteMeasure, ProviderError>;
}

/// A provider of multi-step public transport directions.
#[async_trait]
pub trait TransitRouter: Send + Sync {
    fn name(&self) -> &str;

    async fn directions(&self, trip: &TripRecord) -> Result<Vec<TransitStep>, ProviderError>;
}
