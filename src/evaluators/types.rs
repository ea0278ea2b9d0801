//! Rows and reports produced by the evaluators.

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::output::SummaryRow;

/// Totals and means for one travel mode over the observed trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeSummary {
    #[serde(rename = "type")]
    pub mode: String,
    pub total_waiting_time: f64,
    pub total_walking_time: f64,
    pub total_veh_moving_time: f64,
    pub total_veh_moving_dist: f64,
    pub total_veh_moving_price: f64,

    pub mean_waiting_time: f64,
    pub mean_walking_time: f64,
    pub mean_veh_moving_time: f64,
    pub mean_veh_moving_dist: f64,
    pub mean_veh_moving_price: f64,
}

impl SummaryRow for ModeSummary {
    const COLUMNS: &'static [&'static str] = &[
        "type",
        "total_waiting_time",
        "total_walking_time",
        "total_veh_moving_time",
        "total_veh_moving_dist",
        "total_veh_moving_price",
        "mean_waiting_time",
        "mean_walking_time",
        "mean_veh_moving_time",
        "mean_veh_moving_dist",
        "mean_veh_moving_price",
    ];
}

/// Totals and means for one evaluation of the simulated events.
///
/// Rows carry no label; their position says which run they belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub total_waiting_time: f64,
    pub total_walking_time: f64,
    pub total_veh_moving_time: f64,
    pub total_veh_moving_dist: f64,

    pub mean_waiting_time: f64,
    pub mean_walking_time: f64,
    pub mean_veh_moving_time: f64,
    pub mean_veh_moving_dist: f64,
}

impl SummaryRow for SimulationSummary {
    const COLUMNS: &'static [&'static str] = &[
        "total_waiting_time",
        "total_walking_time",
        "total_veh_moving_time",
        "total_veh_moving_dist",
        "mean_waiting_time",
        "mean_walking_time",
        "mean_veh_moving_time",
        "mean_veh_moving_dist",
    ];
}

/// A trip whose provider query did not produce a usable result.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedTrip {
    /// Row position in the trip table.
    pub index: usize,
    pub reason: ProviderError,
}

/// Accounting for one provider-backed mode evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeReport {
    pub mode: String,
    pub queried: usize,
    pub skipped: Vec<SkippedTrip>,
}

impl ModeReport {
    /// Trips that contributed to the summary row.
    pub fn routed(&self) -> usize {
        self.queried - self.skipped.len()
    }
}
