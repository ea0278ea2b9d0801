//! Records produced by a mobility simulation. All times are in minutes.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::geo::haversine;
use crate::units::DistanceUnit;

/// A person waiting or walking over `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimEvent {
    pub timestamp: (f64, f64),
}

impl SimEvent {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            timestamp: (start, end),
        }
    }

    pub fn duration(&self) -> f64 {
        self.timestamp.1 - self.timestamp.0
    }
}

/// A `[lon, lat]` pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint(pub f64, pub f64);

impl Waypoint {
    pub fn lon(&self) -> f64 {
        self.0
    }

    pub fn lat(&self) -> f64 {
        self.1
    }
}

/// One vehicle trip: the time stamps bracket the trip, the waypoints trace it.
///
/// Only the first and last time stamps matter; waypoints are not matched to
/// time stamps one by one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleTrip {
    pub timestamp: Vec<f64>,
    pub trip: Vec<Waypoint>,
}

impl VehicleTrip {
    /// First and last time stamp, if any.
    pub fn span(&self) -> Option<(f64, f64)> {
        Some((*self.timestamp.first()?, *self.timestamp.last()?))
    }

    /// Great-circle length of the trajectory, summed segment by segment.
    pub fn distance(&self, unit: DistanceUnit) -> f64 {
        self.trip
            .windows(2)
            .map(|pair| haversine((pair[0].lat(), pair[0].lon()), (pair[1].lat(), pair[1].lon()), unit))
            .sum()
    }
}

/// Reads a JSON array of events or trips from disk.
pub fn load_json<T: serde::de::DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>> {
    let file = std::fs::File::open(path)?;
    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
}
