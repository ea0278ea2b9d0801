use chrono::NaiveDateTime;
use serde::Serialize;

/// One observed trip, timestamps normalized to naive UTC.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRecord {
    pub request_time: NaiveDateTime,
    pub pickup_time: NaiveDateTime,
    pub dropoff_time: NaiveDateTime,

    pub request_lat: f64,
    pub request_lon: f64,
    pub pickup_lat: f64,
    pub pickup_lon: f64,
    pub dropoff_lat: f64,
    pub dropoff_lon: f64,

    // only present when the table carries these columns
    pub straight_distance_km: Option<f64>,
    pub fare: Option<f64>,
}

impl TripRecord {
    /// Minutes between request and pickup. Negative values are kept as-is.
    pub fn waiting_time(&self) -> f64 {
        minutes_between(self.request_time, self.pickup_time)
    }

    /// Minutes between pickup and dropoff.
    pub fn moving_time(&self) -> f64 {
        minutes_between(self.pickup_time, self.dropoff_time)
    }

    /// True when request <= pickup <= dropoff.
    pub fn is_ordered(&self) -> bool {
        self.request_time <= self.pickup_time && self.pickup_time <= self.dropoff_time
    }
}

fn minutes_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_milliseconds() as f64 / 60_000.0
}
