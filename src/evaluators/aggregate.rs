//! Folding per-trip measurements into a [`ModeSummary`].

use serde::{Deserialize, Serialize};

use crate::evaluators::types::{ModeSummary, SkippedTrip};
use crate::evaluators::utility::ratio;
use crate::error::ProviderError;
use crate::parser::OptionalColumns;
use crate::services::routing_api::{RouteMeasure, TransitStep};
use crate::trips::TripRecord;
use crate::units::{DistanceUnit, TimeUnit};

/// Units and batch size for one provider-backed evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalOptions {
    pub distance_unit: DistanceUnit,
    pub time_unit: TimeUnit,
    /// Upper bound on provider queries in flight.
    pub concurrency: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            distance_unit: DistanceUnit::Km,
            time_unit: TimeUnit::Minutes,
            concurrency: 4,
        }
    }
}

/// Running sums for one mode. Means divide by `count`, except distance and
/// price when only some trips carried a value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModeTotals {
    pub waiting_time: f64,
    pub walking_time: f64,
    pub veh_moving_time: f64,
    pub veh_moving_dist: f64,
    pub veh_moving_price: f64,
    pub count: usize,
    /// Trips that contributed a distance, when not every trip did.
    pub dist_count: Option<usize>,
    /// Trips that contributed a price, when not every trip did.
    pub price_count: Option<usize>,
}

impl ModeTotals {
    pub fn summarize(&self, mode: &str) -> ModeSummary {
        ModeSummary {
            mode: mode.to_string(),
            total_waiting_time: self.waiting_time,
            total_walking_time: self.walking_time,
            total_veh_moving_time: self.veh_moving_time,
            total_veh_moving_dist: self.veh_moving_dist,
            total_veh_moving_price: self.veh_moving_price,
            mean_waiting_time: ratio(self.waiting_time, self.count),
            mean_walking_time: ratio(self.walking_time, self.count),
            mean_veh_moving_time: ratio(self.veh_moving_time, self.count),
            mean_veh_moving_dist: ratio(self.veh_moving_dist, self.dist_count.unwrap_or(self.count)),
            mean_veh_moving_price: ratio(self.veh_moving_price, self.price_count.unwrap_or(self.count)),
        }
    }
}

/// Sums the recorded timestamps, straight-line distance and fare.
///
/// Trips with a blank distance or fare are left out of that column's sum and
/// mean only. Returns the name of the first optional column the table lacks.
pub fn baseline_totals(
    trips: &[TripRecord],
    columns: OptionalColumns,
) -> Result<ModeTotals, &'static str> {
    if !columns.straight_distance_km {
        return Err("straight_distance_km");
    }
    if !columns.fare {
        return Err("fare");
    }

    let mut totals = ModeTotals::default();
    let (mut dist_count, mut price_count) = (0, 0);
    for trip in trips {
        totals.waiting_time += trip.waiting_time();
        totals.veh_moving_time += trip.moving_time();
        if let Some(km) = trip.straight_distance_km {
            totals.veh_moving_dist += km;
            dist_count += 1;
        }
        if let Some(fare) = trip.fare {
            totals.veh_moving_price += fare;
            price_count += 1;
        }
        totals.count += 1;
    }
    totals.dist_count = Some(dist_count);
    totals.price_count = Some(price_count);
    Ok(totals)
}

/// Folds taxi routes over the trips they were queried for.
///
/// Waiting time comes from the observed trip: providers do not estimate it.
/// Failed queries are left out of every field and returned as skips.
pub fn taxi_totals(
    trips: &[TripRecord],
    outcomes: Vec<Result<RouteMeasure, ProviderError>>,
    options: &EvalOptions,
) -> (ModeTotals, Vec<SkippedTrip>) {
    let mut totals = ModeTotals::default();
    let mut skipped = Vec::new();

    for (index, (trip, outcome)) in trips.iter().zip(outcomes).enumerate() {
        match outcome {
            Ok(route) => {
                totals.waiting_time += options.time_unit.convert_seconds(trip.waiting_time() * 60.0);
                totals.veh_moving_time += options.time_unit.convert_seconds(route.duration_s);
                totals.veh_moving_dist += options.distance_unit.convert_meters(route.distance_m);
                totals.veh_moving_price += route.fare;
                totals.count += 1;
            }
            Err(reason) => skipped.push(SkippedTrip { index, reason }),
        }
    }
    (totals, skipped)
}

/// Splits each itinerary into walking and ridden legs.
///
/// Transit carries no wait phase and no fare.
pub fn transit_totals(
    outcomes: Vec<Result<Vec<TransitStep>, ProviderError>>,
    options: &EvalOptions,
) -> (ModeTotals, Vec<SkippedTrip>) {
    let mut totals = ModeTotals::default();
    let mut skipped = Vec::new();

    for (index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(steps) => {
                for step in &steps {
                    let duration = options.time_unit.convert_seconds(step.duration_s);
                    if step.is_walking() {
                        totals.walking_time += duration;
                    } else {
                        totals.veh_moving_time += duration;
                        totals.veh_moving_dist += options.distance_unit.convert_meters(step.distance_m);
                    }
                }
                totals.count += 1;
            }
            Err(reason) => skipped.push(SkippedTrip { index, reason }),
        }
    }
    (totals, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trips::tests::{at, trip};

    fn step(kind: &str, distance_m: f64, duration_s: f64) -> TransitStep {
        TransitStep {
            distance_m,
            duration_s,
            travel_type: kind.to_string(),
        }
    }

    #[test]
    fn test_summarize_divides_by_count() {
        let totals = ModeTotals {
            waiting_time: 10.0,
            veh_moving_time: 40.0,
            veh_moving_dist: 8.0,
            veh_moving_price: 3000.0,
            count: 4,
            ..Default::default()
        };
        let row = totals.summarize("raw");
        assert_eq!(row.mode, "raw");
        assert_eq!(row.mean_waiting_time, 2.5);
        assert_eq!(row.mean_veh_moving_dist, 2.0);
        assert_eq!(row.mean_walking_time, 0.0);
    }

    #[test]
    fn test_summarize_empty_totals() {
        let row = ModeTotals::default().summarize("taxi-naver");
        assert_eq!(row.mean_veh_moving_time, 0.0);
        assert!(!row.mean_veh_moving_time.is_nan());
    }

    #[test]
    fn test_baseline_requires_fare_column() {
        let t = trip(at(8, 0, 0), at(8, 5, 0), at(8, 15, 0));
        let columns = OptionalColumns {
            straight_distance_km: true,
            fare: false,
        };
        assert_eq!(baseline_totals(&[t], columns), Err("fare"));
    }

    #[test]
    fn test_baseline_blank_fare_left_out_of_fare_mean() {
        let mut blank = trip(at(9, 0, 0), at(9, 4, 0), at(9, 20, 0));
        blank.fare = None;
        let trips = vec![trip(at(8, 0, 0), at(8, 2, 0), at(8, 12, 0)), blank];
        let columns = OptionalColumns {
            straight_distance_km: true,
            fare: true,
        };

        let row = baseline_totals(&trips, columns).unwrap().summarize("raw");
        assert_eq!(row.total_veh_moving_price, 9800.0);
        assert_eq!(row.mean_veh_moving_price, 9800.0);
        assert_eq!(row.total_veh_moving_dist, 14.0);
        assert_eq!(row.mean_veh_moving_dist, 7.0);
        // timestamps still cover both trips
        assert_eq!(row.mean_waiting_time, 3.0);
        assert_eq!(row.mean_veh_moving_time, 13.0);
    }

    #[test]
    fn test_taxi_skips_failed_trips_in_every_field() {
        let trips = vec![
            trip(at(8, 0, 0), at(8, 5, 0), at(8, 15, 0)),
            trip(at(9, 0, 0), at(9, 8, 0), at(9, 30, 0)),
        ];
        let outcomes = vec![
            Ok(RouteMeasure {
                distance_m: 4000.0,
                duration_s: 600.0,
                fare: 6000.0,
            }),
            Err(ProviderError::logical("naver", 1, "same origin and goal")),
        ];
        let (totals, skipped) = taxi_totals(&trips, outcomes, &EvalOptions::default());

        assert_eq!(totals.count, 1);
        assert_eq!(totals.waiting_time, 5.0);
        assert_eq!(totals.veh_moving_time, 10.0);
        assert_eq!(totals.veh_moving_dist, 4.0);
        assert_eq!(totals.veh_moving_price, 6000.0);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].index, 1);
    }

    #[test]
    fn test_taxi_native_units() {
        let trips = vec![trip(at(8, 0, 0), at(8, 2, 0), at(8, 15, 0))];
        let outcomes = vec![Ok(RouteMeasure {
            distance_m: 4000.0,
            duration_s: 600.0,
            fare: 0.0,
        })];
        let options = EvalOptions {
            distance_unit: DistanceUnit::M,
            time_unit: TimeUnit::Seconds,
            ..Default::default()
        };
        let (totals, _) = taxi_totals(&trips, outcomes, &options);
        assert_eq!(totals.waiting_time, 120.0);
        assert_eq!(totals.veh_moving_time, 600.0);
        assert_eq!(totals.veh_moving_dist, 4000.0);
    }

    #[test]
    fn test_transit_splits_walking_and_riding() {
        let outcomes = vec![
            Ok(vec![
                step("WALKING", 300.0, 240.0),
                step("BUS", 5000.0, 900.0),
                step("SUBWAY", 7000.0, 720.0),
                step("WALKING", 100.0, 60.0),
            ]),
            Err(ProviderError::logical("google", "ZERO_RESULTS", "no route")),
        ];
        let (totals, skipped) = transit_totals(outcomes, &EvalOptions::default());

        assert_eq!(totals.count, 1);
        assert_eq!(totals.walking_time, 5.0);
        assert_eq!(totals.veh_moving_time, 27.0);
        assert_eq!(totals.veh_moving_dist, 12.0);
        assert_eq!(totals.waiting_time, 0.0);
        assert_eq!(totals.veh_moving_price, 0.0);
        assert_eq!(skipped[0].index, 1);
    }
}
