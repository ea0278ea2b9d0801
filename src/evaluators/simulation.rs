//! Windowed totals over simulated waits, walks and vehicle trajectories.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

use crate::error::Result;
use crate::evaluators::types::SimulationSummary;
use crate::evaluators::utility::ratio;
use crate::events::{SimEvent, VehicleTrip};
use crate::output::ResultAccumulator;
use crate::units::DistanceUnit;
use crate::window::TimeWindow;

/// What the means are divided by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeanDenominator {
    /// Every registered event or trip, inside the window or not.
    #[default]
    SourceCount,
    /// Only the events or trips that passed the window test.
    IncludedCount,
}

impl FromStr for MeanDenominator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "source" => Ok(MeanDenominator::SourceCount),
            "included" => Ok(MeanDenominator::IncludedCount),
            other => Err(format!("unknown mean denominator '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub unit: DistanceUnit,
    pub window: TimeWindow,
    pub mean_over: MeanDenominator,
}

/// Sum of durations of the events lying inside `window`, and how many did.
fn interval_totals(events: &[SimEvent], window: &TimeWindow) -> (f64, usize) {
    events
        .iter()
        .filter(|e| window.contains(e.timestamp.0, e.timestamp.1))
        .fold((0.0, 0), |(total, n), e| (total + e.duration(), n + 1))
}

/// Evaluates borrowed simulation output, one summary row per call.
pub struct TrajectorySimulationEvaluator<'a> {
    trips: &'a [VehicleTrip],
    waits: &'a [SimEvent],
    moves: &'a [SimEvent],
    config: SimulationConfig,
    results: ResultAccumulator<SimulationSummary>,
}

impl<'a> TrajectorySimulationEvaluator<'a> {
    pub fn new(
        trips: &'a [VehicleTrip],
        waits: &'a [SimEvent],
        moves: &'a [SimEvent],
        config: SimulationConfig,
    ) -> Self {
        Self {
            trips,
            waits,
            moves,
            config,
            results: ResultAccumulator::new(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Moves the window for subsequent evaluations.
    pub fn set_window(&mut self, window: TimeWindow) {
        self.config.window = window;
    }

    /// Computes one summary row over the current window and appends it.
    ///
    /// With `reset`, previously accumulated rows are dropped first. Events
    /// and trips count only when they lie entirely inside the window; a
    /// counted trip contributes the length of its whole trajectory.
    #[tracing::instrument(skip(self), fields(start = self.config.window.start, end = self.config.window.end))]
    pub fn evaluate(&mut self, reset: bool) -> &SimulationSummary {
        if reset {
            self.results.clear();
        }
        let window = self.config.window;

        let (total_waiting_time, waits_in) = interval_totals(self.waits, &window);
        let (total_walking_time, moves_in) = interval_totals(self.moves, &window);

        let mut total_veh_moving_time = 0.0;
        let mut total_veh_moving_dist = 0.0;
        let mut trips_in = 0;
        for trip in self.trips {
            let Some((start, end)) = trip.span() else {
                continue;
            };
            if !window.contains(start, end) {
                continue;
            }
            total_veh_moving_time += end - start;
            total_veh_moving_dist += trip.distance(self.config.unit);
            trips_in += 1;
        }

        let (wait_n, move_n, trip_n) = match self.config.mean_over {
            MeanDenominator::SourceCount => (self.waits.len(), self.moves.len(), self.trips.len()),
            MeanDenominator::IncludedCount => (waits_in, moves_in, trips_in),
        };
        for (name, n) in [("wait", wait_n), ("move", move_n), ("trip", trip_n)] {
            if n == 0 {
                warn!(collection = name, "No events to average over; mean reported as 0");
            }
        }

        let row = SimulationSummary {
            total_waiting_time,
            total_walking_time,
            total_veh_moving_time,
            total_veh_moving_dist,
            mean_waiting_time: ratio(total_waiting_time, wait_n),
            mean_walking_time: ratio(total_walking_time, move_n),
            mean_veh_moving_time: ratio(total_veh_moving_time, trip_n),
            mean_veh_moving_dist: ratio(total_veh_moving_dist, trip_n),
        };

        info!(
            waits_in,
            moves_in,
            trips_in,
            total_veh_moving_dist,
            unit = %self.config.unit,
            row = self.results.len(),
            "Simulation summary appended"
        );
        self.results.push(row)
    }

    pub fn results(&self) -> &ResultAccumulator<SimulationSummary> {
        &self.results
    }

    pub fn export(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        self.results.export(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Waypoint;
    use crate::geo::haversine;

    fn fixture() -> (Vec<VehicleTrip>, Vec<SimEvent>, Vec<SimEvent>) {
        let trips = vec![
            VehicleTrip {
                timestamp: vec![10.0, 12.0, 25.0],
                trip: vec![Waypoint(127.0, 37.5), Waypoint(127.0, 37.51), Waypoint(127.01, 37.51)],
            },
            VehicleTrip {
                timestamp: vec![600.0, 640.0],
                trip: vec![Waypoint(127.1, 37.4), Waypoint(127.1, 37.45)],
            },
        ];
        let waits = vec![SimEvent::new(5.0, 10.0), SimEvent::new(590.0, 600.0), SimEvent::new(1000.0, 1003.0)];
        let moves = vec![SimEvent::new(0.0, 4.0), SimEvent::new(640.0, 650.0)];
        (trips, waits, moves)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_full_window_matches_unfiltered_sums() {
        let (trips, waits, moves) = fixture();
        let mut eval = TrajectorySimulationEvaluator::new(&trips, &waits, &moves, SimulationConfig::default());
        let row = eval.evaluate(false).clone();

        let dist: f64 = trips.iter().map(|t| t.distance(DistanceUnit::Km)).sum();
        assert_eq!(row.total_waiting_time, 18.0);
        assert_eq!(row.total_walking_time, 14.0);
        assert_eq!(row.total_veh_moving_time, 55.0);
        assert!(close(row.total_veh_moving_dist, dist));
        assert_eq!(row.mean_waiting_time, 6.0);
        assert_eq!(row.mean_walking_time, 7.0);
        assert_eq!(row.mean_veh_moving_time, 27.5);
        assert!(close(row.mean_veh_moving_dist, dist / 2.0));
    }

    #[test]
    fn test_window_excluding_everything_gives_zeros() {
        let (trips, waits, moves) = fixture();
        let config = SimulationConfig {
            window: TimeWindow::new(1200.0, 1300.0),
            ..Default::default()
        };
        let mut eval = TrajectorySimulationEvaluator::new(&trips, &waits, &moves, config);
        let row = eval.evaluate(false);

        assert_eq!(row.total_waiting_time, 0.0);
        assert_eq!(row.total_veh_moving_dist, 0.0);
        assert_eq!(row.mean_waiting_time, 0.0);
        assert_eq!(row.mean_walking_time, 0.0);
        assert_eq!(row.mean_veh_moving_time, 0.0);
    }

    #[test]
    fn test_partial_overlap_is_dropped_not_clamped() {
        let (trips, waits, moves) = fixture();
        let config = SimulationConfig {
            window: TimeWindow::new(0.0, 620.0),
            ..Default::default()
        };
        let mut eval = TrajectorySimulationEvaluator::new(&trips, &waits, &moves, config);
        let row = eval.evaluate(false);

        // the 600..640 trip straddles the end of the window
        assert_eq!(row.total_veh_moving_time, 15.0);
        assert_eq!(row.total_waiting_time, 15.0);
        assert_eq!(row.total_walking_time, 4.0);
        // means still divide by every registered event
        assert_eq!(row.mean_waiting_time, 5.0);
        assert_eq!(row.mean_veh_moving_time, 7.5);
    }

    #[test]
    fn test_included_count_denominator() {
        let (trips, waits, moves) = fixture();
        let config = SimulationConfig {
            window: TimeWindow::new(0.0, 620.0),
            mean_over: MeanDenominator::IncludedCount,
            ..Default::default()
        };
        let mut eval = TrajectorySimulationEvaluator::new(&trips, &waits, &moves, config);
        let row = eval.evaluate(false);

        assert_eq!(row.mean_waiting_time, 7.5);
        assert_eq!(row.mean_walking_time, 4.0);
        assert_eq!(row.mean_veh_moving_time, 15.0);
    }

    #[test]
    fn test_two_point_trajectory_distance_in_meters() {
        let trips = vec![VehicleTrip {
            timestamp: vec![0.0, 2.0],
            trip: vec![Waypoint(127.0, 37.5), Waypoint(127.0, 37.51)],
        }];
        let waits = vec![SimEvent::new(0.0, 1.0)];
        let moves = vec![SimEvent::new(0.0, 1.0)];
        let config = SimulationConfig {
            unit: DistanceUnit::M,
            ..Default::default()
        };
        let mut eval = TrajectorySimulationEvaluator::new(&trips, &waits, &moves, config);
        let row = eval.evaluate(false);

        let expected = haversine((37.5, 127.0), (37.51, 127.0), DistanceUnit::M);
        assert!(close(row.total_veh_moving_dist, expected));
        assert!(row.total_veh_moving_dist > 1100.0 && row.total_veh_moving_dist < 1115.0);
    }

    #[test]
    fn test_rows_accumulate_and_reset() {
        let (trips, waits, moves) = fixture();
        let mut eval = TrajectorySimulationEvaluator::new(&trips, &waits, &moves, SimulationConfig::default());
        eval.evaluate(false);
        eval.set_window(TimeWindow::new(0.0, 100.0));
        eval.evaluate(false);
        eval.set_window(TimeWindow::new(500.0, 700.0));
        eval.evaluate(false);
        assert_eq!(eval.results().len(), 3);
        assert_eq!(eval.results().rows()[1].total_veh_moving_time, 15.0);
        assert_eq!(eval.results().rows()[2].total_veh_moving_time, 40.0);

        eval.evaluate(true);
        assert_eq!(eval.results().len(), 1);
        assert_eq!(eval.results().rows()[0].total_veh_moving_time, 40.0);
    }

    #[test]
    fn test_empty_sources_do_not_panic() {
        let mut eval = TrajectorySimulationEvaluator::new(&[], &[], &[], SimulationConfig::default());
        let row = eval.evaluate(false);
        assert_eq!(row.mean_waiting_time, 0.0);
        assert_eq!(row.mean_veh_moving_dist, 0.0);
    }

    #[test]
    fn test_trip_without_timestamps_is_never_counted() {
        let trips = vec![VehicleTrip {
            timestamp: vec![],
            trip: vec![Waypoint(127.0, 37.5), Waypoint(127.0, 37.6)],
        }];
        let mut eval = TrajectorySimulationEvaluator::new(&trips, &[], &[], SimulationConfig::default());
        let row = eval.evaluate(false);
        assert_eq!(row.total_veh_moving_dist, 0.0);
    }
}
