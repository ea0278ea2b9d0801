//! Summary evaluation of observed and simulated trips.
//!
//! [`observed::ObservedTripEvaluator`] compares a recorded trip table with
//! routed alternatives; [`simulation::TrajectorySimulationEvaluator`] sums
//! windowed simulation output. Both append one row per evaluation to a
//! [`ResultAccumulator`](crate::output::ResultAccumulator).

pub mod aggregate;
pub mod dispatch;
pub mod observed;
pub mod simulation;
pub mod types;
pub mod utility;
