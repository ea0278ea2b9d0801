//! Observed trips compared against taxi routing and public transport.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{EvalError, Result};
use crate::evaluators::aggregate::{
    EvalOptions, ModeTotals, baseline_totals, taxi_totals, transit_totals,
};
use crate::evaluators::dispatch::dispatch_ordered;
use crate::evaluators::types::{ModeReport, ModeSummary, SkippedTrip};
use crate::output::ResultAccumulator;
use crate::parser::{ColumnMapping, OptionalColumns, TimezonePolicy, TripTable, load_trips_from_path};
use crate::services::routing_api::{TaxiRouter, TransitRouter};
use crate::trips::TripRecord;

pub const BASELINE_MODE: &str = "raw";
pub const TRANSIT_MODE: &str = "public_transport";

/// Holds an observed trip table and one summary row per evaluated mode.
pub struct ObservedTripEvaluator {
    trips: Vec<TripRecord>,
    columns: OptionalColumns,
    mapping: ColumnMapping,
    results: ResultAccumulator<ModeSummary>,
}

impl ObservedTripEvaluator {
    /// `mapping` is kept to name columns in later errors. Optional columns
    /// count as present when any trip carries a value.
    pub fn new(trips: Vec<TripRecord>, mapping: ColumnMapping) -> Result<Self> {
        let columns = OptionalColumns::observed(&trips);
        Self::from_table(TripTable { trips, columns }, mapping)
    }

    pub fn from_table(table: TripTable, mapping: ColumnMapping) -> Result<Self> {
        if table.trips.is_empty() {
            return Err(EvalError::EmptyTable);
        }
        Ok(Self {
            trips: table.trips,
            columns: table.columns,
            mapping,
            results: ResultAccumulator::new(),
        })
    }

    pub fn from_csv(
        path: impl AsRef<Path>,
        mapping: ColumnMapping,
        policy: TimezonePolicy,
    ) -> Result<Self> {
        let table = load_trips_from_path(path, &mapping, policy)?;
        Self::from_table(table, mapping)
    }

    pub fn trips(&self) -> &[TripRecord] {
        &self.trips
    }

    /// Summarizes the trips as recorded: waiting and in-vehicle minutes from
    /// the timestamps, straight-line kilometres and the fare paid.
    ///
    /// # Errors
    ///
    /// [`EvalError::MissingColumn`] when the table had no distance or fare
    /// column. Blank cells in those columns only drop the trip from that
    /// column's sum and mean.
    #[tracing::instrument(skip(self), fields(trips = self.trips.len()))]
    pub fn evaluate_baseline(&mut self) -> Result<&ModeSummary> {
        let totals = baseline_totals(&self.trips, self.columns).map_err(|canonical| EvalError::MissingColumn {
            canonical: canonical.to_string(),
            column: self.mapping.column_for(canonical).to_string(),
        })?;
        Ok(self.append(totals, BASELINE_MODE))
    }

    /// Queries `router` once per trip and appends a `taxi-<name>` row.
    ///
    /// Trips the provider could not route are left out of the row and listed
    /// in the returned report.
    #[tracing::instrument(skip(self, router, options), fields(provider = router.name(), trips = self.trips.len()))]
    pub async fn evaluate_taxi_mode(
        &mut self,
        router: Arc<dyn TaxiRouter>,
        options: &EvalOptions,
    ) -> Result<ModeReport> {
        let mode = format!("taxi-{}", router.name());

        let outcomes = dispatch_ordered(&self.trips, options.concurrency, |trip| {
            let router = Arc::clone(&router);
            async move { router.route(&trip).await }
        })
        .await;

        let (totals, skipped) = taxi_totals(&self.trips, outcomes, options);
        Ok(self.finish(totals, mode, skipped))
    }

    /// Queries `router` for transit directions per trip and appends a
    /// `public_transport` row.
    #[tracing::instrument(skip(self, router, options), fields(provider = router.name(), trips = self.trips.len()))]
    pub async fn evaluate_public_transit_mode(
        &mut self,
        router: Arc<dyn TransitRouter>,
        options: &EvalOptions,
    ) -> Result<ModeReport> {
        let outcomes = dispatch_ordered(&self.trips, options.concurrency, |trip| {
            let router = Arc::clone(&router);
            async move { router.directions(&trip).await }
        })
        .await;

        let (totals, skipped) = transit_totals(outcomes, options);
        Ok(self.finish(totals, TRANSIT_MODE.to_string(), skipped))
    }

    fn finish(&mut self, totals: ModeTotals, mode: String, skipped: Vec<SkippedTrip>) -> ModeReport {
        for skip in &skipped {
            warn!(mode = %mode, index = skip.index, reason = %skip.reason, "Trip skipped");
        }
        if totals.count == 0 {
            warn!(mode = %mode, "No trip could be routed; row holds zeros");
        }
        self.append(totals, &mode);

        ModeReport {
            mode,
            queried: self.trips.len(),
            skipped,
        }
    }

    fn append(&mut self, totals: ModeTotals, mode: &str) -> &ModeSummary {
        let row = totals.summarize(mode);
        info!(
            mode,
            trips = totals.count,
            total_veh_moving_time = row.total_veh_moving_time,
            total_veh_moving_dist = row.total_veh_moving_dist,
            "Mode summary appended"
        );
        self.results.push(row)
    }

    pub fn results(&self) -> &ResultAccumulator<ModeSummary> {
        &self.results
    }

    /// Writes all rows to `<dir>/<construction time>-result.csv`.
    pub fn export(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        self.results.export(dir)
    }
}
