//! Cruise-range sweeps: evaluate every profile of a batch, skipping and reporting failures.

use std::sync::atomic::{AtomicBool, Ordering};

use fuel_profile::FlightProfileBatch;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{error, info, warn};

use super::{EstimateError, FlightEstimate, FuelEstimator};

/// Output row of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepRow {
    pub flight_id: usize,
    pub cruise_range_km: Option<f64>,
    pub distance_m: f64,
    pub fuel_kg: f64,
    pub final_mass_kg: f64,
    pub takeoff_mass_kg: f64,
    pub iterations: usize,
}

impl From<&FlightEstimate> for SweepRow {
    fn from(estimate: &FlightEstimate) -> Self {
        Self {
            flight_id: estimate.summary.flight_id,
            cruise_range_km: estimate.cruise_range_km,
            distance_m: estimate.summary.distance_m,
            fuel_kg: estimate.summary.fuel_kg,
            final_mass_kg: estimate.summary.final_mass_kg,
            takeoff_mass_kg: estimate.takeoff_mass_kg,
            iterations: estimate.iterations,
        }
    }
}

/// A flight left out of the sweep and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedProfile {
    pub flight_id: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    /// Ordered by flight id.
    pub estimates: Vec<FlightEstimate>,
    pub skipped: Vec<SkippedProfile>,
    pub cancelled: bool,
}

impl SweepReport {
    pub fn rows(&self) -> Vec<SweepRow> {
        self.estimates.iter().map(SweepRow::from).collect()
    }

    fn finish(mut self) -> Self {
        self.estimates.sort_by_key(FlightEstimate::flight_id);
        self.skipped.sort_by_key(|skip| skip.flight_id);
        info!(
            estimated = self.estimates.len(),
            skipped = self.skipped.len(),
            cancelled = self.cancelled,
            "sweep finished"
        );
        self
    }
}

enum Outcome {
    Estimated(FlightEstimate),
    Skipped(SkippedProfile),
    Aborted(usize, EstimateError),
}

/// `position` stands in for the flight id when the profile itself failed to generate.
fn evaluate_item(
    estimator: &FuelEstimator,
    position: usize,
    item: Result<fuel_profile::FlightProfile, EstimateError>,
) -> Outcome {
    let flight_id = item.as_ref().map_or(position, |profile| profile.id());
    match item.and_then(|profile| estimator.evaluate(profile)) {
        Ok(estimate) => Outcome::Estimated(estimate),
        Err(err) if err.is_configuration() => {
            error!(flight = flight_id, error = %err, "configuration error, aborting sweep");
            Outcome::Aborted(position, err)
        }
        Err(err) => {
            warn!(flight = flight_id, error = %err, "skipping flight");
            Outcome::Skipped(SkippedProfile {
                flight_id,
                reason: err.to_string(),
            })
        }
    }
}

fn collect(
    outcomes: impl IntoIterator<Item = Outcome>,
    cancelled: bool,
) -> Result<SweepReport, EstimateError> {
    let mut report = SweepReport {
        cancelled,
        ..SweepReport::default()
    };
    let mut aborted: Option<(usize, EstimateError)> = None;
    for outcome in outcomes {
        match outcome {
            Outcome::Estimated(estimate) => report.estimates.push(estimate),
            Outcome::Skipped(skip) => report.skipped.push(skip),
            Outcome::Aborted(position, err) => {
                if aborted.as_ref().is_none_or(|(first, _)| position < *first) {
                    aborted = Some((position, err));
                }
            }
        }
    }
    match aborted {
        Some((_, err)) => Err(err),
        None => Ok(report.finish()),
    }
}

/// Evaluate profiles one after another. `should_cancel` is polled before each profile.
///
/// Per-flight failures are skipped and reported; a configuration error aborts the sweep.
pub fn sweep<F>(
    estimator: &FuelEstimator,
    batch: FlightProfileBatch<EstimateError>,
    should_cancel: F,
) -> Result<SweepReport, EstimateError>
where
    F: Fn() -> bool,
{
    info!(profiles = batch.declared_len(), "starting sweep");
    let mut outcomes = Vec::with_capacity(batch.declared_len());
    let mut cancelled = false;
    for (position, item) in batch.enumerate() {
        if should_cancel() {
            cancelled = true;
            break;
        }
        let outcome = evaluate_item(estimator, position, item);
        let abort = matches!(outcome, Outcome::Aborted(..));
        outcomes.push(outcome);
        if abort {
            break;
        }
    }
    collect(outcomes, cancelled)
}

/// Evaluate profiles on the rayon pool, pulling them from the batch as workers free up.
///
/// Once `should_cancel` returns true, or a configuration error is hit, no further profile
/// is started; profiles already running finish.
pub fn sweep_parallel<F>(
    estimator: &FuelEstimator,
    batch: FlightProfileBatch<EstimateError>,
    should_cancel: F,
) -> Result<SweepReport, EstimateError>
where
    F: Fn() -> bool + Sync,
{
    info!(profiles = batch.declared_len(), "starting parallel sweep");
    let cancelled = AtomicBool::new(false);
    let aborted = AtomicBool::new(false);
    let outcomes: Vec<Outcome> = batch
        .enumerate()
        .par_bridge()
        .filter_map(|(position, item)| {
            if aborted.load(Ordering::Relaxed) {
                return None;
            }
            if cancelled.load(Ordering::Relaxed) || should_cancel() {
                cancelled.store(true, Ordering::Relaxed);
                return None;
            }
            let outcome = evaluate_item(estimator, position, item);
            if matches!(outcome, Outcome::Aborted(..)) {
                aborted.store(true, Ordering::Relaxed);
            }
            Some(outcome)
        })
        .collect();
    collect(outcomes, cancelled.into_inner())
}
