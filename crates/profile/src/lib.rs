//! Flight profiles: typed trajectory samples, explicit pipeline stages, and lazy batches.

use fuel_core::{Phase, RawSample};
use serde::Serialize;
use thiserror::Error;

pub mod batch;

pub use batch::{FlightProfileBatch, ProfileSource};

/// One trajectory point, augmented stage by stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightSample {
    pub t: f64,
    pub h: f64,
    pub s: f64,
    pub v: f64,
    pub vs: f64,
    /// Unset until the profile is phase-labeled.
    pub phase: Option<Phase>,
    /// `None` where no thrust model applies.
    pub thrust: Option<f64>,
    /// `None` where no fuel-flow model applies.
    pub fuel_flow: Option<f64>,
    /// Cumulative fuel burned since the first sample (kg).
    pub fuel_consumed: f64,
    /// Instantaneous aircraft mass (kg), set by the fuel integrator.
    pub mass: Option<f64>,
}

impl FlightSample {
    /// Kinematic part of the sample.
    pub fn kinematics(&self) -> RawSample {
        RawSample {
            t: self.t,
            h: self.h,
            s: self.s,
            v: self.v,
            vs: self.vs,
        }
    }
}

impl From<RawSample> for FlightSample {
    fn from(raw: RawSample) -> Self {
        Self {
            t: raw.t,
            h: raw.h,
            s: raw.s,
            v: raw.v,
            vs: raw.vs,
            phase: None,
            thrust: None,
            fuel_flow: None,
            fuel_consumed: 0.0,
            mass: None,
        }
    }
}

/// Pipeline stage a profile has reached. Stages are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ProfileStage {
    Raw,
    PhaseLabeled,
    ThrustComputed,
    FuelIntegrated,
}

/// What the flight represents in the fuel plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProfileKind {
    Trip,
    ReserveCruise,
    Alternate,
}

#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    #[error("flight {id} has no samples")]
    Empty { id: usize },
    #[error("flight {id}: timestamps not strictly increasing at sample {index}")]
    NonMonotonicTime { id: usize, index: usize },
    #[error("flight {id}: {found} phase labels for {expected} samples")]
    PhaseCountMismatch {
        id: usize,
        expected: usize,
        found: usize,
    },
}

/// Ordered samples of one synthetic flight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightProfile {
    id: usize,
    kind: ProfileKind,
    stage: ProfileStage,
    cruise_range_km: Option<f64>,
    samples: Vec<FlightSample>,
}

impl FlightProfile {
    /// Wrap a generator trajectory; timestamps must be strictly increasing.
    pub fn from_raw(
        id: usize,
        kind: ProfileKind,
        raw: impl IntoIterator<Item = RawSample>,
    ) -> Result<Self, ProfileError> {
        let samples: Vec<FlightSample> = raw.into_iter().map(FlightSample::from).collect();
        if samples.is_empty() {
            return Err(ProfileError::Empty { id });
        }
        if let Some(index) = samples
            .windows(2)
            .position(|pair| !(pair[1].t > pair[0].t))
        {
            return Err(ProfileError::NonMonotonicTime { id, index: index + 1 });
        }
        Ok(Self {
            id,
            kind,
            stage: ProfileStage::Raw,
            cruise_range_km: None,
            samples,
        })
    }

    pub fn with_cruise_range_km(mut self, range_km: f64) -> Self {
        self.cruise_range_km = Some(range_km);
        self
    }

    /// Attach one phase label per sample and mark the profile as labeled.
    pub fn with_phases(mut self, phases: Vec<Phase>) -> Result<Self, ProfileError> {
        if phases.len() != self.samples.len() {
            return Err(ProfileError::PhaseCountMismatch {
                id: self.id,
                expected: self.samples.len(),
                found: phases.len(),
            });
        }
        for (sample, phase) in self.samples.iter_mut().zip(phases) {
            sample.phase = Some(phase);
        }
        self.stage = self.stage.max(ProfileStage::PhaseLabeled);
        Ok(self)
    }

    /// Label every sample with the same phase.
    pub fn with_uniform_phase(mut self, phase: Phase) -> Self {
        for sample in &mut self.samples {
            sample.phase = Some(phase);
        }
        self.stage = self.stage.max(ProfileStage::PhaseLabeled);
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    pub fn stage(&self) -> ProfileStage {
        self.stage
    }

    pub fn cruise_range_km(&self) -> Option<f64> {
        self.cruise_range_km
    }

    pub fn is_phase_labeled(&self) -> bool {
        self.stage >= ProfileStage::PhaseLabeled
    }

    pub fn samples(&self) -> &[FlightSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Phase column, `None` for unlabeled samples.
    pub fn phases(&self) -> Vec<Option<Phase>> {
        self.samples.iter().map(|s| s.phase).collect()
    }

    /// Mutable access for a pipeline stage; the caller records the stage it completed.
    pub fn samples_mut(&mut self) -> &mut [FlightSample] {
        &mut self.samples
    }

    /// Record that a pipeline stage has run. Stages never move backwards.
    pub fn mark_stage(&mut self, stage: ProfileStage) {
        self.stage = self.stage.max(stage);
    }

    /// Horizontal distance at the last sample (m).
    pub fn distance_flown(&self) -> f64 {
        self.samples.last().map(|s| s.s).unwrap_or_default()
    }

    /// Elapsed time between first and last samples (s).
    pub fn duration(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.t - first.t,
            _ => 0.0,
        }
    }

    /// Cumulative fuel at the last sample (kg).
    pub fn total_fuel(&self) -> f64 {
        self.samples
            .last()
            .map(|s| s.fuel_consumed)
            .unwrap_or_default()
    }

    /// Mass at the last sample carrying one.
    pub fn final_mass(&self) -> Option<f64> {
        self.samples.iter().rev().find_map(|s| s.mass)
    }
}
