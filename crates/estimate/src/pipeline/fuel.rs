//! Fuel integration along a phase-labeled profile.
//!
//! Samples are walked strictly in time order because cruise fuel flow depends on the
//! mass left after every earlier increment. Phases without a fuel-flow model contribute
//! nothing, so the cumulative burn never decreases and the mass never increases.

use fuel_core::Phase;
use fuel_gateway::Gateway;
use fuel_profile::{FlightProfile, FlightSample, ProfileStage};
use serde::Serialize;

use super::phase::{PhaseError, ensure_labeled, label_phases};
use super::thrust::sample_thrust;

#[derive(Debug, thiserror::Error)]
pub enum FuelError {
    #[error(transparent)]
    Phase(#[from] PhaseError),
    #[error("starting mass must be positive and finite (got {0} kg)")]
    InvalidMass(f64),
}

/// Trip totals at the last sample of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FuelSummary {
    pub flight_id: usize,
    pub distance_m: f64,
    pub fuel_kg: f64,
    pub final_mass_kg: f64,
}

impl FuelSummary {
    /// Totals of a fuel-integrated profile.
    pub fn from_profile(profile: &FlightProfile) -> Option<Self> {
        Some(Self {
            flight_id: profile.id(),
            distance_m: profile.distance_flown(),
            fuel_kg: profile.total_fuel(),
            final_mass_kg: profile.final_mass()?,
        })
    }
}

struct FuelStep {
    thrust: Option<f64>,
    fuel_flow: Option<f64>,
}

struct FuelIntegrator<'g> {
    gateway: &'g Gateway,
    t_prev: Option<f64>,
    mass: f64,
    cumulative: f64,
}

impl<'g> FuelIntegrator<'g> {
    fn new(gateway: &'g Gateway, mass: f64) -> Result<Self, FuelError> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(FuelError::InvalidMass(mass));
        }
        Ok(Self {
            gateway,
            t_prev: None,
            mass,
            cumulative: 0.0,
        })
    }

    fn step(&mut self, sample: &FlightSample) -> FuelStep {
        let phase = sample.phase.unwrap_or(Phase::Na);
        let thrust = sample_thrust(self.gateway, phase, sample);
        let fuel_flow = sample_fuel_flow(self.gateway, phase, sample, thrust, self.mass);

        let dt = self.t_prev.map_or(0.0, |t_prev| sample.t - t_prev);
        self.t_prev = Some(sample.t);
        let burn = fuel_flow.map_or(0.0, |ff| ff * dt);
        self.cumulative += burn;
        self.mass -= burn;

        FuelStep { thrust, fuel_flow }
    }
}

/// Fuel flow (kg/s) for one sample; `mass` is the mass left before this sample.
fn sample_fuel_flow(
    gateway: &Gateway,
    phase: Phase,
    sample: &FlightSample,
    thrust: Option<f64>,
    mass: f64,
) -> Option<f64> {
    let fuel_flow = match phase {
        Phase::To => Some(gateway.fuel_flow_takeoff(sample.v, sample.h)),
        Phase::Cr => Some(gateway.fuel_flow_enroute(mass, sample.v, sample.h)),
        Phase::Cl | Phase::De => thrust.map(|thr| gateway.fuel_flow_at_thrust(thr, sample.h)),
        Phase::Gnd | Phase::Na => None,
    };
    fuel_flow.filter(|ff| ff.is_finite()).map(|ff| ff.max(0.0))
}

/// Integrate thrust, fuel flow, cumulative fuel and mass for every sample.
///
/// `mass` is the takeoff weight for a trip and the landing mass for reserve and
/// alternate profiles. A raw profile is labeled first; a labeled one is never relabeled.
pub fn compute_fuel(
    gateway: &Gateway,
    profile: FlightProfile,
    mass: f64,
) -> Result<FlightProfile, FuelError> {
    let mut profile = label_phases(gateway, profile)?;
    let mut integrator = FuelIntegrator::new(gateway, mass)?;
    for sample in profile.samples_mut() {
        let step = integrator.step(sample);
        sample.thrust = step.thrust;
        sample.fuel_flow = step.fuel_flow;
        sample.fuel_consumed = integrator.cumulative;
        sample.mass = Some(integrator.mass);
    }
    profile.mark_stage(ProfileStage::FuelIntegrated);
    Ok(profile)
}

/// Same integration as [`compute_fuel`] keeping only the totals.
pub fn compute_fuel_last_point(
    gateway: &Gateway,
    profile: &FlightProfile,
    mass: f64,
) -> Result<FuelSummary, FuelError> {
    let profile = ensure_labeled(gateway, profile)?;
    let mut integrator = FuelIntegrator::new(gateway, mass)?;
    for sample in profile.samples() {
        integrator.step(sample);
    }
    Ok(FuelSummary {
        flight_id: profile.id(),
        distance_m: profile.distance_flown(),
        fuel_kg: integrator.cumulative,
        final_mass_kg: integrator.mass,
    })
}
