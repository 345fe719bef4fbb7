//! Thrust estimation per sample.

use fuel_core::Phase;
use fuel_gateway::Gateway;
use fuel_profile::{FlightProfile, FlightSample, ProfileStage};

use super::phase::{PhaseError, label_phases};

/// Thrust (N) for one sample, `None` for phases without a thrust model.
pub(crate) fn sample_thrust(gateway: &Gateway, phase: Phase, sample: &FlightSample) -> Option<f64> {
    let thrust = match phase {
        Phase::To => gateway.thrust_takeoff(sample.v, sample.h),
        Phase::Cl => gateway.thrust_climb(sample.v, sample.h, sample.vs),
        Phase::Cr => gateway.thrust_cruise(sample.v, sample.h),
        Phase::De => gateway.thrust_descent_idle(sample.v, sample.h),
        Phase::Gnd | Phase::Na => return None,
    };
    thrust.is_finite().then_some(thrust)
}

/// Fill the thrust column of a profile, labeling it first when needed.
pub fn estimate_thrust(
    gateway: &Gateway,
    profile: FlightProfile,
) -> Result<FlightProfile, PhaseError> {
    let mut profile = label_phases(gateway, profile)?;
    for sample in profile.samples_mut() {
        let phase = sample.phase.unwrap_or(Phase::Na);
        sample.thrust = sample_thrust(gateway, phase, sample);
    }
    profile.mark_stage(ProfileStage::ThrustComputed);
    Ok(profile)
}
