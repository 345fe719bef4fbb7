//! Phase labeling: attach a flight phase to every sample and split takeoff from ground.

use std::borrow::Cow;

use fuel_core::Phase;
use fuel_gateway::Gateway;
use fuel_profile::{FlightProfile, ProfileError, ProfileKind};

#[derive(Debug, thiserror::Error)]
pub enum PhaseError {
    #[error("flight {flight_id}: no climb phase found, trajectory is degenerate")]
    DegenerateTrajectory { flight_id: usize },
    #[error(transparent)]
    Profile(#[from] ProfileError),
}

/// Label a raw profile. Profiles already labeled are returned untouched.
///
/// The external classifier cannot tell the takeoff roll from ground idle after landing,
/// so every GND sample before the first CL sample is relabeled TO. A profile without any
/// climb sample is rejected: trip fuel integration needs a takeoff segment. Reserve-cruise
/// profiles are a single level hold and are labeled CR throughout.
pub fn label_phases(gateway: &Gateway, profile: FlightProfile) -> Result<FlightProfile, PhaseError> {
    if profile.is_phase_labeled() {
        return Ok(profile);
    }
    if profile.kind() == ProfileKind::ReserveCruise {
        return Ok(profile.with_uniform_phase(Phase::Cr));
    }

    let raw: Vec<_> = profile.samples().iter().map(|s| s.kinematics()).collect();
    let mut phases = gateway.classify_phases(&raw);
    if !mark_takeoff(&mut phases) {
        return Err(PhaseError::DegenerateTrajectory {
            flight_id: profile.id(),
        });
    }
    Ok(profile.with_phases(phases)?)
}

/// Borrow `profile` when it is already labeled, otherwise label a copy.
pub fn ensure_labeled<'p>(
    gateway: &Gateway,
    profile: &'p FlightProfile,
) -> Result<Cow<'p, FlightProfile>, PhaseError> {
    if profile.is_phase_labeled() {
        Ok(Cow::Borrowed(profile))
    } else {
        label_phases(gateway, profile.clone()).map(Cow::Owned)
    }
}

/// Relabel GND samples preceding the first climb sample as TO.
///
/// Returns `false`, leaving `phases` untouched, when there is no climb sample.
pub fn mark_takeoff(phases: &mut [Phase]) -> bool {
    let Some(first_climb) = phases.iter().position(|p| *p == Phase::Cl) else {
        return false;
    };
    for phase in &mut phases[..first_climb] {
        if *phase == Phase::Gnd {
            *phase = Phase::To;
        }
    }
    true
}
