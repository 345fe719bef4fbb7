//! Takeoff-mass estimation.
//!
//! The takeoff weight and the fuel carried depend on each other: trip fuel is burned
//! starting from the takeoff weight, and the takeoff weight is OEW plus payload plus all
//! fuel on board. The solver iterates that relation from a fraction of the structural
//! margin until the trial weight stops moving.

use fuel_gateway::{FleetData, Gateway};
use fuel_profile::FlightProfile;
use serde::Serialize;
use tracing::{debug, warn};

use super::fuel::{FuelError, compute_fuel_last_point};
use super::generator::{GeneratorError, ProfileGenerator};
use super::phase::{PhaseError, ensure_labeled, label_phases};

/// Fuel-plan policy and loop bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct MassSolverConfig {
    /// Initial trial weight as a fraction of the way from OEW to MTOW.
    pub reference_fraction: f64,
    pub contingency_fraction: f64,
    pub load_factor: f64,
    pub passenger_mass_kg: f64,
    pub tolerance_kg: f64,
    pub max_iterations: usize,
    pub reserve_altitude_ft: f64,
    pub alternate_time_step_s: f64,
}

impl Default for MassSolverConfig {
    fn default() -> Self {
        Self {
            reference_fraction: 0.7,
            contingency_fraction: 0.05,
            load_factor: 0.819,
            passenger_mass_kg: 100.0,
            tolerance_kg: 10.0,
            max_iterations: 50,
            reserve_altitude_ft: 1500.0,
            alternate_time_step_s: 30.0,
        }
    }
}

/// Fuel breakdown of one solver iteration (kg).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MassConvergenceRecord {
    pub f_trip: f64,
    pub f_cont: f64,
    pub f_res: f64,
    pub f_alt: f64,
    pub m_fuel: f64,
    pub tow: f64,
    pub new_tow: f64,
}

/// Converged takeoff weight.
#[derive(Debug, Clone, PartialEq)]
pub struct TowSolution {
    pub tow: f64,
    pub iterations: usize,
    pub trace: Vec<MassConvergenceRecord>,
}

#[derive(Debug, thiserror::Error)]
pub enum MassError {
    #[error("no average seat count registered for aircraft `{aircraft}`")]
    MissingSeatCount { aircraft: String },
    #[error("takeoff mass did not converge after {iterations} iterations (last trial {last_tow:.1} kg)")]
    NotConverged { last_tow: f64, iterations: usize },
    #[error("iteration {iteration} produced a non-finite mass")]
    NonFiniteMass { iteration: usize },
    #[error("reserve or alternate leg: {0}")]
    Generator(#[from] GeneratorError),
    #[error(transparent)]
    Phase(#[from] PhaseError),
    #[error(transparent)]
    Fuel(#[from] FuelError),
}

/// Payload carried at the fleet load factor (kg).
pub fn payload_mass(avg_seats: f64, config: &MassSolverConfig) -> f64 {
    config.load_factor * avg_seats * config.passenger_mass_kg
}

/// Fixed-point solver bound to one aircraft configuration.
///
/// Reserve and alternate legs do not depend on the trip, so they are generated once
/// here and reused for every trip solved.
#[derive(Debug, Clone)]
pub struct TakeoffMassSolver {
    gateway: Gateway,
    config: MassSolverConfig,
    payload_mass_kg: f64,
    reserve: FlightProfile,
    alternate: FlightProfile,
}

impl TakeoffMassSolver {
    pub fn new(
        gateway: Gateway,
        fleet: &dyn FleetData,
        config: MassSolverConfig,
    ) -> Result<Self, MassError> {
        let aircraft = gateway.configuration().aircraft.clone();
        let avg_seats = fleet
            .avg_num_seats(&aircraft)
            .filter(|seats| seats.is_finite() && *seats > 0.0)
            .ok_or(MassError::MissingSeatCount { aircraft })?;

        let generator = ProfileGenerator::new(gateway.clone());
        let reserve = generator.reserve_cruise(config.reserve_altitude_ft)?;
        let alternate = label_phases(
            &gateway,
            generator.alternate_diversion(config.alternate_time_step_s)?,
        )?;

        Ok(Self {
            payload_mass_kg: payload_mass(avg_seats, &config),
            gateway,
            config,
            reserve,
            alternate,
        })
    }

    pub fn config(&self) -> &MassSolverConfig {
        &self.config
    }

    pub fn payload_mass_kg(&self) -> f64 {
        self.payload_mass_kg
    }

    /// Initial trial weight.
    pub fn reference_mass(&self) -> f64 {
        self.gateway
            .configuration()
            .reference_mass(self.config.reference_fraction)
    }

    pub fn reserve_profile(&self) -> &FlightProfile {
        &self.reserve
    }

    pub fn alternate_profile(&self) -> &FlightProfile {
        &self.alternate
    }

    /// Solve the takeoff weight for one trip.
    pub fn solve(&self, trip: &FlightProfile) -> Result<TowSolution, MassError> {
        let configuration = self.gateway.configuration();
        let oew = configuration.oew_kg;
        let mtow = configuration.mtow_kg;
        let trip = ensure_labeled(&self.gateway, trip)?;

        let mut tow = self.reference_mass();
        let mut trace = Vec::new();

        for iteration in 1..=self.config.max_iterations {
            if !tow.is_finite() {
                return Err(MassError::NonFiniteMass { iteration });
            }
            let f_trip = compute_fuel_last_point(&self.gateway, &trip, tow)?.fuel_kg;
            let f_cont = self.config.contingency_fraction * f_trip;
            let landing_mass = tow - f_trip;
            if !landing_mass.is_finite() {
                return Err(MassError::NonFiniteMass { iteration });
            }
            let f_res = compute_fuel_last_point(&self.gateway, &self.reserve, landing_mass)?.fuel_kg;
            let f_alt =
                compute_fuel_last_point(&self.gateway, &self.alternate, landing_mass)?.fuel_kg;

            let m_fuel = f_trip + f_cont + f_res + f_alt;
            let new_tow = oew + self.payload_mass_kg + m_fuel;
            if !new_tow.is_finite() {
                return Err(MassError::NonFiniteMass { iteration });
            }

            trace.push(MassConvergenceRecord {
                f_trip,
                f_cont,
                f_res,
                f_alt,
                m_fuel,
                tow,
                new_tow,
            });
            debug!(
                flight = trip.id(),
                iteration,
                tow,
                new_tow,
                f_trip,
                m_fuel,
                "takeoff mass iteration"
            );

            let converged = (tow - new_tow).abs() < self.config.tolerance_kg;
            tow = new_tow;
            if converged {
                if tow > mtow {
                    warn!(flight = trip.id(), tow, mtow, "takeoff mass exceeds MTOW");
                }
                return Ok(TowSolution {
                    tow,
                    iterations: iteration,
                    trace,
                });
            }
        }

        Err(MassError::NotConverged {
            last_tow: tow,
            iterations: self.config.max_iterations,
        })
    }
}
