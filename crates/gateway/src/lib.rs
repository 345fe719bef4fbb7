//! Performance-model gateway.
//!
//! Trajectory generation, phase classification, thrust and fuel flow are provided by
//! external performance models. Those models speak feet, knots and feet per minute; the
//! rest of the workspace works in SI. [`Gateway`] binds one resolved model and performs
//! the conversion at every call so no other crate touches aviation units.

use std::sync::Arc;

use fuel_core::units::{m_to_ft, ms_to_fpm, ms_to_kts};
use fuel_core::{Phase, PropulsionType, RawSample};
use thiserror::Error;

pub mod reference;

/// Immutable per-run aircraft parameters resolved from the model registry.
#[derive(Debug, Clone, PartialEq)]
pub struct AircraftConfiguration {
    pub aircraft: String,
    pub engine: String,
    pub oew_kg: f64,
    pub mtow_kg: f64,
    /// Minimum and maximum cruise range (km).
    pub cruise_range_km: (f64, f64),
    pub propulsion: PropulsionType,
}

impl AircraftConfiguration {
    /// Mass at `fraction` of the way from OEW to MTOW.
    pub fn reference_mass(&self, fraction: f64) -> f64 {
        self.oew_kg + fraction * (self.mtow_kg - self.oew_kg)
    }
}

/// Errors surfaced while resolving or querying performance models.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("unknown aircraft type `{0}`")]
    UnknownAircraft(String),
    #[error("unknown engine type `{engine}` for aircraft `{aircraft}`")]
    UnknownEngine { aircraft: String, engine: String },
    #[error("invalid trajectory request: {0}")]
    InvalidRequest(String),
}

/// Synthesizes kinematic trajectories (SI output).
pub trait TrajectoryGenerator {
    /// Complete flight: takeoff, climb, cruise over `range_cr_m`, descent, landing.
    fn complete(
        &self,
        range_cr_m: f64,
        dt_s: f64,
        randomized: bool,
    ) -> Result<Vec<RawSample>, GatewayError>;

    /// Constant-altitude cruise sampled every `dt_s`, altitude given in feet.
    fn cruise(
        &self,
        dt_s: f64,
        duration_s: f64,
        alt_cr_ft: f64,
        randomized: bool,
    ) -> Result<Vec<RawSample>, GatewayError>;
}

/// Labels trajectory samples with {GND, CL, CR, DE, NA}.
pub trait PhaseClassifier {
    fn classify(&self, ts: &[f64], alt_ft: &[f64], spd_kts: &[f64], roc_fpm: &[f64])
    -> Vec<Phase>;
}

/// Installed thrust (N) for each modeled flight regime.
pub trait ThrustModel {
    fn takeoff(&self, tas_kts: f64, alt_ft: f64) -> f64;
    fn climb(&self, tas_kts: f64, alt_ft: f64, roc_fpm: f64) -> f64;
    fn cruise(&self, tas_kts: f64, alt_ft: f64) -> f64;
    fn descent_idle(&self, tas_kts: f64, alt_ft: f64) -> f64;
}

/// Total fuel flow (kg/s) of the installed engines.
pub trait FuelFlowModel {
    fn takeoff(&self, tas_kts: f64, alt_ft: f64, throttle: f64) -> f64;
    fn enroute(&self, mass_kg: f64, tas_kts: f64, alt_ft: f64) -> f64;
    fn at_thrust(&self, thrust_n: f64, alt_ft: f64) -> f64;
}

/// Everything the estimator consumes from one aircraft/engine pair.
pub trait PerformanceModel:
    TrajectoryGenerator + PhaseClassifier + ThrustModel + FuelFlowModel + Send + Sync
{
}

impl<T> PerformanceModel for T where
    T: TrajectoryGenerator + PhaseClassifier + ThrustModel + FuelFlowModel + Send + Sync
{
}

/// A model bound to an aircraft/engine pair together with its envelope.
#[derive(Clone)]
pub struct ResolvedModel {
    pub configuration: AircraftConfiguration,
    pub model: Arc<dyn PerformanceModel>,
}

/// Registry of performance models keyed by aircraft type.
pub trait ModelRegistry {
    /// Resolve `aircraft` (and optionally `engine`, otherwise the registered default).
    fn resolve(&self, aircraft: &str, engine: Option<&str>) -> Result<ResolvedModel, GatewayError>;
}

/// Fleet occupancy lookup.
pub trait FleetData: Send + Sync {
    /// Average seat count, `None` when the type is not registered yet.
    fn avg_num_seats(&self, aircraft: &str) -> Option<f64>;
}

/// SI-facing handle over one resolved performance model.
#[derive(Clone)]
pub struct Gateway {
    configuration: AircraftConfiguration,
    model: Arc<dyn PerformanceModel>,
    randomized: bool,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("configuration", &self.configuration)
            .field("randomized", &self.randomized)
            .finish_non_exhaustive()
    }
}

impl Gateway {
    /// `randomized` applies to the reserve and alternate legs only; trip trajectories
    /// take their own flag per call in [`Gateway::generate_trajectory`].
    pub fn new(resolved: ResolvedModel, randomized: bool) -> Self {
        Self {
            configuration: resolved.configuration,
            model: resolved.model,
            randomized,
        }
    }

    /// Resolve the aircraft against `registry`; unknown identifiers fail here, before any simulation.
    pub fn connect(
        registry: &dyn ModelRegistry,
        aircraft: &str,
        engine: Option<&str>,
        randomized: bool,
    ) -> Result<Self, GatewayError> {
        let resolved = registry.resolve(aircraft, engine)?;
        tracing::debug!(
            aircraft = %resolved.configuration.aircraft,
            engine = %resolved.configuration.engine,
            "performance model resolved"
        );
        Ok(Self::new(resolved, randomized))
    }

    pub fn configuration(&self) -> &AircraftConfiguration {
        &self.configuration
    }

    /// Whether reserve and alternate trajectories are randomized.
    pub fn randomized(&self) -> bool {
        self.randomized
    }

    /// Cruise-range bounds (km).
    pub fn cruise_range_bounds(&self) -> (f64, f64) {
        self.configuration.cruise_range_km
    }

    /// Complete trip over `cruise_range_m`. `randomized` overrides the gateway's own
    /// flag for this trajectory only.
    pub fn generate_trajectory(
        &self,
        cruise_range_m: f64,
        time_step_s: f64,
        randomized: bool,
    ) -> Result<Vec<RawSample>, GatewayError> {
        check_time_step(time_step_s)?;
        if !(cruise_range_m.is_finite() && cruise_range_m >= 0.0) {
            return Err(GatewayError::InvalidRequest(format!(
                "cruise range must be non-negative (got {cruise_range_m} m)"
            )));
        }
        self.model.complete(cruise_range_m, time_step_s, randomized)
    }

    /// Constant-altitude reserve cruise; one interval spanning `duration_s`.
    pub fn generate_reserve_cruise(
        &self,
        duration_s: f64,
        altitude_ft: f64,
    ) -> Result<Vec<RawSample>, GatewayError> {
        check_time_step(duration_s)?;
        TrajectoryGenerator::cruise(
            self.model.as_ref(),
            duration_s,
            duration_s,
            altitude_ft,
            self.randomized,
        )
    }

    /// Zero-range complete flight flown when diverting to the alternate.
    pub fn generate_alternate_diversion(
        &self,
        time_step_s: f64,
    ) -> Result<Vec<RawSample>, GatewayError> {
        check_time_step(time_step_s)?;
        self.model.complete(0.0, time_step_s, self.randomized)
    }

    /// Classify every sample of one trajectory.
    pub fn classify_phases(&self, samples: &[RawSample]) -> Vec<Phase> {
        let ts: Vec<f64> = samples.iter().map(|s| s.t).collect();
        let alt: Vec<f64> = samples.iter().map(|s| m_to_ft(s.h)).collect();
        let spd: Vec<f64> = samples.iter().map(|s| ms_to_kts(s.v)).collect();
        let roc: Vec<f64> = samples.iter().map(|s| ms_to_fpm(s.vs)).collect();
        self.model.classify(&ts, &alt, &spd, &roc)
    }

    pub fn thrust_takeoff(&self, v: f64, h: f64) -> f64 {
        ThrustModel::takeoff(self.model.as_ref(), ms_to_kts(v), m_to_ft(h))
    }

    pub fn thrust_climb(&self, v: f64, h: f64, vs: f64) -> f64 {
        ThrustModel::climb(self.model.as_ref(), ms_to_kts(v), m_to_ft(h), ms_to_fpm(vs))
    }

    pub fn thrust_cruise(&self, v: f64, h: f64) -> f64 {
        ThrustModel::cruise(self.model.as_ref(), ms_to_kts(v), m_to_ft(h))
    }

    pub fn thrust_descent_idle(&self, v: f64, h: f64) -> f64 {
        ThrustModel::descent_idle(self.model.as_ref(), ms_to_kts(v), m_to_ft(h))
    }

    /// Takeoff fuel flow at full throttle.
    pub fn fuel_flow_takeoff(&self, v: f64, h: f64) -> f64 {
        FuelFlowModel::takeoff(self.model.as_ref(), ms_to_kts(v), m_to_ft(h), 1.0)
    }

    pub fn fuel_flow_enroute(&self, mass_kg: f64, v: f64, h: f64) -> f64 {
        FuelFlowModel::enroute(self.model.as_ref(), mass_kg, ms_to_kts(v), m_to_ft(h))
    }

    pub fn fuel_flow_at_thrust(&self, thrust_n: f64, h: f64) -> f64 {
        FuelFlowModel::at_thrust(self.model.as_ref(), thrust_n, m_to_ft(h))
    }
}

fn check_time_step(dt: f64) -> Result<(), GatewayError> {
    if dt.is_finite() && dt > 0.0 {
        Ok(())
    } else {
        Err(GatewayError::InvalidRequest(format!(
            "time step must be positive (got {dt} s)"
        )))
    }
}

