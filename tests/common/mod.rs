//! Deterministic performance model shared by the integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use fuel_estimator::estimate::{FuelEstimator, MassSolverConfig};
use fuel_estimator::gateway::{
    AircraftConfiguration, FleetData, FuelFlowModel, Gateway, GatewayError, ModelRegistry,
    PhaseClassifier, ResolvedModel, ThrustModel, TrajectoryGenerator,
};
use fuel_estimator::config::RunConfig;
use fuel_estimator::profile::{FlightProfile, ProfileKind};
use fuel_estimator::types::{Phase, PropulsionType, RawSample};

pub const CRUISE_SPEED_M_S: f64 = 200.0;
pub const CLIMB_RATE_M_S: f64 = 10.0;
pub const DESCENT_RATE_M_S: f64 = 5.0;

/// Climb, level cruise, descent; fuel flow either constant or proportional to mass.
#[derive(Debug)]
pub struct StubModel {
    pub climb_s: f64,
    pub descent_s: f64,
    pub fuel_flow_kg_s: f64,
    /// Extra cruise fuel flow per kg of aircraft mass.
    pub cruise_flow_per_kg: f64,
    pub thrust_n: f64,
    /// Cruise range (m) for which the generator returns a trajectory that never leaves the ground.
    pub grounded_range_m: Option<f64>,
    pub generated: AtomicUsize,
}

impl Default for StubModel {
    fn default() -> Self {
        Self {
            climb_s: 600.0,
            descent_s: 400.0,
            fuel_flow_kg_s: 1.0,
            cruise_flow_per_kg: 0.0,
            thrust_n: 50_000.0,
            grounded_range_m: None,
            generated: AtomicUsize::new(0),
        }
    }
}

impl StubModel {
    pub fn mass_dependent(flow_per_kg: f64) -> Self {
        Self {
            fuel_flow_kg_s: 0.5,
            cruise_flow_per_kg: flow_per_kg,
            ..Self::default()
        }
    }

    pub fn generated(&self) -> usize {
        self.generated.load(Ordering::SeqCst)
    }

    fn state_at(&self, t: f64, cruise_s: f64) -> RawSample {
        let top_of_climb = CLIMB_RATE_M_S * self.climb_s;
        let s = CRUISE_SPEED_M_S * t;
        if t == 0.0 {
            RawSample { t, h: 0.0, s, v: 0.0, vs: 0.0 }
        } else if t <= self.climb_s {
            RawSample { t, h: CLIMB_RATE_M_S * t, s, v: CRUISE_SPEED_M_S, vs: CLIMB_RATE_M_S }
        } else if t <= self.climb_s + cruise_s {
            RawSample { t, h: top_of_climb, s, v: CRUISE_SPEED_M_S, vs: 0.0 }
        } else {
            let tau = t - self.climb_s - cruise_s;
            RawSample {
                t,
                h: top_of_climb - DESCENT_RATE_M_S * tau,
                s,
                v: CRUISE_SPEED_M_S,
                vs: -DESCENT_RATE_M_S,
            }
        }
    }
}

/// `0, dt, 2dt, ...` closed by `total`.
pub fn sample_times(total: f64, dt: f64) -> Vec<f64> {
    let steps = (total / dt).ceil() as usize;
    (0..=steps).map(|k| (k as f64 * dt).min(total)).collect()
}

impl TrajectoryGenerator for StubModel {
    fn complete(
        &self,
        range_cr_m: f64,
        dt_s: f64,
        _randomized: bool,
    ) -> Result<Vec<RawSample>, GatewayError> {
        self.generated.fetch_add(1, Ordering::SeqCst);
        let cruise_s = range_cr_m / CRUISE_SPEED_M_S;
        let total = self.climb_s + cruise_s + self.descent_s;
        let times = sample_times(total, dt_s);
        if self.grounded_range_m == Some(range_cr_m) {
            return Ok(times
                .into_iter()
                .map(|t| RawSample { t, h: 0.0, s: 0.0, v: 0.0, vs: 0.0 })
                .collect());
        }
        Ok(times.into_iter().map(|t| self.state_at(t, cruise_s)).collect())
    }

    fn cruise(
        &self,
        dt_s: f64,
        duration_s: f64,
        alt_cr_ft: f64,
        _randomized: bool,
    ) -> Result<Vec<RawSample>, GatewayError> {
        let h = alt_cr_ft * 0.3048;
        Ok(sample_times(duration_s, dt_s)
            .into_iter()
            .map(|t| RawSample { t, h, s: 100.0 * t, v: 100.0, vs: 0.0 })
            .collect())
    }
}

impl PhaseClassifier for StubModel {
    fn classify(&self, _ts: &[f64], alt_ft: &[f64], _spd_kts: &[f64], roc_fpm: &[f64]) -> Vec<Phase> {
        alt_ft
            .iter()
            .zip(roc_fpm)
            .map(|(&alt, &roc)| {
                if roc > 100.0 {
                    Phase::Cl
                } else if roc < -100.0 {
                    Phase::De
                } else if alt < 50.0 {
                    Phase::Gnd
                } else {
                    Phase::Cr
                }
            })
            .collect()
    }
}

impl ThrustModel for StubModel {
    fn takeoff(&self, _tas_kts: f64, _alt_ft: f64) -> f64 {
        self.thrust_n
    }

    fn climb(&self, _tas_kts: f64, _alt_ft: f64, _roc_fpm: f64) -> f64 {
        self.thrust_n
    }

    fn cruise(&self, _tas_kts: f64, _alt_ft: f64) -> f64 {
        self.thrust_n
    }

    fn descent_idle(&self, _tas_kts: f64, _alt_ft: f64) -> f64 {
        0.1 * self.thrust_n
    }
}

impl FuelFlowModel for StubModel {
    fn takeoff(&self, _tas_kts: f64, _alt_ft: f64, _throttle: f64) -> f64 {
        self.fuel_flow_kg_s
    }

    fn enroute(&self, mass_kg: f64, _tas_kts: f64, _alt_ft: f64) -> f64 {
        self.fuel_flow_kg_s + self.cruise_flow_per_kg * mass_kg
    }

    fn at_thrust(&self, _thrust_n: f64, _alt_ft: f64) -> f64 {
        self.fuel_flow_kg_s
    }
}

pub fn configuration(oew_kg: f64, mtow_kg: f64, propulsion: PropulsionType) -> AircraftConfiguration {
    AircraftConfiguration {
        aircraft: "STUB".into(),
        engine: "STUB-1".into(),
        oew_kg,
        mtow_kg,
        cruise_range_km: (500.0, 1000.0),
        propulsion,
    }
}

/// Registry serving one stub aircraft, with optional fleet seats.
pub struct StubRegistry {
    pub configuration: AircraftConfiguration,
    pub model: Arc<StubModel>,
    pub seats: Option<f64>,
}

impl StubRegistry {
    pub fn new(model: StubModel, seats: Option<f64>) -> Self {
        Self {
            configuration: configuration(42_000.0, 79_000.0, PropulsionType::Turbofan),
            model: Arc::new(model),
            seats,
        }
    }

    pub fn gateway(&self) -> Gateway {
        Gateway::new(self.resolved(), false)
    }

    fn resolved(&self) -> ResolvedModel {
        ResolvedModel {
            configuration: self.configuration.clone(),
            model: self.model.clone(),
        }
    }

    pub fn estimator(&self, run: RunConfig) -> FuelEstimator {
        FuelEstimator::new(self, self, run).expect("stub estimator")
    }

    pub fn estimator_with(&self, run: RunConfig, solver: MassSolverConfig) -> FuelEstimator {
        FuelEstimator::with_solver_config(self, self, run, solver).expect("stub estimator")
    }
}

impl ModelRegistry for StubRegistry {
    fn resolve(&self, aircraft: &str, engine: Option<&str>) -> Result<ResolvedModel, GatewayError> {
        if !aircraft.eq_ignore_ascii_case(&self.configuration.aircraft) {
            return Err(GatewayError::UnknownAircraft(aircraft.to_string()));
        }
        if let Some(engine) = engine.filter(|e| *e != self.configuration.engine) {
            return Err(GatewayError::UnknownEngine {
                aircraft: aircraft.to_string(),
                engine: engine.to_string(),
            });
        }
        Ok(self.resolved())
    }
}

impl FleetData for StubRegistry {
    fn avg_num_seats(&self, _aircraft: &str) -> Option<f64> {
        self.seats
    }
}

/// Deterministic run options for the stub aircraft.
pub fn stub_run() -> RunConfig {
    let mut run = RunConfig::new("STUB");
    run.randomized = false;
    run.time_step_s = 100.0;
    run
}

/// Raw profile from `(t, h, vs)` triples.
pub fn raw_profile(id: usize, points: &[(f64, f64, f64)]) -> FlightProfile {
    let raw = points.iter().map(|&(t, h, vs)| RawSample {
        t,
        h,
        s: CRUISE_SPEED_M_S * t,
        v: CRUISE_SPEED_M_S,
        vs,
    });
    FlightProfile::from_raw(id, ProfileKind::Trip, raw).expect("valid raw profile")
}
