//! Catalog-backed reference performance model.
//!
//! A parametric stand-in for a full performance library: kinematic trajectories,
//! threshold phase classification, ISA-scaled thrust lapse, a parabolic drag polar and
//! a thrust-proportional fuel-flow curve, all parameterized by catalog records.

use std::path::Path;
use std::sync::Arc;

use fuel_config::{AircraftConfig, ConfigError, EngineConfig, load_aircraft};
use fuel_core::atmosphere::{RHO0_KG_M3, density, mach_to_tas, speed_of_sound};
use fuel_core::constants::G0;
use fuel_core::units::{fpm_to_ms, ft_to_m, kts_to_ms};
use fuel_core::{Phase, RawSample};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{
    AircraftConfiguration, FleetData, FuelFlowModel, GatewayError, ModelRegistry, PhaseClassifier,
    ResolvedModel, ThrustModel, TrajectoryGenerator,
};

const TAKEOFF_ACCEL_M_S2: f64 = 2.0;
const LANDING_DECEL_M_S2: f64 = 2.5;
const GROUND_ALT_FT: f64 = 100.0;
const LEVEL_ROC_FPM: f64 = 250.0;
const CRUISE_FLOOR_FT: f64 = 5_000.0;
const THRUST_MACH_LAPSE: f64 = 0.25;
const TSFC_ALT_FACTOR_PER_FT: f64 = 8.0e-6;

/// Model registry over an in-memory aircraft catalog.
#[derive(Debug, Clone)]
pub struct CatalogRegistry {
    aircraft: Vec<AircraftConfig>,
}

impl CatalogRegistry {
    pub fn new(aircraft: Vec<AircraftConfig>) -> Self {
        Self { aircraft }
    }

    /// Load the catalog through [`fuel_config::load_aircraft`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Ok(Self::new(load_aircraft(path)?))
    }

    pub fn records(&self) -> &[AircraftConfig] {
        &self.aircraft
    }

    fn find(&self, aircraft: &str) -> Option<&AircraftConfig> {
        self.aircraft
            .iter()
            .find(|record| record.code.eq_ignore_ascii_case(aircraft))
    }
}

impl ModelRegistry for CatalogRegistry {
    fn resolve(&self, aircraft: &str, engine: Option<&str>) -> Result<ResolvedModel, GatewayError> {
        let record = self
            .find(aircraft)
            .ok_or_else(|| GatewayError::UnknownAircraft(aircraft.to_string()))?;
        let wanted = engine.unwrap_or(&record.engine.default);
        let engine = record
            .engine
            .options
            .iter()
            .find(|option| option.name.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| GatewayError::UnknownEngine {
                aircraft: record.code.clone(),
                engine: wanted.to_string(),
            })?;

        let configuration = AircraftConfiguration {
            aircraft: record.code.clone(),
            engine: engine.name.clone(),
            oew_kg: record.oew_kg,
            mtow_kg: record.mtow_kg,
            cruise_range_km: (record.cruise_range_km.min, record.cruise_range_km.max),
            propulsion: record.engine.propulsion,
        };
        Ok(ResolvedModel {
            configuration,
            model: Arc::new(ReferenceModel::new(record.clone(), engine.clone())),
        })
    }
}

impl FleetData for CatalogRegistry {
    fn avg_num_seats(&self, aircraft: &str) -> Option<f64> {
        self.find(aircraft)
            .and_then(|record| record.fleet)
            .map(|fleet| fleet.avg_seats)
    }
}

/// Reference model for a single aircraft/engine pair.
#[derive(Debug, Clone)]
pub struct ReferenceModel {
    aircraft: AircraftConfig,
    engine: EngineConfig,
}

impl ReferenceModel {
    pub fn new(aircraft: AircraftConfig, engine: EngineConfig) -> Self {
        Self { aircraft, engine }
    }

    fn engines(&self) -> f64 {
        f64::from(self.aircraft.engine.count)
    }

    fn max_thrust(&self) -> f64 {
        self.engines() * self.engine.max_thrust_n
    }

    fn mach_lapse(tas_kts: f64, alt_ft: f64) -> f64 {
        let mach = kts_to_ms(tas_kts) / speed_of_sound(ft_to_m(alt_ft));
        (1.0 - THRUST_MACH_LAPSE * mach).max(0.5)
    }

    fn density_lapse(alt_ft: f64) -> f64 {
        (density(ft_to_m(alt_ft)) / RHO0_KG_M3).powf(0.75)
    }

    fn plan(&self, range_cr_m: f64, randomized: bool) -> FlightPlan {
        let traj = &self.aircraft.trajectory;
        let mut alt_cr_ft = self.aircraft.cruise_altitude_ft;
        let mut mach = self.aircraft.cruise_mach;
        let mut roc = fpm_to_ms(traj.climb_rate_fpm);
        let mut rod = fpm_to_ms(traj.descent_rate_fpm);
        if randomized {
            let mut rng = StdRng::seed_from_u64(range_cr_m.to_bits() ^ 0x5eed_f00d);
            alt_cr_ft += rng.gen_range(-1_000.0..=1_000.0);
            mach *= rng.gen_range(0.98..=1.02);
            roc *= rng.gen_range(0.9..=1.1);
            rod *= rng.gen_range(0.9..=1.1);
        }
        let h_cr = ft_to_m(alt_cr_ft);
        FlightPlan {
            v_lof: kts_to_ms(traj.liftoff_speed_kts),
            v_cr: mach_to_tas(mach, h_cr),
            v_app: kts_to_ms(traj.approach_speed_kts),
            h_cr,
            roc,
            rod,
            range_cr: range_cr_m,
        }
    }
}

/// Kinematic schedule of one complete flight.
struct FlightPlan {
    v_lof: f64,
    v_cr: f64,
    v_app: f64,
    h_cr: f64,
    roc: f64,
    rod: f64,
    range_cr: f64,
}

impl FlightPlan {
    /// Durations of takeoff roll, climb, cruise, descent and landing roll.
    fn durations(&self) -> [f64; 5] {
        [
            self.v_lof / TAKEOFF_ACCEL_M_S2,
            self.h_cr / self.roc,
            self.range_cr / self.v_cr,
            self.h_cr / self.rod,
            self.v_app / LANDING_DECEL_M_S2,
        ]
    }

    fn total_duration(&self) -> f64 {
        self.durations().iter().sum()
    }

    fn state_at(&self, t: f64) -> RawSample {
        let [t_to, t_cl, t_cr, t_de, t_ld] = self.durations();
        let s_to = 0.5 * TAKEOFF_ACCEL_M_S2 * t_to * t_to;
        let s_cl = s_to + 0.5 * (self.v_lof + self.v_cr) * t_cl;
        let s_cr = s_cl + self.range_cr;
        let s_de = s_cr + 0.5 * (self.v_cr + self.v_app) * t_de;

        let mut tau = t;
        if tau <= t_to {
            let v = TAKEOFF_ACCEL_M_S2 * tau;
            return sample(t, 0.0, 0.5 * TAKEOFF_ACCEL_M_S2 * tau * tau, v, 0.0);
        }
        tau -= t_to;
        if tau <= t_cl {
            let (v, ds) = ramp(self.v_lof, self.v_cr, t_cl, tau);
            return sample(t, self.roc * tau, s_to + ds, v, self.roc);
        }
        tau -= t_cl;
        if tau <= t_cr {
            return sample(t, self.h_cr, s_cl + self.v_cr * tau, self.v_cr, 0.0);
        }
        tau -= t_cr;
        if tau <= t_de {
            let (v, ds) = ramp(self.v_cr, self.v_app, t_de, tau);
            let h = (self.h_cr - self.rod * tau).max(0.0);
            return sample(t, h, s_cr + ds, v, -self.rod);
        }
        tau = (tau - t_de).min(t_ld);
        let v = (self.v_app - LANDING_DECEL_M_S2 * tau).max(0.0);
        let ds = self.v_app * tau - 0.5 * LANDING_DECEL_M_S2 * tau * tau;
        sample(t, 0.0, s_de + ds, v, 0.0)
    }
}

/// Speed and distance covered after `tau` seconds of a linear speed ramp lasting `span`.
fn ramp(v0: f64, v1: f64, span: f64, tau: f64) -> (f64, f64) {
    let accel = if span > 0.0 { (v1 - v0) / span } else { 0.0 };
    (v0 + accel * tau, v0 * tau + 0.5 * accel * tau * tau)
}

fn sample(t: f64, h: f64, s: f64, v: f64, vs: f64) -> RawSample {
    RawSample { t, h, s, v, vs }
}

/// Sample times `0, dt, 2dt, ...` closed by `total`.
fn sample_times(total: f64, dt: f64) -> Result<Vec<f64>, GatewayError> {
    if !(total.is_finite() && total > 0.0) {
        return Err(GatewayError::InvalidRequest(format!(
            "trajectory duration must be positive and finite (got {total} s)"
        )));
    }
    let mut times = Vec::with_capacity((total / dt).ceil() as usize + 1);
    let mut k = 0u64;
    loop {
        let t = k as f64 * dt;
        if t >= total - 1e-9 {
            break;
        }
        times.push(t);
        k += 1;
    }
    times.push(total);
    Ok(times)
}

impl TrajectoryGenerator for ReferenceModel {
    fn complete(
        &self,
        range_cr_m: f64,
        dt_s: f64,
        randomized: bool,
    ) -> Result<Vec<RawSample>, GatewayError> {
        if !(dt_s > 0.0) {
            return Err(GatewayError::InvalidRequest(format!(
                "time step must be positive (got {dt_s} s)"
            )));
        }
        let plan = self.plan(range_cr_m, randomized);
        Ok(sample_times(plan.total_duration(), dt_s)?
            .into_iter()
            .map(|t| plan.state_at(t))
            .collect())
    }

    fn cruise(
        &self,
        dt_s: f64,
        duration_s: f64,
        alt_cr_ft: f64,
        randomized: bool,
    ) -> Result<Vec<RawSample>, GatewayError> {
        if !(dt_s > 0.0 && duration_s > 0.0) {
            return Err(GatewayError::InvalidRequest(
                "cruise duration and time step must be positive".into(),
            ));
        }
        let mut speed_kts = self.aircraft.trajectory.holding_speed_kts;
        if randomized {
            let mut rng = StdRng::seed_from_u64(alt_cr_ft.to_bits() ^ duration_s.to_bits());
            speed_kts += rng.gen_range(-5.0..=5.0);
        }
        let v = kts_to_ms(speed_kts);
        let h = ft_to_m(alt_cr_ft);
        Ok(sample_times(duration_s, dt_s)?
            .into_iter()
            .map(|t| sample(t, h, v * t, v, 0.0))
            .collect())
    }
}

impl PhaseClassifier for ReferenceModel {
    fn classify(
        &self,
        _ts: &[f64],
        alt_ft: &[f64],
        _spd_kts: &[f64],
        roc_fpm: &[f64],
    ) -> Vec<Phase> {
        alt_ft
            .iter()
            .zip(roc_fpm)
            .map(|(&alt, &roc)| {
                if roc > LEVEL_ROC_FPM {
                    Phase::Cl
                } else if roc < -LEVEL_ROC_FPM {
                    Phase::De
                } else if alt < GROUND_ALT_FT {
                    Phase::Gnd
                } else if alt >= CRUISE_FLOOR_FT {
                    Phase::Cr
                } else {
                    Phase::Na
                }
            })
            .collect()
    }
}

impl ThrustModel for ReferenceModel {
    fn takeoff(&self, tas_kts: f64, alt_ft: f64) -> f64 {
        self.max_thrust() * Self::mach_lapse(tas_kts, alt_ft)
    }

    fn climb(&self, tas_kts: f64, alt_ft: f64, roc_fpm: f64) -> f64 {
        let roc_factor = 0.8 + 0.2 * (roc_fpm / 3_000.0).clamp(0.0, 1.0);
        0.92 * self.max_thrust()
            * Self::density_lapse(alt_ft)
            * Self::mach_lapse(tas_kts, alt_ft)
            * roc_factor
    }

    fn cruise(&self, tas_kts: f64, alt_ft: f64) -> f64 {
        0.7 * self.max_thrust() * Self::density_lapse(alt_ft) * Self::mach_lapse(tas_kts, alt_ft)
    }

    fn descent_idle(&self, _tas_kts: f64, alt_ft: f64) -> f64 {
        0.07 * self.max_thrust() * Self::density_lapse(alt_ft)
    }
}

impl FuelFlowModel for ReferenceModel {
    fn takeoff(&self, _tas_kts: f64, _alt_ft: f64, throttle: f64) -> f64 {
        let span = self.engine.ff_takeoff_kg_s - self.engine.ff_idle_kg_s;
        self.engines() * (self.engine.ff_idle_kg_s + span * throttle.clamp(0.0, 1.0))
    }

    fn enroute(&self, mass_kg: f64, tas_kts: f64, alt_ft: f64) -> f64 {
        let v = kts_to_ms(tas_kts);
        let q = 0.5 * density(ft_to_m(alt_ft)) * v * v;
        if q <= 0.0 {
            return self.engines() * self.engine.ff_idle_kg_s;
        }
        let qs = q * self.aircraft.wing_area_m2;
        let cl = mass_kg * G0 / qs;
        let cd = self.aircraft.drag.cd0 + self.aircraft.drag.k * cl * cl;
        self.at_thrust(qs * cd, alt_ft)
    }

    fn at_thrust(&self, thrust_n: f64, alt_ft: f64) -> f64 {
        let ratio = (thrust_n / self.max_thrust()).clamp(0.0, 1.2);
        let span = self.engine.ff_takeoff_kg_s - self.engine.ff_idle_kg_s;
        let per_engine = self.engine.ff_idle_kg_s + span * ratio;
        self.engines() * per_engine * (1.0 + TSFC_ALT_FACTOR_PER_FT * alt_ft.max(0.0))
    }
}
