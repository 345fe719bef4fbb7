//! Trajectory synthesis over the cruise-range sweep, plus the reserve and alternate legs.

use fuel_core::Phase;
use fuel_core::units::km_to_m;
use fuel_gateway::{Gateway, GatewayError};
use fuel_profile::{FlightProfile, FlightProfileBatch, ProfileError, ProfileKind, ProfileSource};

use super::EstimateError;
use super::phase::label_phases;

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
}

/// Options of a cruise-range sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepOptions {
    pub range_step_km: u32,
    pub time_step_s: f64,
    pub randomized: bool,
    /// Label phases while generating.
    pub set_flight_phase: bool,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            range_step_km: 100,
            time_step_s: 10.0,
            randomized: true,
            set_flight_phase: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProfileGenerator {
    gateway: Gateway,
}

impl ProfileGenerator {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Cruise ranges (km) from the lower bound up to, not including, the upper bound.
    pub fn cruise_ranges_km(&self, range_step_km: u32) -> Vec<f64> {
        let (min_km, max_km) = self.gateway.cruise_range_bounds();
        let step = range_step_km.max(1) as usize;
        (min_km.trunc() as i64..max_km.trunc() as i64)
            .step_by(step)
            .map(|range| range as f64)
            .collect()
    }

    /// One raw trip trajectory.
    pub fn trip(
        &self,
        flight_id: usize,
        cruise_range_km: f64,
        time_step_s: f64,
        randomized: bool,
    ) -> Result<FlightProfile, GeneratorError> {
        let raw =
            self.gateway
                .generate_trajectory(km_to_m(cruise_range_km), time_step_s, randomized)?;
        Ok(FlightProfile::from_raw(flight_id, ProfileKind::Trip, raw)?
            .with_cruise_range_km(cruise_range_km))
    }

    /// Lazy batch of trip profiles, one per cruise range, flight ids counting from zero.
    ///
    /// Nothing is generated until the batch is iterated.
    pub fn trip_profiles(&self, options: SweepOptions) -> FlightProfileBatch<EstimateError> {
        let ranges = self.cruise_ranges_km(options.range_step_km);
        let len = ranges.len();
        let generator = self.clone();
        let profiles = ranges
            .into_iter()
            .enumerate()
            .map(move |(id, range_km)| -> Result<FlightProfile, EstimateError> {
                let profile =
                    generator.trip(id, range_km, options.time_step_s, options.randomized)?;
                if options.set_flight_phase {
                    Ok(label_phases(&generator.gateway, profile)?)
                } else {
                    Ok(profile)
                }
            });
        FlightProfileBatch::new(profiles, len)
    }

    /// Restartable producer of [`trip_profiles`](Self::trip_profiles) batches.
    pub fn source(&self, options: SweepOptions) -> ProfileSource<EstimateError> {
        let generator = self.clone();
        ProfileSource::new(move || generator.trip_profiles(options))
    }

    /// Level hold at `altitude_ft` lasting the reserve time of the propulsion type.
    ///
    /// Only the first and last generated samples are kept, so the profile is a single
    /// interval spanning the whole hold. It is labeled CR throughout.
    pub fn reserve_cruise(&self, altitude_ft: f64) -> Result<FlightProfile, GeneratorError> {
        let duration_s = self.gateway.configuration().propulsion.reserve_duration_s();
        let raw = self
            .gateway
            .generate_reserve_cruise(duration_s, altitude_ft)?;
        let endpoints: Vec<_> = raw.first().into_iter().chain(raw.last()).copied().collect();
        let profile = FlightProfile::from_raw(0, ProfileKind::ReserveCruise, endpoints)?;
        Ok(profile.with_uniform_phase(Phase::Cr))
    }

    /// Zero-range complete flight to the alternate aerodrome, left raw.
    pub fn alternate_diversion(&self, time_step_s: f64) -> Result<FlightProfile, GeneratorError> {
        let raw = self.gateway.generate_alternate_diversion(time_step_s)?;
        Ok(FlightProfile::from_raw(0, ProfileKind::Alternate, raw)?.with_cruise_range_km(0.0))
    }
}
