//! Estimation pipeline: trajectory synthesis, phase labeling, fuel integration and
//! the takeoff-mass fixed point, chained per flight by [`FuelEstimator`].

pub mod fuel;
pub mod generator;
pub mod mass;
pub mod phase;
pub mod sweep;
pub mod thrust;

use fuel_config::{ConfigError, RunConfig};
use fuel_gateway::{FleetData, Gateway, GatewayError, ModelRegistry};
use fuel_profile::{FlightProfile, FlightProfileBatch, ProfileError, ProfileSource};
use tracing::info;

use self::fuel::{FuelError, FuelSummary, compute_fuel, compute_fuel_last_point};
use self::generator::{GeneratorError, ProfileGenerator, SweepOptions};
use self::mass::{MassConvergenceRecord, MassError, MassSolverConfig, TakeoffMassSolver};
use self::phase::{PhaseError, label_phases};
use self::sweep::SweepReport;

/// Top-level estimation error.
#[derive(Debug, thiserror::Error)]
pub enum EstimateError {
    #[error("invalid run configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("performance model: {0}")]
    Gateway(#[from] GatewayError),
    #[error("profile: {0}")]
    Profile(#[from] ProfileError),
    #[error("trajectory generation failed: {0}")]
    Generator(#[from] GeneratorError),
    #[error("phase labeling failed: {0}")]
    Phase(#[from] PhaseError),
    #[error("fuel integration failed: {0}")]
    Fuel(#[from] FuelError),
    #[error("takeoff mass estimation failed: {0}")]
    Mass(#[from] MassError),
}

impl EstimateError {
    /// Errors that invalidate the whole run rather than a single flight.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            EstimateError::Config(_)
                | EstimateError::Gateway(
                    GatewayError::UnknownAircraft(_) | GatewayError::UnknownEngine { .. }
                )
                | EstimateError::Mass(MassError::MissingSeatCount { .. })
        )
    }
}

/// Result of estimating one trip.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightEstimate {
    pub summary: FuelSummary,
    pub cruise_range_km: Option<f64>,
    pub takeoff_mass_kg: f64,
    pub iterations: usize,
    /// Solver iterations, kept when the run asks for the trace.
    pub trace: Option<Vec<MassConvergenceRecord>>,
    /// Full fuel-integrated profile, kept unless the run asks for the last point only.
    pub profile: Option<FlightProfile>,
}

impl FlightEstimate {
    pub fn flight_id(&self) -> usize {
        self.summary.flight_id
    }
}

/// Estimator bound to one aircraft configuration and one set of run options.
#[derive(Debug, Clone)]
pub struct FuelEstimator {
    run: RunConfig,
    generator: ProfileGenerator,
    solver: TakeoffMassSolver,
}

impl FuelEstimator {
    /// Resolve the aircraft and prepare the solver. Configuration problems surface here.
    pub fn new(
        registry: &dyn ModelRegistry,
        fleet: &dyn FleetData,
        run: RunConfig,
    ) -> Result<Self, EstimateError> {
        let solver_config = MassSolverConfig {
            max_iterations: run.max_iterations,
            ..MassSolverConfig::default()
        };
        Self::with_solver_config(registry, fleet, run, solver_config)
    }

    pub fn with_solver_config(
        registry: &dyn ModelRegistry,
        fleet: &dyn FleetData,
        run: RunConfig,
        solver_config: MassSolverConfig,
    ) -> Result<Self, EstimateError> {
        run.validate()?;
        let gateway = Gateway::connect(registry, &run.aircraft, run.engine.as_deref(), run.randomized)?;
        let solver = TakeoffMassSolver::new(gateway.clone(), fleet, solver_config)?;
        let configuration = gateway.configuration();
        info!(
            aircraft = %configuration.aircraft,
            engine = %configuration.engine,
            payload_kg = solver.payload_mass_kg(),
            "fuel estimator ready"
        );
        Ok(Self {
            run,
            generator: ProfileGenerator::new(gateway),
            solver,
        })
    }

    pub fn run_config(&self) -> &RunConfig {
        &self.run
    }

    pub fn gateway(&self) -> &Gateway {
        self.generator.gateway()
    }

    pub fn generator(&self) -> &ProfileGenerator {
        &self.generator
    }

    pub fn solver(&self) -> &TakeoffMassSolver {
        &self.solver
    }

    fn sweep_options(&self) -> SweepOptions {
        SweepOptions {
            range_step_km: self.run.range_step_km,
            time_step_s: self.run.time_step_s,
            randomized: self.run.randomized,
            set_flight_phase: true,
        }
    }

    /// Labeled trip profiles over the aircraft's cruise-range bounds, generated lazily.
    pub fn gen_flight_profiles(&self) -> FlightProfileBatch<EstimateError> {
        self.generator.trip_profiles(self.sweep_options())
    }

    pub fn profile_source(&self) -> ProfileSource<EstimateError> {
        self.generator.source(self.sweep_options())
    }

    /// Trip fuel burned from a fixed takeoff weight, without the mass loop.
    pub fn trip_fuel(&self, profile: &FlightProfile, tow_kg: f64) -> Result<FuelSummary, EstimateError> {
        Ok(compute_fuel_last_point(self.gateway(), profile, tow_kg)?)
    }

    /// Solve the takeoff weight of one trip and integrate its fuel from that weight.
    pub fn evaluate(&self, profile: FlightProfile) -> Result<FlightEstimate, EstimateError> {
        let profile = label_phases(self.gateway(), profile)?;
        let solution = self.solver.solve(&profile)?;
        let cruise_range_km = profile.cruise_range_km();

        let (summary, profile) = if self.run.last_point_only {
            let summary = compute_fuel_last_point(self.gateway(), &profile, solution.tow)?;
            (summary, None)
        } else {
            let integrated = compute_fuel(self.gateway(), profile, solution.tow)?;
            let summary = FuelSummary::from_profile(&integrated).unwrap_or(FuelSummary {
                flight_id: integrated.id(),
                distance_m: integrated.distance_flown(),
                fuel_kg: integrated.total_fuel(),
                final_mass_kg: solution.tow - integrated.total_fuel(),
            });
            (summary, Some(integrated))
        };

        Ok(FlightEstimate {
            summary,
            cruise_range_km,
            takeoff_mass_kg: solution.tow,
            iterations: solution.iterations,
            trace: self.run.return_trace.then_some(solution.trace),
            profile,
        })
    }

    /// Lazily evaluate every profile of a batch.
    pub fn compute_fuel<'a>(
        &'a self,
        batch: FlightProfileBatch<EstimateError>,
    ) -> impl Iterator<Item = Result<FlightEstimate, EstimateError>> + 'a {
        batch.map(move |item| item.and_then(|profile| self.evaluate(profile)))
    }

    /// Evaluate the full cruise-range sweep, in parallel when the run asks for it.
    pub fn run(&self) -> Result<SweepReport, EstimateError> {
        let batch = self.gen_flight_profiles();
        if self.run.parallel {
            sweep::sweep_parallel(self, batch, || false)
        } else {
            sweep::sweep(self, batch, || false)
        }
    }
}
