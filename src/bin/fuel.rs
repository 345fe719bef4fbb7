use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use fuel_estimator::config::{RunConfig, load_run_config};
use fuel_estimator::estimate::{FlightEstimate, FuelEstimator, SweepReport, catalog};
use fuel_estimator::export::table::{
    MassAwareFuelRecord, SweepRecord, TripFuelRecord, write_records_to_path,
};
use fuel_estimator::export::trace::{self, FlightTrace, Metadata};
use fuel_estimator::export::writer_for_path;
use fuel_estimator::gateway::reference::CatalogRegistry;
use fuel_estimator::logging;
use fuel_estimator::types::units::m_to_km;

#[derive(Parser)]
#[command(author, version, about = "Flight fuel and takeoff-mass estimator")]
struct Cli {
    /// Aircraft catalog: YAML list, TOML file, or directory of TOML files
    #[arg(long, global = true, default_value = "configs/aircraft")]
    catalog: PathBuf,

    /// Log solver iterations (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Estimate fuel over the aircraft's cruise-range envelope
    Sweep(SweepArgs),
    /// Solve the takeoff mass for a single cruise range
    Solve(SolveArgs),
    /// List the aircraft in the catalog
    Catalog,
}

#[derive(Args)]
struct RunArgs {
    /// Aircraft type code (required unless --config provides it)
    #[arg(long)]
    aircraft: Option<String>,

    /// Engine type, defaults to the aircraft's default engine
    #[arg(long)]
    engine: Option<String>,

    /// Run options file (TOML or YAML); flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Trajectory time step in seconds
    #[arg(long)]
    time_step: Option<f64>,

    /// Solver iteration cap
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Disable trajectory randomization
    #[arg(long)]
    deterministic: bool,

    /// Keep the per-iteration solver trace
    #[arg(long)]
    trace: bool,
}

#[derive(Args)]
struct SweepArgs {
    #[command(flatten)]
    run: RunArgs,

    /// Cruise-range step in km
    #[arg(long)]
    range_step: Option<u32>,

    /// Only keep fuel totals, not the per-sample profiles
    #[arg(long)]
    last_point_only: bool,

    /// Evaluate profiles on all cores
    #[arg(long)]
    parallel: bool,

    /// Output CSV path (`-` for stdout)
    #[arg(long, default_value = "-")]
    output: PathBuf,

    /// Columns of the output table
    #[arg(long, value_enum, default_value_t = TableKind::MassAware)]
    table: TableKind,

    /// Also write every profile sample to this CSV
    #[arg(long)]
    samples: Option<PathBuf>,
}

#[derive(Args)]
struct SolveArgs {
    #[command(flatten)]
    run: RunArgs,

    /// Cruise range in km
    #[arg(long)]
    range_km: f64,

    /// Write the fuel-integrated profile samples to this CSV
    #[arg(long)]
    samples: Option<PathBuf>,
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum TableKind {
    Trip,
    MassAware,
    Full,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(if cli.verbose { "debug" } else { "info" });

    let registry = CatalogRegistry::load(&cli.catalog)?;
    match cli.command {
        Command::Sweep(args) => run_sweep(&registry, args),
        Command::Solve(args) => run_solve(&registry, args),
        Command::Catalog => list_catalog(&registry),
    }
}

fn run_config(args: &RunArgs) -> anyhow::Result<RunConfig> {
    let mut config = match (&args.config, &args.aircraft) {
        (Some(path), _) => load_run_config(path)?,
        (None, Some(aircraft)) => RunConfig::new(aircraft.as_str()),
        (None, None) => anyhow::bail!("either --aircraft or --config is required"),
    };
    if let Some(aircraft) = &args.aircraft {
        config.aircraft = aircraft.clone();
    }
    if args.engine.is_some() {
        config.engine = args.engine.clone();
    }
    if let Some(dt) = args.time_step {
        config.time_step_s = dt;
    }
    if let Some(max_iterations) = args.max_iterations {
        config.max_iterations = max_iterations;
    }
    if args.deterministic {
        config.randomized = false;
    }
    config.return_trace |= args.trace;
    Ok(config)
}

fn run_sweep(registry: &CatalogRegistry, args: SweepArgs) -> anyhow::Result<()> {
    let mut config = run_config(&args.run)?;
    if let Some(step) = args.range_step {
        config.range_step_km = step;
    }
    config.last_point_only |= args.last_point_only;
    config.parallel |= args.parallel;
    if config.last_point_only && args.samples.is_some() {
        anyhow::bail!("--samples needs full profiles; drop --last-point-only");
    }

    let estimator = FuelEstimator::new(registry, registry, config)?;
    let report = estimator.run()?;

    let rows = report.estimates.iter().map(sweep_record);
    match args.table {
        TableKind::Trip => write_records_to_path(&args.output, rows.map(TripFuelRecord::from))?,
        TableKind::MassAware => {
            write_records_to_path(&args.output, rows.map(MassAwareFuelRecord::from))?
        }
        TableKind::Full => write_records_to_path(&args.output, rows)?,
    }
    if let Some(path) = &args.samples {
        write_samples(path, &report.estimates)?;
    }
    if estimator.run_config().return_trace {
        write_trace(&estimator, &args.output, &report.estimates)?;
    }
    summarize(&report);
    Ok(())
}

fn run_solve(registry: &CatalogRegistry, args: SolveArgs) -> anyhow::Result<()> {
    let mut config = run_config(&args.run)?;
    config.last_point_only = args.samples.is_none();
    let estimator = FuelEstimator::new(registry, registry, config)?;

    let run = estimator.run_config();
    let trip = estimator
        .generator()
        .trip(0, args.range_km, run.time_step_s, run.randomized)?;
    let estimate = estimator.evaluate(trip)?;

    println!("=== Takeoff Mass ===");
    println!(
        "Aircraft: {} ({})",
        estimator.gateway().configuration().aircraft,
        estimator.gateway().configuration().engine
    );
    println!("Cruise range: {:.0} km", args.range_km);
    println!("Distance flown: {:.1} km", m_to_km(estimate.summary.distance_m));
    println!("Trip fuel: {:.1} kg", estimate.summary.fuel_kg);
    println!(
        "Takeoff mass: {:.1} kg after {} iterations",
        estimate.takeoff_mass_kg, estimate.iterations
    );
    if let Some(iterations) = &estimate.trace {
        for (index, record) in iterations.iter().enumerate() {
            println!(
                "  #{:<2} tow {:>9.1}  trip {:>8.1}  cont {:>7.1}  res {:>7.1}  alt {:>7.1}  -> {:>9.1}",
                index + 1,
                record.tow,
                record.f_trip,
                record.f_cont,
                record.f_res,
                record.f_alt,
                record.new_tow
            );
        }
    }
    if let Some(path) = &args.samples {
        write_samples(path, std::slice::from_ref(&estimate))?;
    }
    Ok(())
}

fn list_catalog(registry: &CatalogRegistry) -> anyhow::Result<()> {
    for entry in catalog::entries(registry) {
        let seats = entry
            .avg_seats
            .map_or_else(|| "-".to_string(), |seats| format!("{seats:.0}"));
        println!(
            "{:<6} {:<28} seats {:>4}  engines {} (default {})",
            entry.code,
            entry.name,
            seats,
            entry.engines.join(", "),
            entry.default_engine
        );
    }
    Ok(())
}

fn sweep_record(estimate: &FlightEstimate) -> SweepRecord {
    SweepRecord {
        flight_id: estimate.summary.flight_id,
        cruise_range_km: estimate.cruise_range_km,
        distance_m: estimate.summary.distance_m,
        fuel_kg: estimate.summary.fuel_kg,
        final_mass_kg: estimate.summary.final_mass_kg,
        takeoff_mass_kg: estimate.takeoff_mass_kg,
        iterations: estimate.iterations,
    }
}

fn write_samples(path: &Path, estimates: &[FlightEstimate]) -> anyhow::Result<()> {
    let profiles = estimates.iter().filter_map(|estimate| estimate.profile.as_ref());
    trace::write_samples(writer_for_path(path)?, profiles)?;
    Ok(())
}

fn write_trace(
    estimator: &FuelEstimator,
    output: &Path,
    estimates: &[FlightEstimate],
) -> anyhow::Result<()> {
    let flights: Vec<_> = estimates
        .iter()
        .map(|estimate| FlightTrace {
            flight_id: estimate.flight_id(),
            takeoff_mass_kg: estimate.takeoff_mass_kg,
            iterations: estimate.trace.clone().unwrap_or_default(),
        })
        .collect();
    let configuration = estimator.gateway().configuration();
    let meta = Metadata {
        aircraft: &configuration.aircraft,
        engine: &configuration.engine,
    };
    let path = trace::write_convergence_sidecar(output, &meta, &flights)?;
    eprintln!("convergence trace written to {}", path.display());
    Ok(())
}

fn summarize(report: &SweepReport) {
    eprintln!(
        "{} flights estimated, {} skipped{}",
        report.estimates.len(),
        report.skipped.len(),
        if report.cancelled { " (cancelled)" } else { "" }
    );
    for skip in &report.skipped {
        eprintln!("  flight {}: {}", skip.flight_id, skip.reason);
    }
}
