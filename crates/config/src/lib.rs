//! Configuration models and loaders for aircraft catalogs and estimation runs.

use std::fs::File;
use std::path::{Path, PathBuf};

use fuel_core::PropulsionType;
use serde::Deserialize;
use thiserror::Error;

/// Aircraft performance record parsed from the catalog.
#[derive(Debug, Deserialize, Clone)]
pub struct AircraftConfig {
    /// ICAO type designator used as the lookup key (e.g. "A320").
    pub code: String,
    pub name: String,
    pub oew_kg: f64,
    pub mtow_kg: f64,
    pub cruise_range_km: CruiseRangeConfig,
    pub cruise_altitude_ft: f64,
    pub cruise_mach: f64,
    pub wing_area_m2: f64,
    pub drag: DragPolarConfig,
    pub engine: EngineTableConfig,
    #[serde(default)]
    pub trajectory: TrajectoryConfig,
    #[serde(default)]
    pub fleet: Option<FleetConfig>,
}

/// Bounds of the cruise segment length flown by this type.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct CruiseRangeConfig {
    pub min: f64,
    pub max: f64,
}

/// Parabolic drag polar `CD = cd0 + k * CL²`.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct DragPolarConfig {
    pub cd0: f64,
    pub k: f64,
}

/// Engine installation: the default engine plus every certified option.
#[derive(Debug, Deserialize, Clone)]
pub struct EngineTableConfig {
    pub default: String,
    pub propulsion: PropulsionType,
    pub count: u32,
    pub options: Vec<EngineConfig>,
}

/// Per-engine thrust and fuel-flow data.
#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    pub name: String,
    /// Sea-level static maximum thrust of a single engine (N).
    pub max_thrust_n: f64,
    /// Fuel flow of a single engine at ground idle (kg/s).
    pub ff_idle_kg_s: f64,
    /// Fuel flow of a single engine at takeoff rating (kg/s).
    pub ff_takeoff_kg_s: f64,
}

/// Kinematic parameters of the synthetic trajectory generator.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct TrajectoryConfig {
    #[serde(default = "default_liftoff_speed_kts")]
    pub liftoff_speed_kts: f64,
    #[serde(default = "default_approach_speed_kts")]
    pub approach_speed_kts: f64,
    #[serde(default = "default_holding_speed_kts")]
    pub holding_speed_kts: f64,
    #[serde(default = "default_climb_rate_fpm")]
    pub climb_rate_fpm: f64,
    #[serde(default = "default_descent_rate_fpm")]
    pub descent_rate_fpm: f64,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            liftoff_speed_kts: default_liftoff_speed_kts(),
            approach_speed_kts: default_approach_speed_kts(),
            holding_speed_kts: default_holding_speed_kts(),
            climb_rate_fpm: default_climb_rate_fpm(),
            descent_rate_fpm: default_descent_rate_fpm(),
        }
    }
}

fn default_liftoff_speed_kts() -> f64 {
    150.0
}

fn default_approach_speed_kts() -> f64 {
    140.0
}

fn default_holding_speed_kts() -> f64 {
    210.0
}

fn default_climb_rate_fpm() -> f64 {
    2_000.0
}

fn default_descent_rate_fpm() -> f64 {
    1_800.0
}

/// Fleet occupancy data; absent until the type is registered.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct FleetConfig {
    pub avg_seats: f64,
}

/// Options recognized by an estimation run.
#[derive(Debug, Deserialize, Clone)]
pub struct RunConfig {
    pub aircraft: String,
    #[serde(default)]
    pub engine: Option<String>,
    #[serde(default = "default_range_step_km")]
    pub range_step_km: u32,
    #[serde(default = "default_time_step_s")]
    pub time_step_s: f64,
    #[serde(default)]
    pub last_point_only: bool,
    #[serde(default)]
    pub return_trace: bool,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_randomized")]
    pub randomized: bool,
    #[serde(default)]
    pub parallel: bool,
}

impl RunConfig {
    /// Run options with every default applied.
    pub fn new(aircraft: impl Into<String>) -> Self {
        Self {
            aircraft: aircraft.into(),
            engine: None,
            range_step_km: default_range_step_km(),
            time_step_s: default_time_step_s(),
            last_point_only: false,
            return_trace: false,
            max_iterations: default_max_iterations(),
            randomized: default_randomized(),
            parallel: false,
        }
    }

    /// Reject option values no run can make sense of.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.aircraft.trim().is_empty() {
            return Err(ConfigError::Invalid("aircraft type is required".into()));
        }
        if self.range_step_km == 0 {
            return Err(ConfigError::Invalid(
                "cruise-range step must be at least 1 km".into(),
            ));
        }
        if !(self.time_step_s.is_finite() && self.time_step_s > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "time step must be positive (got {})",
                self.time_step_s
            )));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::Invalid(
                "solver needs at least one iteration".into(),
            ));
        }
        Ok(())
    }
}

fn default_range_step_km() -> u32 {
    100
}

fn default_time_step_s() -> f64 {
    10.0
}

fn default_max_iterations() -> usize {
    50
}

fn default_randomized() -> bool {
    true
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Load aircraft records from a YAML list, a single TOML file, or a directory of TOML files.
pub fn load_aircraft<P: AsRef<Path>>(path: P) -> Result<Vec<AircraftConfig>, ConfigError> {
    let aircraft: Vec<AircraftConfig> = load_records(path)?;
    for record in &aircraft {
        validate_aircraft(record)?;
    }
    Ok(aircraft)
}

/// Load run options from a TOML or YAML file holding a single record.
pub fn load_run_config<P: AsRef<Path>>(path: P) -> Result<RunConfig, ConfigError> {
    let path = path.as_ref();
    let config: RunConfig = if is_toml(path) {
        toml::from_str(&std::fs::read_to_string(path)?)?
    } else {
        serde_yaml::from_reader(File::open(path)?)?
    };
    config.validate()?;
    Ok(config)
}

fn validate_aircraft(record: &AircraftConfig) -> Result<(), ConfigError> {
    if record.oew_kg <= 0.0 || record.mtow_kg <= record.oew_kg {
        return Err(ConfigError::Invalid(format!(
            "{}: MTOW ({}) must exceed OEW ({})",
            record.code, record.mtow_kg, record.oew_kg
        )));
    }
    if record.cruise_range_km.min < 0.0 || record.cruise_range_km.max <= record.cruise_range_km.min
    {
        return Err(ConfigError::Invalid(format!(
            "{}: cruise range bounds are inverted",
            record.code
        )));
    }
    let traj = &record.trajectory;
    let positive = [
        ("cruise_altitude_ft", record.cruise_altitude_ft),
        ("cruise_mach", record.cruise_mach),
        ("wing_area_m2", record.wing_area_m2),
        ("liftoff_speed_kts", traj.liftoff_speed_kts),
        ("approach_speed_kts", traj.approach_speed_kts),
        ("holding_speed_kts", traj.holding_speed_kts),
        ("climb_rate_fpm", traj.climb_rate_fpm),
        ("descent_rate_fpm", traj.descent_rate_fpm),
    ];
    for (field, value) in positive {
        if !(value.is_finite() && value > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "{}: {field} must be positive and finite (got {value})",
                record.code
            )));
        }
    }
    if record.engine.count == 0 {
        return Err(ConfigError::Invalid(format!(
            "{}: engine count must be at least 1",
            record.code
        )));
    }
    for engine in &record.engine.options {
        if !(engine.max_thrust_n.is_finite() && engine.max_thrust_n > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "{}: engine `{}` needs a positive max_thrust_n",
                record.code, engine.name
            )));
        }
    }
    if !record
        .engine
        .options
        .iter()
        .any(|engine| engine.name.eq_ignore_ascii_case(&record.engine.default))
    {
        return Err(ConfigError::Invalid(format!(
            "{}: default engine `{}` is not among the engine options",
            record.code, record.engine.default
        )));
    }
    Ok(())
}

fn is_toml(path: &Path) -> bool {
    path.extension().map(|ext| ext == "toml").unwrap_or(false)
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if is_toml(path) {
        let contents = std::fs::read_to_string(path)?;
        let record: T = toml::from_str(&contents)?;
        Ok(vec![record])
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_toml(path))
        .collect();
    entries.sort();
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        let record: T = toml::from_str(&contents)?;
        records.push(record);
    }
    Ok(records)
}
