//! Re-exported APIs for consumers of the estimation crate.

pub use crate::pipeline::fuel::{FuelError, FuelSummary, compute_fuel, compute_fuel_last_point};
pub use crate::pipeline::generator::{GeneratorError, ProfileGenerator, SweepOptions};
pub use crate::pipeline::mass::{
    MassConvergenceRecord, MassError, MassSolverConfig, TakeoffMassSolver, TowSolution,
    payload_mass,
};
pub use crate::pipeline::phase::{PhaseError, ensure_labeled, label_phases};
pub use crate::pipeline::sweep::{SkippedProfile, SweepReport, SweepRow, sweep, sweep_parallel};
pub use crate::pipeline::thrust::estimate_thrust;
pub use crate::pipeline::{EstimateError, FlightEstimate, FuelEstimator};

pub mod catalog {
    use fuel_config::AircraftConfig;
    use fuel_gateway::FleetData;
    use fuel_gateway::reference::CatalogRegistry;
    use serde::Serialize;

    /// One line of the aircraft listing.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct CatalogEntry {
        pub code: String,
        pub name: String,
        pub default_engine: String,
        pub engines: Vec<String>,
        pub avg_seats: Option<f64>,
    }

    impl CatalogEntry {
        fn from_record(record: &AircraftConfig, registry: &CatalogRegistry) -> Self {
            Self {
                code: record.code.clone(),
                name: record.name.clone(),
                default_engine: record.engine.default.clone(),
                engines: record
                    .engine
                    .options
                    .iter()
                    .map(|engine| engine.name.clone())
                    .collect(),
                avg_seats: registry.avg_num_seats(&record.code),
            }
        }
    }

    /// Catalog contents sorted by aircraft code.
    pub fn entries(registry: &CatalogRegistry) -> Vec<CatalogEntry> {
        let mut entries: Vec<_> = registry
            .records()
            .iter()
            .map(|record| CatalogEntry::from_record(record, registry))
            .collect();
        entries.sort_by(|a, b| a.code.cmp(&b.code));
        entries
    }
}
