//! Flight fuel estimation.
//!
//! Synthesizes trajectories over an aircraft's cruise-range envelope, labels flight
//! phases, integrates fuel burn sample by sample, and solves the takeoff mass that makes
//! carried fuel and burned fuel consistent. The work lives in the member crates; this
//! crate re-exports them for the binaries and integration tests.

pub use fuel_config as config;
pub use fuel_core as types;
pub use fuel_estimate as estimate;
pub use fuel_export as export;
pub use fuel_gateway as gateway;
pub use fuel_profile as profile;

pub mod logging {
    use tracing_subscriber::EnvFilter;

    /// Install the stderr subscriber. `RUST_LOG` wins over `default_level` when set.
    ///
    /// Calling it twice is harmless; the second subscriber is simply not installed.
    pub fn init(default_level: &str) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Returns the version of the library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
