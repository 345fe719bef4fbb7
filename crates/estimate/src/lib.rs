//! Fuel estimation façade crate: profile generation, phase labeling, fuel integration
//! and takeoff-mass estimation over the performance-model gateway.

pub mod pipeline;

pub use facade::*;
pub use fuel_gateway as gateway;
pub use fuel_profile as profile;

mod facade;
