//! International Standard Atmosphere up to the lower stratosphere.

use crate::constants::G0;

const T0_K: f64 = 288.15;
const P0_PA: f64 = 101_325.0;
const R_AIR: f64 = 287.052_87;
const GAMMA: f64 = 1.4;
const LAPSE_RATE_K_M: f64 = -0.0065;
const TROPOPAUSE_M: f64 = 11_000.0;
const T_TROPOPAUSE_K: f64 = 216.65;

/// Sea-level air density (kg/m³).
pub const RHO0_KG_M3: f64 = P0_PA / (R_AIR * T0_K);

/// Static temperature (K) at geopotential altitude `h` (m).
pub fn temperature(h: f64) -> f64 {
    let h = h.max(0.0);
    if h <= TROPOPAUSE_M {
        T0_K + LAPSE_RATE_K_M * h
    } else {
        T_TROPOPAUSE_K
    }
}

/// Static pressure (Pa) at altitude `h` (m).
pub fn pressure(h: f64) -> f64 {
    let h = h.max(0.0);
    let exponent = -G0 / (LAPSE_RATE_K_M * R_AIR);
    if h <= TROPOPAUSE_M {
        P0_PA * (temperature(h) / T0_K).powf(exponent)
    } else {
        let p11 = P0_PA * (T_TROPOPAUSE_K / T0_K).powf(exponent);
        p11 * (-G0 * (h - TROPOPAUSE_M) / (R_AIR * T_TROPOPAUSE_K)).exp()
    }
}

/// Air density (kg/m³) at altitude `h` (m).
pub fn density(h: f64) -> f64 {
    pressure(h) / (R_AIR * temperature(h))
}

/// Speed of sound (m/s) at altitude `h` (m).
pub fn speed_of_sound(h: f64) -> f64 {
    (GAMMA * R_AIR * temperature(h)).sqrt()
}

/// Convert a Mach number to true airspeed (m/s) at altitude `h` (m).
pub fn mach_to_tas(mach: f64, h: f64) -> f64 {
    mach * speed_of_sound(h)
}
