//! Core units, constants, and shared primitives for the fuel estimator workspace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod atmosphere;

/// Physical constants expressed in SI units (unless stated otherwise).
pub mod constants {
    /// Standard gravity at Earth's surface (m/s²).
    pub const G0: f64 = 9.80665;
    /// Metres per foot.
    pub const FT: f64 = 0.3048;
    /// Metres per second per knot.
    pub const KTS: f64 = 0.514_444;
    /// Metres per second per foot-per-minute.
    pub const FPM: f64 = 0.00508;
}

/// Conversions between SI and the aviation units used by performance models.
pub mod units {
    use super::constants::{FPM, FT, KTS};

    #[inline]
    pub fn km_to_m(v: f64) -> f64 {
        v * 1_000.0
    }

    #[inline]
    pub fn m_to_km(v: f64) -> f64 {
        v / 1_000.0
    }

    /// Convert metres to feet.
    #[inline]
    pub fn m_to_ft(v: f64) -> f64 {
        v / FT
    }

    /// Convert feet to metres.
    #[inline]
    pub fn ft_to_m(v: f64) -> f64 {
        v * FT
    }

    /// Convert metres per second to knots.
    #[inline]
    pub fn ms_to_kts(v: f64) -> f64 {
        v / KTS
    }

    /// Convert knots to metres per second.
    #[inline]
    pub fn kts_to_ms(v: f64) -> f64 {
        v * KTS
    }

    /// Convert metres per second to feet per minute.
    #[inline]
    pub fn ms_to_fpm(v: f64) -> f64 {
        v / FPM
    }

    /// Convert feet per minute to metres per second.
    #[inline]
    pub fn fpm_to_ms(v: f64) -> f64 {
        v * FPM
    }
}

/// Categorical flight phase attached to each trajectory sample.
///
/// `Gnd`, `Cl`, `Cr`, `De` and `Na` come from the external phase classifier;
/// `To` is only ever produced by the takeoff boundary correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "GND")]
    Gnd,
    #[serde(rename = "TO")]
    To,
    #[serde(rename = "CL")]
    Cl,
    #[serde(rename = "CR")]
    Cr,
    #[serde(rename = "DE")]
    De,
    #[serde(rename = "NA")]
    Na,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Gnd => "GND",
            Phase::To => "TO",
            Phase::Cl => "CL",
            Phase::Cr => "CR",
            Phase::De => "DE",
            Phase::Na => "NA",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown flight phase label `{0}`")]
pub struct UnknownPhase(pub String);

impl FromStr for Phase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GND" => Ok(Phase::Gnd),
            "TO" => Ok(Phase::To),
            "CL" => Ok(Phase::Cl),
            "CR" => Ok(Phase::Cr),
            "DE" => Ok(Phase::De),
            "NA" => Ok(Phase::Na),
            _ => Err(UnknownPhase(s.to_string())),
        }
    }
}

/// Engine family of an aircraft; drives regulatory reserve durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropulsionType {
    Turbofan,
    Turboprop,
    Piston,
}

impl PropulsionType {
    /// Holding duration used for the final-reserve cruise (seconds).
    ///
    /// 45 minutes for turboprops, 30 minutes for turbofan and piston aircraft.
    pub fn reserve_duration_s(self) -> f64 {
        match self {
            PropulsionType::Turboprop => 45.0 * 60.0,
            PropulsionType::Turbofan | PropulsionType::Piston => 30.0 * 60.0,
        }
    }
}

/// One kinematic sample as produced by a trajectory generator, in SI units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Seconds since the start of the flight.
    pub t: f64,
    /// Altitude (m).
    pub h: f64,
    /// Horizontal distance flown (m).
    pub s: f64,
    /// True airspeed (m/s).
    pub v: f64,
    /// Vertical rate (m/s).
    pub vs: f64,
}
