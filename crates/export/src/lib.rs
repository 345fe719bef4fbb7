//! Export helpers for CSV fuel tables and JSON convergence sidecars.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Errors raised while writing or reading exported artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

pub mod table {
    //! Fuel-versus-distance tables, one row per cruise range.

    use std::io::{Read, Write};
    use std::path::Path;

    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Serialize};

    use super::{ExportError, writer_for_path};

    /// Trip table row.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct TripFuelRecord {
        pub flight_id: usize,
        pub distance_m: f64,
        pub fuel_kg: f64,
    }

    /// Mass-aware table row.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct MassAwareFuelRecord {
        pub flight_id: usize,
        pub distance_m: f64,
        pub fuel_kg: f64,
        pub final_mass_kg: f64,
    }

    /// Full sweep row including the solved takeoff weight.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct SweepRecord {
        pub flight_id: usize,
        pub cruise_range_km: Option<f64>,
        pub distance_m: f64,
        pub fuel_kg: f64,
        pub final_mass_kg: f64,
        pub takeoff_mass_kg: f64,
        pub iterations: usize,
    }

    impl From<SweepRecord> for MassAwareFuelRecord {
        fn from(row: SweepRecord) -> Self {
            Self {
                flight_id: row.flight_id,
                distance_m: row.distance_m,
                fuel_kg: row.fuel_kg,
                final_mass_kg: row.final_mass_kg,
            }
        }
    }

    impl From<SweepRecord> for TripFuelRecord {
        fn from(row: SweepRecord) -> Self {
            Self {
                flight_id: row.flight_id,
                distance_m: row.distance_m,
                fuel_kg: row.fuel_kg,
            }
        }
    }

    /// Serialize rows with a header line.
    pub fn write_records<R: Serialize>(
        writer: impl Write,
        rows: impl IntoIterator<Item = R>,
    ) -> Result<(), ExportError> {
        let mut csv = csv::Writer::from_writer(writer);
        for row in rows {
            csv.serialize(row)?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Write rows to `path` (`-` for stdout).
    pub fn write_records_to_path<R: Serialize>(
        path: &Path,
        rows: impl IntoIterator<Item = R>,
    ) -> Result<(), ExportError> {
        write_records(writer_for_path(path)?, rows)
    }

    /// Read back a table written by [`write_records`].
    pub fn read_records<R: DeserializeOwned>(reader: impl Read) -> Result<Vec<R>, ExportError> {
        let mut csv = csv::Reader::from_reader(reader);
        let mut rows = Vec::new();
        for row in csv.deserialize() {
            rows.push(row?);
        }
        Ok(rows)
    }

    pub fn read_records_from_path<R: DeserializeOwned>(path: &Path) -> Result<Vec<R>, ExportError> {
        read_records(std::fs::File::open(path)?)
    }
}

pub mod trace {
    //! Per-sample profile dumps and solver convergence sidecars.

    use std::fs::{self, File};
    use std::io::Write;
    use std::path::{Path, PathBuf};

    use chrono::{DateTime, Utc};
    use fuel_profile::FlightProfile;
    use serde::Serialize;
    use serde_json::to_writer_pretty;

    use super::ExportError;

    /// One sample of a fuel-integrated profile, flattened for CSV.
    #[derive(Debug, Clone, Serialize)]
    struct SampleRecord<'a> {
        flight_id: usize,
        t: f64,
        h: f64,
        s: f64,
        v: f64,
        vs: f64,
        fp: &'a str,
        thrust: Option<f64>,
        fuel_flow: Option<f64>,
        fc: f64,
        m: Option<f64>,
    }

    /// Write every sample of `profiles`, one CSV row each.
    pub fn write_samples<'p>(
        writer: impl Write,
        profiles: impl IntoIterator<Item = &'p FlightProfile>,
    ) -> Result<(), ExportError> {
        let mut csv = csv::Writer::from_writer(writer);
        for profile in profiles {
            for sample in profile.samples() {
                csv.serialize(SampleRecord {
                    flight_id: profile.id(),
                    t: sample.t,
                    h: sample.h,
                    s: sample.s,
                    v: sample.v,
                    vs: sample.vs,
                    fp: sample.phase.map_or("", |phase| phase.as_str()),
                    thrust: sample.thrust,
                    fuel_flow: sample.fuel_flow,
                    fc: sample.fuel_consumed,
                    m: sample.mass,
                })?;
            }
        }
        csv.flush()?;
        Ok(())
    }

    /// Metadata stored alongside a convergence trace.
    #[derive(Debug, Clone)]
    pub struct Metadata<'a> {
        pub aircraft: &'a str,
        pub engine: &'a str,
    }

    #[derive(Serialize)]
    struct TraceSidecar<'a, I: Serialize> {
        aircraft: &'a str,
        engine: &'a str,
        generated_at: DateTime<Utc>,
        flights: &'a [FlightTrace<I>],
    }

    /// Solver iterations of one flight.
    #[derive(Debug, Clone, Serialize)]
    pub struct FlightTrace<I: Serialize> {
        pub flight_id: usize,
        pub takeoff_mass_kg: f64,
        pub iterations: Vec<I>,
    }

    /// Path of the sidecar accompanying `output`: `<stem>_convergence.json` next to it.
    pub fn sidecar_path(output: &Path) -> PathBuf {
        let parent = output.parent().unwrap_or_else(|| Path::new("."));
        let stem = output
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| *s != "-")
            .unwrap_or("fuel");
        parent.join(format!("{stem}_convergence.json"))
    }

    /// Write the pretty-printed convergence sidecar for `output` and return its path.
    pub fn write_convergence_sidecar<I: Serialize>(
        output: &Path,
        meta: &Metadata<'_>,
        flights: &[FlightTrace<I>],
    ) -> Result<PathBuf, ExportError> {
        let path = sidecar_path(output);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let sidecar = TraceSidecar {
            aircraft: meta.aircraft,
            engine: meta.engine,
            generated_at: Utc::now(),
            flights,
        };
        to_writer_pretty(File::create(&path)?, &sidecar)?;
        Ok(path)
    }
}
