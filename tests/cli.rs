use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::{self, File};
use std::io::Write;

fn fuel() -> Command {
    let mut cmd = Command::cargo_bin("fuel").expect("fuel bin");
    cmd.env("RUST_LOG", "warn");
    cmd
}

#[test]
fn catalog_lists_shipped_aircraft() {
    fuel()
        .arg("catalog")
        .assert()
        .success()
        .stdout(predicate::str::contains("A320"))
        .stdout(predicate::str::contains("AT72"))
        .stdout(predicate::str::contains("PW127M"));
}

#[test]
fn sweep_writes_mass_aware_table_to_stdout() {
    fuel()
        .args([
            "sweep",
            "--aircraft",
            "A320",
            "--range-step",
            "2000",
            "--last-point-only",
            "--deterministic",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "flight_id,distance_m,fuel_kg,final_mass_kg",
        ))
        .stderr(predicate::str::contains("3 flights estimated, 0 skipped"));
}

#[test]
fn sweep_with_trace_writes_sidecar() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("at72.csv");
    let samples = dir.path().join("at72_samples.csv");

    fuel()
        .args([
            "sweep",
            "--aircraft",
            "AT72",
            "--range-step",
            "500",
            "--table",
            "full",
            "--trace",
            "--parallel",
            "--output",
            output.to_str().unwrap(),
            "--samples",
            samples.to_str().unwrap(),
        ])
        .assert()
        .success();

    let table = fs::read_to_string(&output).expect("table");
    assert!(table.starts_with("flight_id,cruise_range_km,"));
    assert_eq!(table.lines().count(), 1 + 3, "150..1400 km by 500 km");
    assert!(dir.path().join("at72_convergence.json").exists());
    assert!(fs::metadata(samples).expect("samples").len() > 0);
}

#[test]
fn solve_prints_takeoff_mass() {
    fuel()
        .args([
            "solve",
            "--aircraft",
            "B738",
            "--range-km",
            "1500",
            "--deterministic",
            "--trace",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Takeoff mass:"))
        .stdout(predicate::str::contains("#1"));
}

#[test]
fn unknown_aircraft_is_rejected() {
    fuel()
        .args(["sweep", "--aircraft", "A388"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown aircraft type `A388`"));
}

#[test]
fn missing_seat_data_is_rejected() {
    fuel()
        .args(["solve", "--aircraft", "E190", "--range-km", "800"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no average seat count"));
}

#[test]
fn fuel_plot_renders_png() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = dir.path().join("a320.csv");
    let png_path = dir.path().join("fuel.png");

    let mut file = File::create(&csv_path).expect("csv create");
    writeln!(file, "flight_id,distance_m,fuel_kg,final_mass_kg").unwrap();
    for i in 0..4 {
        let distance_m = 600_000.0 + i as f64 * 1_000_000.0;
        writeln!(
            file,
            "{i},{distance_m},{:.3},{:.3}",
            2_500.0 + i as f64 * 3_100.0,
            60_000.0 - i as f64 * 1_000.0
        )
        .unwrap();
    }

    Command::cargo_bin("fuel_plot")
        .expect("fuel_plot bin")
        .args([
            "--input",
            csv_path.to_str().unwrap(),
            "--output",
            png_path.to_str().unwrap(),
            "--width",
            "400",
            "--height",
            "300",
        ])
        .assert()
        .success();

    let metadata = fs::metadata(png_path).expect("png metadata");
    assert!(metadata.len() > 0, "PNG output should not be empty");
}
