use approx::assert_relative_eq;
use fuel_estimator::config::{ConfigError, RunConfig, load_aircraft, load_run_config};
use fuel_estimator::estimate::{EstimateError, FuelEstimator, GeneratorError, MassError, catalog};
use fuel_estimator::gateway::reference::CatalogRegistry;
use fuel_estimator::gateway::{FleetData, GatewayError, ModelRegistry};
use fuel_estimator::types::{Phase, PropulsionType};
use std::fs;

#[test]
fn toml_directory_and_yaml_list_agree() {
    let from_dir = load_aircraft("configs/aircraft").expect("toml catalog");
    let from_yaml = load_aircraft("data/aircraft.yaml").expect("yaml catalog");

    let codes: Vec<_> = from_dir.iter().map(|a| a.code.as_str()).collect();
    assert_eq!(codes, vec!["A320", "AT72", "B738", "E190"], "sorted by file name");

    for yaml in &from_yaml {
        let toml = from_dir
            .iter()
            .find(|a| a.code == yaml.code)
            .expect("record in both catalogs");
        assert_eq!(toml.oew_kg, yaml.oew_kg);
        assert_eq!(toml.mtow_kg, yaml.mtow_kg);
        assert_eq!(toml.engine.propulsion, yaml.engine.propulsion);
    }
}

#[test]
fn single_toml_file_loads_one_record() {
    let records = load_aircraft("configs/aircraft/at72.toml").expect("single record");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].engine.propulsion, PropulsionType::Turboprop);
    assert!(records[0].fleet.is_some());
}

#[test]
fn inverted_masses_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bad.toml");
    let contents = fs::read_to_string("configs/aircraft/a320.toml")
        .expect("a320")
        .replace("mtow_kg = 78000.0", "mtow_kg = 40000.0");
    fs::write(&path, contents).expect("write");

    let err = load_aircraft(&path).expect_err("mtow below oew");
    assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("MTOW")));
}

#[test]
fn non_positive_kinematics_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let a320 = fs::read_to_string("configs/aircraft/a320.toml").expect("a320");
    let cases = [
        ("climb_rate_fpm = 2200.0", "climb_rate_fpm = 0.0", "climb_rate_fpm"),
        ("cruise_mach = 0.78", "cruise_mach = 0.0", "cruise_mach"),
        ("count = 2", "count = 0", "engine count"),
    ];
    for (from, to, field) in cases {
        let path = dir.path().join("bad.toml");
        fs::write(&path, a320.replace(from, to)).expect("write");
        let err = load_aircraft(&path).expect_err(field);
        assert!(
            matches!(err, ConfigError::Invalid(ref msg) if msg.contains(field)),
            "{field}: {err}"
        );
    }
}

#[test]
fn degenerate_kinematics_fail_without_panicking() {
    let mut records = load_aircraft("configs/aircraft/a320.toml").expect("a320");
    records[0].trajectory.climb_rate_fpm = 0.0;
    let registry = CatalogRegistry::new(records);

    let err = FuelEstimator::new(&registry, &registry, RunConfig::new("A320"))
        .expect_err("infinite climb");
    assert!(matches!(
        err,
        EstimateError::Mass(MassError::Generator(GeneratorError::Gateway(
            GatewayError::InvalidRequest(_)
        )))
    ));

    let mut records = load_aircraft("configs/aircraft/a320.toml").expect("a320");
    records[0].cruise_mach = 0.0;
    let registry = CatalogRegistry::new(records);
    assert!(FuelEstimator::new(&registry, &registry, RunConfig::new("A320")).is_err());
}

#[test]
fn run_config_fills_defaults() {
    let run = load_run_config("configs/run.toml").expect("run config");
    assert_eq!(run.aircraft, "A320");
    assert_eq!(run.range_step_km, 100);
    assert_eq!(run.max_iterations, 50);
    assert!(!run.parallel);

    let defaults = RunConfig::new("B738");
    assert_eq!(defaults.time_step_s, 10.0);
    assert!(defaults.randomized);
    assert!(defaults.engine.is_none());

    let mut invalid = RunConfig::new("B738");
    invalid.range_step_km = 0;
    assert!(invalid.validate().is_err());
}

#[test]
fn registry_resolves_default_and_named_engines() {
    let registry = CatalogRegistry::load("configs/aircraft").expect("catalog");

    let default = registry.resolve("a320", None).expect("default engine");
    assert_eq!(default.configuration.aircraft, "A320");
    assert_eq!(default.configuration.engine, "CFM56-5B4");
    assert_eq!(default.configuration.cruise_range_km, (400.0, 4800.0));

    let named = registry.resolve("A320", Some("v2527-a5")).expect("named engine");
    assert_eq!(named.configuration.engine, "V2527-A5");

    assert!(matches!(
        registry.resolve("A388", None),
        Err(GatewayError::UnknownAircraft(ref code)) if code == "A388"
    ));
    assert!(matches!(
        registry.resolve("A320", Some("GE90")),
        Err(GatewayError::UnknownEngine { .. })
    ));

    assert_eq!(registry.avg_num_seats("B738"), Some(176.0));
    assert_eq!(registry.avg_num_seats("E190"), None);
}

#[test]
fn unknown_aircraft_fails_before_any_simulation() {
    let registry = CatalogRegistry::load("configs/aircraft").expect("catalog");
    let err = FuelEstimator::new(&registry, &registry, RunConfig::new("C919"))
        .expect_err("unknown aircraft");
    assert!(err.is_configuration());
    assert!(matches!(err, EstimateError::Gateway(GatewayError::UnknownAircraft(_))));
}

#[test]
fn catalog_listing_includes_seats() {
    let registry = CatalogRegistry::load("configs/aircraft").expect("catalog");
    let entries = catalog::entries(&registry);
    let e190 = entries.iter().find(|e| e.code == "E190").expect("E190");
    assert_eq!(e190.avg_seats, None);
    let a320 = entries.iter().find(|e| e.code == "A320").expect("A320");
    assert_eq!(a320.engines, vec!["CFM56-5B4", "V2527-A5"]);
}

#[test]
fn reference_model_sweep_is_plausible() {
    let registry = CatalogRegistry::load("configs/aircraft").expect("catalog");
    let mut run = RunConfig::new("A320");
    run.randomized = false;
    run.range_step_km = 1000;
    let estimator = FuelEstimator::new(&registry, &registry, run).expect("estimator");

    let report = estimator.run().expect("sweep");
    assert!(report.skipped.is_empty(), "skipped: {:?}", report.skipped);
    let rows = report.rows();
    assert_eq!(rows.len(), 5, "400..4800 km by 1000 km");

    for pair in rows.windows(2) {
        assert!(pair[0].flight_id < pair[1].flight_id);
        assert!(pair[1].fuel_kg > pair[0].fuel_kg, "longer flights burn more");
        assert!(pair[1].takeoff_mass_kg > pair[0].takeoff_mass_kg);
    }
    for row in &rows {
        assert!(row.takeoff_mass_kg > 42_600.0 + 12_285.0);
        assert_relative_eq!(
            row.final_mass_kg,
            row.takeoff_mass_kg - row.fuel_kg,
            epsilon = 1e-6
        );
    }

    let profile = report.estimates[0].profile.as_ref().expect("full trace");
    assert_eq!(profile.samples()[0].phase, Some(Phase::To));
    assert!(profile.phases().contains(&Some(Phase::Cr)));
}

#[test]
fn randomized_trajectories_are_reproducible() {
    let registry = CatalogRegistry::load("configs/aircraft").expect("catalog");
    let mut run = RunConfig::new("A320");
    run.range_step_km = 2000;
    run.last_point_only = true;
    let estimator = FuelEstimator::new(&registry, &registry, run).expect("estimator");

    let first = estimator.run().expect("sweep").rows();
    let second = estimator.run().expect("sweep").rows();
    assert_eq!(first, second);
}
