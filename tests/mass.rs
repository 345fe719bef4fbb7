mod common;

use approx::assert_relative_eq;
use common::{StubModel, StubRegistry};
use fuel_estimator::estimate::{
    EstimateError, MassError, MassSolverConfig, ProfileGenerator, TakeoffMassSolver, payload_mass,
};
use fuel_estimator::types::PropulsionType;
use proptest::prelude::*;

fn solver(registry: &StubRegistry, config: MassSolverConfig) -> TakeoffMassSolver {
    TakeoffMassSolver::new(registry.gateway(), registry, config).expect("solver")
}

#[test]
fn consistent_seed_converges_in_one_iteration() {
    // OEW 42000, MTOW 79000: seed 67900. 150 seats carry 12285 kg, so 13615 kg of fuel
    // closes the loop: 1.05 * 10300 trip + 1800 reserve + 1000 alternate.
    let registry = StubRegistry::new(StubModel::default(), Some(150.0));
    let solver = solver(&registry, MassSolverConfig::default());
    assert_relative_eq!(solver.reference_mass(), 67_900.0, epsilon = 1e-6);
    assert_relative_eq!(solver.payload_mass_kg(), 12_285.0, epsilon = 1e-6);

    let trip = ProfileGenerator::new(registry.gateway())
        .trip(0, 1860.0, 100.0, false)
        .expect("trip");
    let solution = solver.solve(&trip).expect("converged");

    assert_eq!(solution.iterations, 1);
    assert_eq!(solution.trace.len(), 1);
    let record = solution.trace[0];
    assert_relative_eq!(record.f_trip, 10_300.0, epsilon = 1e-6);
    assert_relative_eq!(record.f_cont, 515.0, epsilon = 1e-6);
    assert_relative_eq!(record.f_res, 1_800.0, epsilon = 1e-6);
    assert_relative_eq!(record.f_alt, 1_000.0, epsilon = 1e-6);
    assert_relative_eq!(record.m_fuel, 13_615.0, epsilon = 1e-6);
    assert_relative_eq!(solution.tow, 67_900.0, epsilon = 1e-6);
}

#[test]
fn constant_fuel_settles_on_second_iteration() {
    let registry = StubRegistry::new(StubModel::default(), Some(100.0));
    let solver = solver(&registry, MassSolverConfig::default());
    let trip = ProfileGenerator::new(registry.gateway())
        .trip(0, 1860.0, 100.0, false)
        .expect("trip");

    let solution = solver.solve(&trip).expect("converged");
    assert_eq!(solution.iterations, 2);
    assert_relative_eq!(solution.tow, 42_000.0 + 8_190.0 + 13_615.0, epsilon = 1e-6);
}

#[test]
fn iteration_cap_reports_not_converged() {
    let registry = StubRegistry::new(StubModel::default(), Some(100.0));
    let config = MassSolverConfig {
        max_iterations: 1,
        ..MassSolverConfig::default()
    };
    let solver = solver(&registry, config);
    let trip = ProfileGenerator::new(registry.gateway())
        .trip(0, 1860.0, 100.0, false)
        .expect("trip");

    match solver.solve(&trip) {
        Err(MassError::NotConverged { last_tow, iterations }) => {
            assert_eq!(iterations, 1);
            assert_relative_eq!(last_tow, 63_805.0, epsilon = 1e-6);
        }
        other => panic!("expected NotConverged, got {other:?}"),
    }
}

#[test]
fn missing_seat_count_is_a_configuration_error() {
    let registry = StubRegistry::new(StubModel::default(), None);
    let err = TakeoffMassSolver::new(registry.gateway(), &registry, MassSolverConfig::default())
        .expect_err("no seats");
    assert!(matches!(err, MassError::MissingSeatCount { ref aircraft } if aircraft == "STUB"));

    let err = fuel_estimator::estimate::FuelEstimator::new(&registry, &registry, common::stub_run())
        .expect_err("no seats");
    assert!(err.is_configuration());
    assert!(matches!(err, EstimateError::Mass(MassError::MissingSeatCount { .. })));
}

#[test]
fn unusable_seat_counts_are_never_coerced() {
    for seats in [f64::NAN, 0.0, -20.0, f64::INFINITY] {
        let registry = StubRegistry::new(StubModel::default(), Some(seats));
        let err = TakeoffMassSolver::new(registry.gateway(), &registry, MassSolverConfig::default())
            .expect_err("unusable seat count");
        assert!(
            matches!(err, MassError::MissingSeatCount { .. }),
            "seats {seats}: {err:?}"
        );
    }
}

#[test]
fn overflowing_fuel_burn_is_reported_as_non_finite() {
    let model = StubModel {
        fuel_flow_kg_s: f64::MAX,
        ..StubModel::default()
    };
    let registry = StubRegistry::new(model, Some(150.0));
    let solver = solver(&registry, MassSolverConfig::default());
    let trip = ProfileGenerator::new(registry.gateway())
        .trip(0, 1860.0, 100.0, false)
        .expect("trip");

    assert!(matches!(
        solver.solve(&trip),
        Err(MassError::NonFiniteMass { iteration: 1 })
    ));
}

#[test]
fn non_finite_seed_mass_is_reported() {
    let mut registry = StubRegistry::new(StubModel::default(), Some(150.0));
    registry.configuration = common::configuration(f64::INFINITY, 79_000.0, PropulsionType::Turbofan);
    let solver = solver(&registry, MassSolverConfig::default());
    let trip = ProfileGenerator::new(registry.gateway())
        .trip(0, 1860.0, 100.0, false)
        .expect("trip");

    assert!(matches!(
        solver.solve(&trip),
        Err(MassError::NonFiniteMass { iteration: 1 })
    ));
}

#[test]
fn reserve_and_alternate_are_prepared_once() {
    let mut registry = StubRegistry::new(StubModel::default(), Some(70.0));
    registry.configuration = common::configuration(13_000.0, 23_000.0, PropulsionType::Turboprop);
    let solver = solver(&registry, MassSolverConfig::default());

    assert_eq!(solver.reserve_profile().duration(), 2_700.0);
    assert!(solver.alternate_profile().is_phase_labeled());
    assert_eq!(solver.alternate_profile().cruise_range_km(), Some(0.0));
    // only the alternate diversion goes through the complete-flight generator
    assert_eq!(registry.model.generated(), 1);
}

#[test]
fn payload_follows_load_factor() {
    let config = MassSolverConfig::default();
    assert_relative_eq!(payload_mass(180.0, &config), 0.819 * 180.0 * 100.0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn mass_updates_contract(
        oew in 30_000.0f64..50_000.0,
        margin in 20_000.0f64..40_000.0,
        seats in 50.0f64..200.0,
        flow_per_kg in 5.0e-6f64..2.0e-5,
    ) {
        let mut registry = StubRegistry::new(StubModel::mass_dependent(flow_per_kg), Some(seats));
        registry.configuration = common::configuration(oew, oew + margin, PropulsionType::Turbofan);
        let solver = solver(&registry, MassSolverConfig::default());
        let trip = ProfileGenerator::new(registry.gateway())
            .trip(0, 1800.0, 100.0, false)
            .expect("trip");

        let solution = solver.solve(&trip).expect("converged");
        let deltas: Vec<f64> = solution
            .trace
            .iter()
            .map(|record| (record.new_tow - record.tow).abs())
            .collect();
        for pair in deltas.windows(2).skip(1) {
            prop_assert!(pair[1] <= pair[0] + 1e-9, "deltas grew: {deltas:?}");
        }
        prop_assert!(solution.iterations <= 50);
    }
}
