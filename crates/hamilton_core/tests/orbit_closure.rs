//! End-to-end orbit closure and action-angle tests
//!
//! Each test integrates a full orbit and compares the result against a
//! closed-form answer (harmonic oscillator, free particle, pendulum) or
//! against energy conservation where no closed form exists (Duffing).

use anyhow::Result;
use approx::{assert_abs_diff_eq, assert_relative_eq};
use hamilton_core::integration::StateNear;
use hamilton_core::scan::scan_closed_orbits;
use hamilton_core::{
    calculate_action_angle_on_closed_orbit, calculate_action_angle_on_periodic_orbit,
    calculate_first_crossing, come_back_home, DuffingHamiltonian, FreeParticle, Hamiltonian,
    HarmonicOscillator, IntegrationOptions, Line, OrbitError, PendulumHamiltonian, State2,
    Surface, TimeInterval,
};
use std::f64::consts::{PI, TAU};

fn options() -> IntegrationOptions {
    let mut options = IntegrationOptions::default();
    options
        .set_abs_err(1e-12)
        .set_rel_err(1e-12)
        .set_distance_threshold(1e-8);
    options
}

#[test]
fn harmonic_oscillator_returns_home_after_one_period() -> Result<()> {
    let start = State2::new(1.0, 1.0);
    let options = options();
    let home = come_back_home(&HarmonicOscillator, &start, &TimeInterval::new(0.0, 10.0), &options)?;

    assert_abs_diff_eq!(home.time(), TAU, epsilon = 1e-9);
    assert!(StateNear::new(options.distance_threshold).are_near(&start, &home.position()));
    Ok(())
}

#[test]
fn shifted_interval_measures_period_from_its_start() -> Result<()> {
    let home = come_back_home(
        &HarmonicOscillator,
        &State2::new(1.0, 1.0),
        &TimeInterval::new(5.0, 15.0),
        &options(),
    )?;
    assert_abs_diff_eq!(home.time(), 5.0 + TAU, epsilon = 1e-9);
    Ok(())
}

#[test]
fn free_particle_first_crossing_of_vertical_line() -> Result<()> {
    let line = Line::new(&State2::new(1.0, 0.0), State2::new(1.0, 0.0))?;
    let crossing = calculate_first_crossing(
        &FreeParticle,
        &State2::new(0.0, 0.5),
        &line,
        &TimeInterval::new(0.0, 100.0),
        &options(),
    )?;

    assert_abs_diff_eq!(line.distance(&crossing.position()), 0.0, epsilon = 1e-14);
    assert_abs_diff_eq!(crossing.time(), 2.0, epsilon = 1e-10);
    Ok(())
}

#[test]
fn too_short_interval_does_not_return() {
    let err = come_back_home(
        &HarmonicOscillator,
        &State2::new(1.0, 1.0),
        &TimeInterval::new(0.0, 3.0),
        &options(),
    )
    .expect_err("half a period is not enough");
    assert!(matches!(err, OrbitError::OrbitDidNotReturn { .. }));
}

#[test]
fn equilibrium_start_is_degenerate() {
    let err = come_back_home(
        &PendulumHamiltonian::new(1.0, 1.0),
        &State2::new(0.0, 0.0),
        &TimeInterval::new(0.0, 10.0),
        &options(),
    )
    .expect_err("no flow at the bottom of the well");
    assert_eq!(err, OrbitError::DegenerateSurface);
}

#[test]
fn librating_pendulum_matches_analytical_action() -> Result<()> {
    let pendulum = PendulumHamiltonian::new(1.0, 1.0);
    let start = State2::new(0.1, 0.0);
    let orbit = calculate_action_angle_on_closed_orbit(
        &pendulum,
        &start,
        &TimeInterval::new(0.0, 20.0),
        &options(),
        64,
    )?;

    assert_relative_eq!(orbit.action(), pendulum.analytical_action_at(&start), max_relative = 1e-6);
    // Small oscillations are nearly harmonic.
    assert_relative_eq!(orbit.omega(), 1.0, max_relative = 1e-3);
    assert_eq!(orbit.theta().len(), 64);
    assert_eq!(orbit.positions().len(), 64);
    assert_eq!(orbit.positions()[0], start);
    Ok(())
}

#[test]
fn rotating_pendulum_matches_analytical_action() -> Result<()> {
    let pendulum = PendulumHamiltonian::new(1.0, 1.0);
    let start = State2::new(0.0, 3.0);
    let orbit = calculate_action_angle_on_periodic_orbit(
        &pendulum,
        &start,
        &TimeInterval::new(0.0, 20.0),
        &options(),
        16,
    )?;

    assert_relative_eq!(orbit.action(), pendulum.analytical_action_at(&start), max_relative = 1e-6);
    // The angle of a rotation advances monotonically with q.
    assert!(orbit.positions().windows(2).all(|w| w[1].q() > w[0].q()));
    assert!(orbit.positions().iter().all(|s| s.q() < 2.0 * PI));
    Ok(())
}

#[test]
fn duffing_orbit_conserves_energy_on_return() -> Result<()> {
    let duffing = DuffingHamiltonian::default();
    let start = State2::new(1.0, 0.0);
    let home = come_back_home(&duffing, &start, &TimeInterval::new(0.0, 100.0), &options())?;

    assert!(home.time() > 20.0 && home.time() < 30.0);
    assert_abs_diff_eq!(duffing.value(&home.position()), duffing.value(&start), epsilon = 1e-9);
    Ok(())
}

#[test]
fn scan_marks_failed_orbits_with_nan() -> Result<()> {
    let pendulum = PendulumHamiltonian::new(1.0, 1.0);
    let starts: Vec<State2> = [0.0, 0.1, 0.5].iter().map(|&q| State2::new(q, 0.0)).collect();
    let summaries = scan_closed_orbits(&pendulum, &starts, &TimeInterval::new(0.0, 20.0), &options())?;

    assert!(summaries[0].action.is_nan());
    for summary in &summaries[1..] {
        assert_relative_eq!(
            summary.action,
            pendulum.analytical_action(summary.energy),
            max_relative = 1e-6
        );
    }
    // Larger swings are slower.
    assert!(summaries[2].omega < summaries[1].omega);
    Ok(())
}
