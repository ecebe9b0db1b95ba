//! Crossing and orbit-closure entry points.
//!
//! Every entry point integrates the action-augmented flow forward from the
//! start point, feeds the samples to a fresh [`CrossingDetector`] and
//! returns the refined crossings as extended states (q, p, J, t).

pub mod options;
pub mod samples;

pub use options::{IntegrationOptions, TimeInterval};
pub use samples::{AdaptiveSamples, Sample, TimedSamples};

use crate::dynamics::{canonical_field, HamiltonianFlow};
use crate::error::OrbitError;
use crate::observer::{observe, observe_first, CrossingDetector};
use crate::state::{State2, State2Action, State2Extended};
use crate::step_back::step_back;
use crate::surface::{Line, PeriodicAngleSurface, Surface};
use crate::traits::Hamiltonian;
use tracing::{debug, warn};

/// Adaptive samples of the action-augmented flow, J starting at zero.
pub fn make_action_samples<H: Hamiltonian + Clone>(
    hamiltonian: &H,
    s_start: &State2,
    interval: &TimeInterval,
    options: &IntegrationOptions,
) -> AdaptiveSamples<State2Action, HamiltonianFlow<H>> {
    AdaptiveSamples::new(
        HamiltonianFlow::new(hamiltonian.clone()),
        State2Action::from(*s_start),
        interval,
        options,
    )
}

/// Plain (q, p) states at each of `times`, integrated from `times[0]`.
pub fn make_interval_samples<H: Hamiltonian + Clone>(
    hamiltonian: &H,
    s_start: &State2,
    times: Vec<f64>,
    interval: &TimeInterval,
    options: &IntegrationOptions,
) -> Result<TimedSamples<State2, HamiltonianFlow<H>>, OrbitError> {
    let t_start = times.first().copied().unwrap_or(interval.t_begin());
    TimedSamples::new(
        HamiltonianFlow::new(hamiltonian.clone()),
        *s_start,
        t_start,
        times,
        options.controlled_stepper(interval),
        options.initial_time_step,
    )
}

/// The line through `s_start` perpendicular to the orbit there.
///
/// Fails with [`OrbitError::DegenerateSurface`] at an equilibrium.
pub fn make_init_cross_line<H: Hamiltonian + ?Sized>(
    hamiltonian: &H,
    s_start: &State2,
) -> Result<Line, OrbitError> {
    Line::new(s_start, canonical_field(hamiltonian, s_start))
}

/// A crossing detector that refines with [`step_back`] along the surface direction.
pub fn make_project_on_surface_detector<H, Sf, P>(
    hamiltonian: H,
    surface: Sf,
    accept: P,
) -> CrossingDetector<
    Sf,
    impl FnMut(&State2Action, f64, f64) -> Result<State2Extended, OrbitError>,
    P,
>
where
    H: Hamiltonian,
    Sf: Surface,
    P: FnMut(&State2Extended) -> bool,
{
    let direction = surface.direction();
    let refine = move |s: &State2Action, t: f64, distance: f64| {
        step_back(&hamiltonian, &direction, s, t, distance)
    };
    CrossingDetector::new(surface, refine, accept)
}

/// Closeness of two (q, p) positions in the Euclidean norm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateNear {
    distance: f64,
}

impl StateNear {
    pub fn new(distance: f64) -> Self {
        Self { distance }
    }

    pub fn are_near(&self, s1: &State2, s2: &State2) -> bool {
        (*s1 - *s2).magnitude() <= self.distance
    }
}

fn validate(interval: &TimeInterval, options: &IntegrationOptions) -> Result<(), OrbitError> {
    options.validate()?;
    interval.validate()
}

/// Every positive-direction crossing of `surface` within `interval`.
pub fn calculate_crossings<H, Sf>(
    hamiltonian: &H,
    s_start: &State2,
    surface: &Sf,
    interval: &TimeInterval,
    options: &IntegrationOptions,
) -> Result<Vec<State2Extended>, OrbitError>
where
    H: Hamiltonian + Clone,
    Sf: Surface + Clone,
{
    validate(interval, options)?;

    let mut detector =
        make_project_on_surface_detector(hamiltonian.clone(), surface.clone(), |_: &State2Extended| true);
    observe(&mut detector, make_action_samples(hamiltonian, s_start, interval, options))?;

    let crossings = detector.into_observations();
    debug!(count = crossings.len(), "crossings collected");
    Ok(crossings)
}

fn first_accepted_crossing<H, Sf, P>(
    hamiltonian: &H,
    s_start: &State2,
    surface: Sf,
    accept: P,
    interval: &TimeInterval,
    options: &IntegrationOptions,
) -> Result<State2Extended, OrbitError>
where
    H: Hamiltonian + Clone,
    Sf: Surface,
    P: FnMut(&State2Extended) -> bool,
{
    let mut detector = make_project_on_surface_detector(hamiltonian.clone(), surface, accept);
    let found = observe_first(&mut detector, make_action_samples(hamiltonian, s_start, interval, options))?;

    match detector.into_observations().into_iter().next() {
        Some(crossing) if found => Ok(crossing),
        _ => {
            warn!(
                start = %s_start,
                t_begin = interval.t_begin(),
                t_end = interval.t_end(),
                "orbit never came back"
            );
            Err(OrbitError::OrbitDidNotReturn {
                t_begin: interval.t_begin(),
                t_end: interval.t_end(),
            })
        }
    }
}

/// The first positive-direction crossing of `surface`.
pub fn calculate_first_crossing<H, Sf>(
    hamiltonian: &H,
    s_start: &State2,
    surface: &Sf,
    interval: &TimeInterval,
    options: &IntegrationOptions,
) -> Result<State2Extended, OrbitError>
where
    H: Hamiltonian + Clone,
    Sf: Surface + Clone,
{
    validate(interval, options)?;
    first_accepted_crossing(
        hamiltonian,
        s_start,
        surface.clone(),
        |_: &State2Extended| true,
        interval,
        options,
    )
}

/// Integrates until the orbit returns to `s_start`.
///
/// The section is the line through `s_start` perpendicular to the flow
/// there; a crossing counts once it lies within
/// `options.distance_threshold` of the start. The returned state carries
/// the return time in `t` and the loop integral of p dq in `J`.
pub fn come_back_home<H: Hamiltonian + Clone>(
    hamiltonian: &H,
    s_start: &State2,
    interval: &TimeInterval,
    options: &IntegrationOptions,
) -> Result<State2Extended, OrbitError> {
    validate(interval, options)?;

    let cross_line = make_init_cross_line(hamiltonian, s_start)?;
    let near = StateNear::new(options.distance_threshold);
    let home = *s_start;
    let s_back = first_accepted_crossing(
        hamiltonian,
        s_start,
        cross_line,
        move |s: &State2Extended| near.are_near(&home, &s.position()),
        interval,
        options,
    )?;

    debug!(start = %s_start, period = s_back.time() - interval.t_begin(), action = s_back.action(), "orbit closed");
    Ok(s_back)
}

/// Same as [`come_back_home`]; the orbit closes on itself in the (q, p) plane.
pub fn come_back_home_closed_orbit<H: Hamiltonian + Clone>(
    hamiltonian: &H,
    s_start: &State2,
    interval: &TimeInterval,
    options: &IntegrationOptions,
) -> Result<State2Extended, OrbitError> {
    come_back_home(hamiltonian, s_start, interval, options)
}

/// Integrates until an angle-like q has advanced one full turn and p has
/// returned to within `options.distance_threshold` of its start value.
///
/// Only orbits along which q increases are detected.
pub fn come_back_home_periodic_orbit<H: Hamiltonian + Clone>(
    hamiltonian: &H,
    s_start: &State2,
    interval: &TimeInterval,
    options: &IntegrationOptions,
) -> Result<State2Extended, OrbitError> {
    validate(interval, options)?;

    let surface = PeriodicAngleSurface::new(s_start);
    let p_home = s_start.p();
    let threshold = options.distance_threshold;
    let s_back = first_accepted_crossing(
        hamiltonian,
        s_start,
        surface,
        move |s: &State2Extended| (s.p() - p_home).abs() <= threshold,
        interval,
        options,
    )?;

    debug!(start = %s_start, period = s_back.time() - interval.t_begin(), action = s_back.action(), "periodic orbit closed");
    Ok(s_back)
}

#[cfg(test)]
mod tests {
    use super::{
        calculate_crossings, calculate_first_crossing, come_back_home, come_back_home_periodic_orbit,
        make_init_cross_line, IntegrationOptions, StateNear, TimeInterval,
    };
    use crate::error::OrbitError;
    use crate::hamiltonian::{FreeParticle, HarmonicOscillator, PendulumHamiltonian};
    use crate::state::State2;
    use crate::surface::{Line, PeriodicAngleSurface, Surface};
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn options() -> IntegrationOptions {
        let mut options = IntegrationOptions::default();
        options
            .set_abs_err(1e-12)
            .set_rel_err(1e-12)
            .set_distance_threshold(1e-8);
        options
    }

    #[test]
    fn state_near_uses_euclidean_distance() {
        let near = StateNear::new(0.5);
        assert!(near.are_near(&State2::new(0.0, 0.0), &State2::new(0.3, 0.4)));
        assert!(!near.are_near(&State2::new(0.0, 0.0), &State2::new(0.3, 0.41)));
    }

    #[test]
    fn equilibrium_has_no_cross_line() {
        assert_eq!(
            make_init_cross_line(&HarmonicOscillator, &State2::new(0.0, 0.0)),
            Err(OrbitError::DegenerateSurface)
        );
    }

    #[test]
    fn harmonic_oscillator_crosses_section_once_per_period() {
        let start = State2::new(1.0, 0.0);
        // Section q = 0 crossed upward, i.e. with dq/dt = p > 0.
        let line = Line::new(&State2::new(0.0, 0.0), State2::new(1.0, 0.0)).unwrap();
        let crossings = calculate_crossings(
            &HarmonicOscillator,
            &start,
            &line,
            &TimeInterval::new(0.0, 4.0 * PI),
            &options(),
        )
        .unwrap();

        assert_eq!(crossings.len(), 2);
        for (k, crossing) in crossings.iter().enumerate() {
            assert_abs_diff_eq!(crossing.q(), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(crossing.p(), 1.0, epsilon = 1e-9);
            assert_abs_diff_eq!(crossing.time(), 1.5 * PI + 2.0 * PI * k as f64, epsilon = 1e-9);
        }
    }

    #[test]
    fn free_particle_reaches_line_at_two() {
        let line = Line::new(&State2::new(1.0, 0.0), State2::new(1.0, 0.0)).unwrap();
        let crossing = calculate_first_crossing(
            &FreeParticle,
            &State2::new(0.0, 0.5),
            &line,
            &TimeInterval::new(0.0, 100.0),
            &IntegrationOptions::default(),
        )
        .unwrap();

        assert_abs_diff_eq!(crossing.q(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(crossing.time(), 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(crossing.action(), 0.5, epsilon = 1e-10);
    }

    #[test]
    fn free_particle_moving_away_never_crosses() {
        let line = Line::new(&State2::new(1.0, 0.0), State2::new(1.0, 0.0)).unwrap();
        let err = calculate_first_crossing(
            &FreeParticle,
            &State2::new(0.0, -0.5),
            &line,
            &TimeInterval::new(0.0, 100.0),
            &options(),
        )
        .expect_err("no crossing ahead");
        assert!(err.to_string().contains("orbit never came back"));
    }

    #[test]
    fn harmonic_oscillator_comes_back_after_two_pi() {
        let start = State2::new(1.0, 1.0);
        let options = options();
        let home = come_back_home(
            &HarmonicOscillator,
            &start,
            &TimeInterval::new(0.0, 10.0),
            &options,
        )
        .unwrap();

        assert_abs_diff_eq!(home.time(), 2.0 * PI, epsilon = 1e-9);
        assert!((home.position() - start).magnitude() <= options.distance_threshold);
        // Loop integral of p dq around a circle of radius sqrt(2).
        assert_abs_diff_eq!(home.action(), 2.0 * PI, epsilon = 1e-9);
    }

    #[test]
    fn short_interval_is_reported_as_not_returning() {
        let err = come_back_home(
            &HarmonicOscillator,
            &State2::new(1.0, 1.0),
            &TimeInterval::new(0.0, 6.0),
            &options(),
        )
        .expect_err("interval shorter than a period");
        assert_eq!(
            err,
            OrbitError::OrbitDidNotReturn {
                t_begin: 0.0,
                t_end: 6.0
            }
        );
    }

    #[test]
    fn invalid_settings_fail_before_integrating() {
        let mut bad = options();
        bad.set_abs_err(-1.0);
        let err = come_back_home(&HarmonicOscillator, &State2::new(1.0, 1.0), &TimeInterval::new(0.0, 10.0), &bad)
            .expect_err("negative tolerance");
        assert!(matches!(err, OrbitError::InvalidSettings(_)));
    }

    #[test]
    fn rotating_pendulum_closes_after_one_turn() {
        let pendulum = PendulumHamiltonian::new(1.0, 1.0);
        let start = State2::new(0.0, 3.0);
        let home = come_back_home_periodic_orbit(
            &pendulum,
            &start,
            &TimeInterval::new(0.0, 20.0),
            &options(),
        )
        .unwrap();

        assert_abs_diff_eq!(home.q(), 2.0 * PI, epsilon = 1e-10);
        assert_abs_diff_eq!(home.p(), 3.0, epsilon = 1e-8);
        let surface = PeriodicAngleSurface::new(&start);
        assert_abs_diff_eq!(surface.distance(&home.position()), 0.0, epsilon = 1e-10);

        let expected = 2.0 * PI * pendulum.analytical_action_at(&start);
        assert_abs_diff_eq!(home.action(), expected, epsilon = 1e-7 * expected);
    }
}
