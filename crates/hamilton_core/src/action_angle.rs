use crate::error::OrbitError;
use crate::integration::{
    come_back_home_closed_orbit, come_back_home_periodic_orbit, make_interval_samples,
    IntegrationOptions, TimeInterval,
};
use crate::state::{State2, State2Extended};
use crate::traits::Hamiltonian;
use crate::util::linspace_half_open;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use tracing::debug;

pub const DEFAULT_NUMBER_OF_ANGLES: usize = 100;

/// Positions along one period, paired with the angle at which they are reached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnglesPositions {
    pub theta: Vec<f64>,
    pub positions: Vec<State2>,
}

/// Action, frequency and the angle parametrization of one periodic orbit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionAngleOrbit {
    action_two_pi: f64,
    omega: f64,
    theta: Vec<f64>,
    positions: Vec<State2>,
}

impl ActionAngleOrbit {
    pub fn new(action_two_pi: f64, omega: f64, angles: AnglesPositions) -> Self {
        Self {
            action_two_pi,
            omega,
            theta: angles.theta,
            positions: angles.positions,
        }
    }

    /// Loop integral of p dq over one period.
    pub fn action_two_pi(&self) -> f64 {
        self.action_two_pi
    }

    /// The action variable, `action_two_pi / 2 pi`.
    pub fn action(&self) -> f64 {
        self.action_two_pi / TAU
    }

    pub fn omega(&self) -> f64 {
        self.omega
    }

    pub fn period(&self) -> f64 {
        TAU / self.omega
    }

    pub fn theta(&self) -> &[f64] {
        &self.theta
    }

    pub fn positions(&self) -> &[State2] {
        &self.positions
    }
}

/// Samples `number_of_angles` positions evenly in time over one `period`,
/// starting at `interval.t_begin()`. Position i is reached at angle
/// `2 pi i / number_of_angles`; the end point of the period is not included.
pub fn map_positions_to_angles_along_orbit<H: Hamiltonian + Clone>(
    hamiltonian: &H,
    s_start: &State2,
    interval: &TimeInterval,
    period: f64,
    options: &IntegrationOptions,
    number_of_angles: usize,
) -> Result<AnglesPositions, OrbitError> {
    if !(period.is_finite() && period > 0.0) {
        return Err(OrbitError::InvalidSettings(format!(
            "period must be positive and finite, got {period}"
        )));
    }

    let t_begin = interval.t_begin();
    let times = linspace_half_open(t_begin, t_begin + period, number_of_angles);
    let positions = make_interval_samples(hamiltonian, s_start, times, interval, options)?
        .map(|sample| sample.map(|s| s.state))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AnglesPositions {
        theta: linspace_half_open(0.0, TAU, number_of_angles),
        positions,
    })
}

fn action_angle_from_return<H: Hamiltonian + Clone>(
    hamiltonian: &H,
    s_start: &State2,
    s_back: &State2Extended,
    interval: &TimeInterval,
    options: &IntegrationOptions,
    number_of_angles: usize,
) -> Result<ActionAngleOrbit, OrbitError> {
    let period = s_back.time() - interval.t_begin();
    let omega = TAU / period;
    let angles = map_positions_to_angles_along_orbit(
        hamiltonian,
        s_start,
        interval,
        period,
        options,
        number_of_angles,
    )?;

    debug!(action = s_back.action(), omega, "action-angle variables computed");
    Ok(ActionAngleOrbit::new(s_back.action(), omega, angles))
}

fn require_angles(number_of_angles: usize) -> Result<(), OrbitError> {
    if number_of_angles == 0 {
        return Err(OrbitError::InvalidSettings(
            "number_of_angles must be at least 1".into(),
        ));
    }
    Ok(())
}

/// Action-angle variables of the orbit through `s_start`, which must close
/// on itself in the (q, p) plane within `interval`.
pub fn calculate_action_angle_on_closed_orbit<H: Hamiltonian + Clone>(
    hamiltonian: &H,
    s_start: &State2,
    interval: &TimeInterval,
    options: &IntegrationOptions,
    number_of_angles: usize,
) -> Result<ActionAngleOrbit, OrbitError> {
    require_angles(number_of_angles)?;
    let s_back = come_back_home_closed_orbit(hamiltonian, s_start, interval, options)?;
    action_angle_from_return(hamiltonian, s_start, &s_back, interval, options, number_of_angles)
}

/// Action-angle variables of the rotating orbit through `s_start`, where q
/// is an angle and the orbit returns to `q + 2 pi` with the same p.
pub fn calculate_action_angle_on_periodic_orbit<H: Hamiltonian + Clone>(
    hamiltonian: &H,
    s_start: &State2,
    interval: &TimeInterval,
    options: &IntegrationOptions,
    number_of_angles: usize,
) -> Result<ActionAngleOrbit, OrbitError> {
    require_angles(number_of_angles)?;
    let s_back = come_back_home_periodic_orbit(hamiltonian, s_start, interval, options)?;
    action_angle_from_return(hamiltonian, s_start, &s_back, interval, options, number_of_angles)
}
