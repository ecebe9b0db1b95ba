//! Landing a sample exactly on a surface.
//!
//! Instead of root-finding in time, the flow is re-parametrized by the
//! distance travelled along the surface direction (see
//! [`crate::dynamics::DirectionalFlow`]). One Runge-Kutta step of length
//! `-distance` in that parameter then moves a sample just past the surface
//! back onto it, carrying time and action along the true trajectory.

use crate::dynamics::{speed_along, DirectionalFlow};
use crate::error::OrbitError;
use crate::solvers::CashKarp54;
use crate::state::{State2, State2Action, State2Extended};
use crate::traits::{Hamiltonian, PhaseVector, Steppable};

/// Steps `s` (sampled at time `t`, `distance` past the surface) back onto the surface.
///
/// Fails with [`OrbitError::SingularDirection`] when `direction` is
/// perpendicular to the flow at the sample, or the step produced a
/// non-finite state.
pub fn step_back<H: Hamiltonian + ?Sized>(
    hamiltonian: &H,
    direction: &State2,
    s: &State2Action,
    t: f64,
    distance: f64,
) -> Result<State2Extended, OrbitError> {
    let speed = speed_along(hamiltonian, direction, &s.position());
    if speed == 0.0 || !speed.is_finite() {
        return Err(OrbitError::SingularDirection { time: t });
    }

    let flow = DirectionalFlow::new(hamiltonian, *direction);
    let mut state_extended = State2Extended::from(*s).with_time(t);
    let mut parameter = t;
    CashKarp54::new().step(&flow, &mut parameter, &mut state_extended, -distance);

    if !state_extended.is_finite() {
        return Err(OrbitError::SingularDirection { time: t });
    }
    Ok(state_extended)
}
