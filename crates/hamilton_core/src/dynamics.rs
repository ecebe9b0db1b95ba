//! Hamilton's equations as vector fields.
//!
//! `HamiltonianFlow` is the ordinary time flow, on plain states and on
//! action-augmented states (where J accumulates the loop integral of p dq).
//! `DirectionalFlow` is the same flow re-parametrized by the distance
//! travelled along a fixed direction; it is only used to land on a surface.

use crate::state::{State2, State2Action, State2Extended};
use crate::traits::{DynamicalSystem, Hamiltonian};

/// (dq/dt, dp/dt) = (dH/dp, -dH/dq)
pub fn canonical_field<H: Hamiltonian + ?Sized>(hamiltonian: &H, s: &State2) -> State2 {
    let dh = hamiltonian.derivative(s);
    State2::new(dh.p(), -dh.q())
}

/// Canonical field with dJ/dt = p dq/dt appended.
pub fn action_field<H: Hamiltonian + ?Sized>(hamiltonian: &H, s: &State2Action) -> State2Action {
    let v = canonical_field(hamiltonian, &s.position());
    State2Action::new(v.q(), v.p(), s.p() * v.q())
}

/// Derivatives of (q, p, J, t) with respect to the projection `s . direction`.
///
/// Every component, the constant dt/dt = 1 included, is divided by the flow's
/// speed along `direction`. Integrating this field by `delta` moves the state
/// until its projection on `direction` has changed by exactly `delta`.
///
/// `direction` must not be perpendicular to the flow at `s`; this is not
/// checked and the result is non-finite when it is.
pub fn direction_normalized_field<H: Hamiltonian + ?Sized>(
    hamiltonian: &H,
    direction: &State2,
    s: &State2Action,
) -> State2Extended {
    let v = action_field(hamiltonian, s);
    let along_direction = v.position().dot(direction);
    State2Extended::from(v).with_time(1.0) / along_direction
}

/// Speed of the canonical flow along `direction`.
pub fn speed_along<H: Hamiltonian + ?Sized>(
    hamiltonian: &H,
    direction: &State2,
    s: &State2,
) -> f64 {
    canonical_field(hamiltonian, s).dot(direction)
}

/// Time flow of a Hamiltonian; owns the Hamiltonian so it can outlive the caller's borrow.
#[derive(Debug, Clone, Copy)]
pub struct HamiltonianFlow<H> {
    hamiltonian: H,
}

impl<H: Hamiltonian> HamiltonianFlow<H> {
    pub fn new(hamiltonian: H) -> Self {
        Self { hamiltonian }
    }

    pub fn hamiltonian(&self) -> &H {
        &self.hamiltonian
    }
}

impl<H: Hamiltonian> DynamicalSystem<State2> for HamiltonianFlow<H> {
    fn apply(&self, _t: f64, x: &State2) -> State2 {
        canonical_field(&self.hamiltonian, x)
    }
}

impl<H: Hamiltonian> DynamicalSystem<State2Action> for HamiltonianFlow<H> {
    fn apply(&self, _t: f64, x: &State2Action) -> State2Action {
        action_field(&self.hamiltonian, x)
    }
}

/// Flow parametrized by distance along `direction`, on extended states.
#[derive(Debug, Clone, Copy)]
pub struct DirectionalFlow<H> {
    hamiltonian: H,
    direction: State2,
}

impl<H: Hamiltonian> DirectionalFlow<H> {
    pub fn new(hamiltonian: H, direction: State2) -> Self {
        Self {
            hamiltonian,
            direction,
        }
    }

    pub fn direction(&self) -> State2 {
        self.direction
    }
}

impl<H: Hamiltonian> DynamicalSystem<State2Extended> for DirectionalFlow<H> {
    fn apply(&self, _t: f64, x: &State2Extended) -> State2Extended {
        direction_normalized_field(&self.hamiltonian, &self.direction, &State2Action::from(*x))
    }
}

#[cfg(test)]
mod tests {
    use super::{action_field, canonical_field, direction_normalized_field, DirectionalFlow};
    use crate::hamiltonian::{FreeParticle, HarmonicOscillator, PendulumHamiltonian};
    use crate::state::{State2, State2Action, State2Extended};
    use crate::traits::DynamicalSystem;
    use approx::assert_abs_diff_eq;

    #[test]
    fn canonical_field_follows_hamilton_equations() {
        let v = canonical_field(&HarmonicOscillator, &State2::new(1.0, 2.0));
        assert_eq!(v, State2::new(2.0, -1.0));

        let pendulum = PendulumHamiltonian::new(2.0, 3.0);
        let v = canonical_field(&pendulum, &State2::new(0.5, 1.5));
        assert_abs_diff_eq!(v.q(), 4.5, epsilon = 1e-15);
        assert_abs_diff_eq!(v.p(), -2.0 * 0.5f64.sin(), epsilon = 1e-15);
    }

    #[test]
    fn action_rate_is_p_times_qdot() {
        let v = action_field(&FreeParticle, &State2Action::new(0.0, 0.5, 7.0));
        assert_eq!(v, State2Action::new(0.5, 0.0, 0.25));
    }

    #[test]
    fn normalized_field_has_unit_rate_along_direction() {
        let direction = State2::new(1.0, -1.0);
        let s = State2Action::new(0.3, 0.8, 0.0);
        let d = direction_normalized_field(&HarmonicOscillator, &direction, &s);
        assert_abs_diff_eq!(d.position().dot(&direction), 1.0, epsilon = 1e-15);

        // dt/ds is the reciprocal of the speed along the direction.
        let speed = canonical_field(&HarmonicOscillator, &s.position()).dot(&direction);
        assert_abs_diff_eq!(d.time(), 1.0 / speed, epsilon = 1e-15);
    }

    #[test]
    fn perpendicular_direction_is_not_checked() {
        let flow = DirectionalFlow::new(FreeParticle, State2::new(0.0, 1.0));
        let d = flow.apply(0.0, &State2Extended::new(0.0, 1.0, 0.0, 0.0));
        assert!(!d.time().is_finite());
    }
}
