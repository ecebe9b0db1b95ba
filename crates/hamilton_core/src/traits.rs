use crate::state::State2;
use num_traits::{Float, FloatConst, FromPrimitive};
use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A trait for types that can be used as scalars in the numeric helpers.
/// Must support basic arithmetic, debug printing, conversion from f64 and pi.
pub trait Scalar: Float + FloatConst + FromPrimitive + Debug + 'static {}

impl<T: Float + FloatConst + FromPrimitive + Debug + 'static> Scalar for T {}

/// A fixed-size phase-space vector the integrators can step.
pub trait PhaseVector:
    Copy
    + Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + Mul<f64, Output = Self>
    + Div<f64, Output = Self>
{
    /// Number of tracked components.
    const DIM: usize;

    fn zeros() -> Self;

    fn components(&self) -> &[f64];

    fn is_finite(&self) -> bool {
        self.components().iter().all(|c| c.is_finite())
    }
}

/// A Hamiltonian on the (q, p) plane.
///
/// Only the energy and its gradient are needed; the gradient is returned as a
/// plain state holding (dH/dq, dH/dp).
pub trait Hamiltonian {
    fn value(&self, s: &State2) -> f64;

    fn derivative(&self, s: &State2) -> State2;
}

impl<H: Hamiltonian + ?Sized> Hamiltonian for &H {
    fn value(&self, s: &State2) -> f64 {
        (**self).value(s)
    }

    fn derivative(&self, s: &State2) -> State2 {
        (**self).derivative(s)
    }
}

/// Represents a flow on a phase-space vector type.
pub trait DynamicalSystem<S: PhaseVector> {
    /// Evaluates the vector field.
    /// t: current time (or whatever parameter the flow is written in)
    /// x: current state
    fn apply(&self, t: f64, x: &S) -> S;
}

/// A trait for solvers that can step a system forward.
pub trait Steppable<S: PhaseVector> {
    /// Performs one step of size dt.
    /// t: current time (updated after step)
    /// state: current state (updated after step)
    /// dt: step size, may be negative
    fn step(&mut self, system: &impl DynamicalSystem<S>, t: &mut f64, state: &mut S, dt: f64);
}
