//! Phase-space vectors.
//!
//! All shapes share one representation, a fixed-size nalgebra vector whose
//! first two slots are (q, p). The augmented shapes append the accumulated
//! action J and, for the extended shape, the elapsed time t. Arithmetic is
//! only defined between states of the same shape; switching shapes goes
//! through [`PhaseState::reshape`] (or the `From` impls built on it), which
//! copies the shared slots and zero-fills the rest.

use crate::traits::PhaseVector;
use nalgebra::SVector;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhaseState<const N: usize> {
    v: SVector<f64, N>,
}

/// (q, p)
pub type State2 = PhaseState<2>;
/// (q, p, J)
pub type State2Action = PhaseState<3>;
/// (q, p, J, t)
pub type State2Extended = PhaseState<4>;

impl<const N: usize> PhaseState<N> {
    pub fn from_array(values: [f64; N]) -> Self {
        Self {
            v: SVector::from(values),
        }
    }

    pub fn zeros() -> Self {
        Self {
            v: SVector::zeros(),
        }
    }

    pub fn q(&self) -> f64 {
        self.v[0]
    }

    pub fn p(&self) -> f64 {
        self.v[1]
    }

    pub fn as_slice(&self) -> &[f64] {
        self.v.as_slice()
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.v.dot(&other.v)
    }

    /// Element-wise quotient.
    pub fn component_div(&self, other: &Self) -> Self {
        Self {
            v: self.v.component_div(&other.v),
        }
    }

    pub fn abs(&self) -> Self {
        Self { v: self.v.abs() }
    }

    pub fn inf_norm(&self) -> f64 {
        self.v.amax()
    }

    pub fn magnitude_squared(&self) -> f64 {
        self.v.norm_squared()
    }

    pub fn magnitude(&self) -> f64 {
        self.v.norm()
    }

    /// Copies the slots both shapes share and zero-fills the rest.
    pub fn reshape<const M: usize>(&self) -> PhaseState<M> {
        let mut v = SVector::<f64, M>::zeros();
        for i in 0..N.min(M) {
            v[i] = self.v[i];
        }
        PhaseState { v }
    }

    /// The (q, p) part of the state.
    pub fn position(&self) -> State2 {
        self.reshape()
    }
}

impl State2 {
    pub fn new(q: f64, p: f64) -> Self {
        Self::from_array([q, p])
    }
}

impl State2Action {
    pub fn new(q: f64, p: f64, action: f64) -> Self {
        Self::from_array([q, p, action])
    }

    pub fn action(&self) -> f64 {
        self.v[2]
    }

    pub fn with_action(mut self, action: f64) -> Self {
        self.v[2] = action;
        self
    }
}

impl State2Extended {
    pub fn new(q: f64, p: f64, action: f64, t: f64) -> Self {
        Self::from_array([q, p, action, t])
    }

    pub fn action(&self) -> f64 {
        self.v[2]
    }

    pub fn time(&self) -> f64 {
        self.v[3]
    }

    pub fn with_time(mut self, t: f64) -> Self {
        self.v[3] = t;
        self
    }
}

macro_rules! impl_reshape_from {
    ($($from:literal => $to:literal),* $(,)?) => {
        $(
            impl From<PhaseState<$from>> for PhaseState<$to> {
                fn from(value: PhaseState<$from>) -> Self {
                    value.reshape()
                }
            }
        )*
    };
}

impl_reshape_from!(2 => 3, 2 => 4, 3 => 2, 3 => 4, 4 => 2, 4 => 3);

impl<const N: usize> Add for PhaseState<N> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { v: self.v + rhs.v }
    }
}

impl<const N: usize> Sub for PhaseState<N> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { v: self.v - rhs.v }
    }
}

impl<const N: usize> Neg for PhaseState<N> {
    type Output = Self;
    fn neg(self) -> Self {
        Self { v: -self.v }
    }
}

impl<const N: usize> Mul<f64> for PhaseState<N> {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self { v: self.v * rhs }
    }
}

impl<const N: usize> Mul<PhaseState<N>> for f64 {
    type Output = PhaseState<N>;
    fn mul(self, rhs: PhaseState<N>) -> PhaseState<N> {
        rhs * self
    }
}

impl<const N: usize> Div<f64> for PhaseState<N> {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        Self { v: self.v / rhs }
    }
}

impl<const N: usize> AddAssign for PhaseState<N> {
    fn add_assign(&mut self, rhs: Self) {
        self.v += rhs.v;
    }
}

impl<const N: usize> SubAssign for PhaseState<N> {
    fn sub_assign(&mut self, rhs: Self) {
        self.v -= rhs.v;
    }
}

impl<const N: usize> PhaseVector for PhaseState<N> {
    const DIM: usize = N;

    fn zeros() -> Self {
        PhaseState::zeros()
    }

    fn components(&self) -> &[f64] {
        self.as_slice()
    }
}

impl<const N: usize> fmt::Display for PhaseState<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.v.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, ")")
    }
}
