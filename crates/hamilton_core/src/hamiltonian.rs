//! Concrete Hamiltonians on the (q, p) plane.

use crate::special::{ellint_1, ellint_2};
use crate::state::State2;
use crate::traits::Hamiltonian;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_1_PI;

/// H = (q^2 + p^2) / 2
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HarmonicOscillator;

impl Hamiltonian for HarmonicOscillator {
    fn value(&self, s: &State2) -> f64 {
        0.5 * s.magnitude_squared()
    }

    fn derivative(&self, s: &State2) -> State2 {
        *s
    }
}

/// H = p^2 / 2
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FreeParticle;

impl Hamiltonian for FreeParticle {
    fn value(&self, s: &State2) -> f64 {
        0.5 * s.p() * s.p()
    }

    fn derivative(&self, s: &State2) -> State2 {
        State2::new(0.0, s.p())
    }
}

/// Slow-flow Hamiltonian of the forced Duffing oscillator in the rotating frame.
///
/// With r^2 = q^2 + p^2 and Omega = omega0^2 - omega^2:
/// H = -(Omega r^2 + 3 e_alpha r^4 / 8 - 2 e_gamma q) / (4 omega)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DuffingHamiltonian {
    pub omega: f64,
    pub omega0: f64,
    pub e_alpha: f64,
    pub e_gamma: f64,
}

impl Default for DuffingHamiltonian {
    fn default() -> Self {
        Self {
            omega: 1.5,
            omega0: 1.0,
            e_alpha: 0.05,
            e_gamma: 2.5,
        }
    }
}

impl DuffingHamiltonian {
    pub fn new(omega: f64, omega0: f64, e_alpha: f64, e_gamma: f64) -> Self {
        Self {
            omega,
            omega0,
            e_alpha,
            e_gamma,
        }
    }

    fn detuning(&self) -> f64 {
        self.omega0 * self.omega0 - self.omega * self.omega
    }
}

impl Hamiltonian for DuffingHamiltonian {
    fn value(&self, s: &State2) -> f64 {
        let r2 = s.magnitude_squared();
        -(self.detuning() * r2 + 3.0 * self.e_alpha / 8.0 * r2 * r2 - 2.0 * self.e_gamma * s.q())
            / (4.0 * self.omega)
    }

    fn derivative(&self, s: &State2) -> State2 {
        let r2 = s.magnitude_squared();
        let (q, p) = (s.q(), s.p());
        let cubic = 3.0 * self.e_alpha / 4.0 * r2;
        let dh_dq = -(self.detuning() * q + cubic * q - self.e_gamma) / (2.0 * self.omega);
        let dh_dp = -(self.detuning() * p + cubic * p) / (2.0 * self.omega);
        State2::new(dh_dq, dh_dp)
    }
}

/// H = G p^2 / 2 - F cos q, with F = m g h and G = 1 / (m h^2).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendulumHamiltonian {
    f: f64,
    g: f64,
}

impl PendulumHamiltonian {
    pub fn new(f: f64, g: f64) -> Self {
        Self { f, g }
    }

    pub fn f(&self) -> f64 {
        self.f
    }

    pub fn g(&self) -> f64 {
        self.g
    }

    fn two_kappa_squared(&self, energy: f64) -> f64 {
        1.0 + energy / self.f
    }

    /// 8 sqrt(F / G) / pi
    fn action_scale(&self) -> f64 {
        8.0 * FRAC_1_PI * (self.f / self.g).sqrt()
    }

    /// Closed-form action (the loop integral of p dq divided by 2 pi) at the given energy.
    ///
    /// Librating orbits have kappa < 1; kappa >= 1 are rotations, where the
    /// integral runs over one full turn of q.
    pub fn analytical_action(&self, energy: f64) -> f64 {
        let kappa_squared = 0.5 * self.two_kappa_squared(energy);
        let kappa = kappa_squared.sqrt();

        // K(1) diverges, so the separatrix itself goes to the rotating branch.
        if kappa < 1.0 {
            self.action_scale() * (ellint_2(kappa) - (1.0 - kappa_squared) * ellint_1(kappa))
        } else {
            self.action_scale() * 0.5 * kappa * ellint_2(1.0 / kappa)
        }
    }

    pub fn analytical_action_at(&self, s: &State2) -> f64 {
        self.analytical_action(self.value(s))
    }
}

impl Hamiltonian for PendulumHamiltonian {
    fn value(&self, s: &State2) -> f64 {
        0.5 * self.g * s.p() * s.p() - self.f * s.q().cos()
    }

    fn derivative(&self, s: &State2) -> State2 {
        State2::new(self.f * s.q().sin(), self.g * s.p())
    }
}
