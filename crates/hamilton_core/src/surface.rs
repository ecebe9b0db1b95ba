//! Surfaces a trajectory can cross, and the predicates that decide when it did.

use crate::error::OrbitError;
use crate::state::State2;
use crate::util::wrap_minus_pi_pi;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// A target surface in the (q, p) plane.
///
/// `distance` is signed; a sign change between consecutive samples marks a
/// candidate crossing. Stepping a point back by its distance along
/// `direction` must land it on the surface.
pub trait Surface {
    fn distance(&self, point: &State2) -> f64;

    /// Direction whose projection `distance` measures.
    fn direction(&self) -> State2;

    /// Whether moving from `previous` to `current` distance is a crossing.
    /// Only crossings from the negative to the non-negative side count.
    fn crossed(&self, previous: f64, current: f64) -> bool {
        cross_zero_positive_direction(current, previous)
    }
}

pub fn cross_zero_positive_direction(current: f64, previous: f64) -> bool {
    current >= 0.0 && previous < 0.0
}

pub fn not_too_far(d1: f64, d2: f64, threshold: f64) -> bool {
    (d1 - d2).abs() < threshold
}

/// The line `normal . x + c = 0` through a given point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    normal: State2,
    c: f64,
}

impl Line {
    pub fn new(position: &State2, normal: State2) -> Result<Self, OrbitError> {
        if normal.magnitude_squared() == 0.0 {
            return Err(OrbitError::DegenerateSurface);
        }
        Ok(Self {
            normal,
            c: -position.dot(&normal),
        })
    }

    pub fn perpendicular_vector(&self) -> State2 {
        self.normal
    }
}

impl Surface for Line {
    fn distance(&self, point: &State2) -> f64 {
        self.normal.dot(point) + self.c
    }

    fn direction(&self) -> State2 {
        self.normal
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.normal.q();
        let b = self.normal.p();
        let sign = |v: f64| if v >= 0.0 { "+" } else { "-" };
        write!(
            f,
            "{a}*x {} {}*y {} {} = 0",
            sign(b),
            b.abs(),
            sign(self.c),
            self.c.abs()
        )
    }
}

/// The section `q = q0 (mod 2 pi)` for an angle-like coordinate.
///
/// The distance is `q - q0` wrapped onto (-pi, pi], which jumps by 2 pi half a
/// turn away from the section. Sign changes across that jump are not
/// crossings, so consecutive distances further apart than `max_branch_jump`
/// are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodicAngleSurface {
    reference_angle: f64,
    max_branch_jump: f64,
}

impl PeriodicAngleSurface {
    pub fn new(reference_point: &State2) -> Self {
        Self {
            reference_angle: reference_point.q(),
            max_branch_jump: PI,
        }
    }

    pub fn with_max_branch_jump(mut self, max_branch_jump: f64) -> Self {
        self.max_branch_jump = max_branch_jump;
        self
    }

    pub fn reference_angle(&self) -> f64 {
        self.reference_angle
    }
}

impl Surface for PeriodicAngleSurface {
    fn distance(&self, point: &State2) -> f64 {
        wrap_minus_pi_pi(point.q() - self.reference_angle)
    }

    fn direction(&self) -> State2 {
        State2::new(1.0, 0.0)
    }

    fn crossed(&self, previous: f64, current: f64) -> bool {
        cross_zero_positive_direction(current, previous)
            && not_too_far(current, previous, self.max_branch_jump)
    }
}
