use crate::error::OrbitError;
use crate::traits::{DynamicalSystem, PhaseVector, Steppable};

/// Consecutive rejected trials tolerated before a controlled step gives up.
pub const MAX_STEP_TRIALS: usize = 500;

/// Result of one embedded step: the 5th order solution and the
/// difference to the embedded 4th order one.
#[derive(Debug, Clone, Copy)]
pub struct StepEstimate<S> {
    pub state: S,
    pub error: S,
}

/// Cash-Karp 5(4) embedded Runge-Kutta pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct CashKarp54;

impl CashKarp54 {
    pub fn new() -> Self {
        Self
    }

    /// One step from `state` with its derivative `dxdt` already evaluated at `t`.
    pub fn step_with_error<S: PhaseVector>(
        &self,
        system: &impl DynamicalSystem<S>,
        t: f64,
        state: &S,
        dxdt: &S,
        dt: f64,
    ) -> StepEstimate<S> {
        // Cash-Karp coefficients
        let c2 = 1.0 / 5.0;
        let c3 = 3.0 / 10.0;
        let c4 = 3.0 / 5.0;
        let c5 = 1.0;
        let c6 = 7.0 / 8.0;

        let a21 = 1.0 / 5.0;

        let a31 = 3.0 / 40.0;
        let a32 = 9.0 / 40.0;

        let a41 = 3.0 / 10.0;
        let a42 = -9.0 / 10.0;
        let a43 = 6.0 / 5.0;

        let a51 = -11.0 / 54.0;
        let a52 = 5.0 / 2.0;
        let a53 = -70.0 / 27.0;
        let a54 = 35.0 / 27.0;

        let a61 = 1631.0 / 55296.0;
        let a62 = 175.0 / 512.0;
        let a63 = 575.0 / 13824.0;
        let a64 = 44275.0 / 110592.0;
        let a65 = 253.0 / 4096.0;

        // b coefficients (5th order)
        let b1 = 37.0 / 378.0;
        let b3 = 250.0 / 621.0;
        let b4 = 125.0 / 594.0;
        let b6 = 512.0 / 1771.0;

        // b - b* (5th minus embedded 4th order)
        let e1 = b1 - 2825.0 / 27648.0;
        let e3 = b3 - 18575.0 / 48384.0;
        let e4 = b4 - 13525.0 / 55296.0;
        let e5 = -277.0 / 14336.0;
        let e6 = b6 - 1.0 / 4.0;

        let x = *state;

        // k1
        let k1 = *dxdt;

        // k2
        let k2 = system.apply(t + c2 * dt, &(x + k1 * (a21 * dt)));

        // k3
        let k3 = system.apply(t + c3 * dt, &(x + (k1 * a31 + k2 * a32) * dt));

        // k4
        let k4 = system.apply(t + c4 * dt, &(x + (k1 * a41 + k2 * a42 + k3 * a43) * dt));

        // k5
        let k5 = system.apply(
            t + c5 * dt,
            &(x + (k1 * a51 + k2 * a52 + k3 * a53 + k4 * a54) * dt),
        );

        // k6
        let k6 = system.apply(
            t + c6 * dt,
            &(x + (k1 * a61 + k2 * a62 + k3 * a63 + k4 * a64 + k5 * a65) * dt),
        );

        StepEstimate {
            state: x + (k1 * b1 + k3 * b3 + k4 * b4 + k6 * b6) * dt,
            error: (k1 * e1 + k3 * e3 + k4 * e4 + k5 * e5 + k6 * e6) * dt,
        }
    }
}

impl<S: PhaseVector> Steppable<S> for CashKarp54 {
    fn step(&mut self, system: &impl DynamicalSystem<S>, t: &mut f64, state: &mut S, dt: f64) {
        let dxdt = system.apply(*t, state);
        *state = self.step_with_error(system, *t, state, &dxdt, dt).state;
        *t += dt;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Accepted,
    Rejected,
}

/// Error-controlled stepping on top of [`CashKarp54`].
///
/// The error of a trial step is
/// `max_i |err_i| / (abs_err + rel_err * (|x_i| + |dt| |dxdt_i|))`.
/// Trials above 1 are rejected and the step shrinks; accepted trials well
/// below 1 let the next step grow (at most 4.5x per step).
#[derive(Debug, Clone, Copy)]
pub struct ControlledStepper {
    abs_err: f64,
    rel_err: f64,
    max_dt: Option<f64>,
    stepper: CashKarp54,
}

impl ControlledStepper {
    pub fn new(abs_err: f64, rel_err: f64) -> Self {
        Self {
            abs_err,
            rel_err,
            max_dt: None,
            stepper: CashKarp54::new(),
        }
    }

    pub fn with_max_dt(mut self, max_dt: Option<f64>) -> Self {
        self.max_dt = max_dt;
        self
    }

    fn clamp_to_max(&self, dt: f64) -> f64 {
        match self.max_dt {
            Some(max) if dt.abs() > max => max.copysign(dt),
            _ => dt,
        }
    }

    fn error_norm<S: PhaseVector>(&self, error: &S, x: &S, dxdt: &S, dt: f64) -> f64 {
        error
            .components()
            .iter()
            .zip(x.components())
            .zip(dxdt.components())
            .map(|((e, x), d)| e.abs() / (self.abs_err + self.rel_err * (x.abs() + dt.abs() * d.abs())))
            .fold(0.0, f64::max)
    }

    /// Attempts one step of size `dt`. On acceptance `t` and `state` advance;
    /// either way `dt` holds the proposal for the next attempt.
    pub fn try_step<S: PhaseVector>(
        &self,
        system: &impl DynamicalSystem<S>,
        t: &mut f64,
        state: &mut S,
        dt: &mut f64,
    ) -> StepOutcome {
        *dt = self.clamp_to_max(*dt);

        let dxdt = system.apply(*t, state);
        let estimate = self.stepper.step_with_error(system, *t, state, &dxdt, *dt);
        let err = self.error_norm(&estimate.error, state, &dxdt, *dt);

        // NaN errors also land here and only ever shrink the step.
        if !(err <= 1.0) {
            let factor = if err.is_finite() {
                (0.9 * err.powf(-1.0 / 3.0)).max(0.2)
            } else {
                0.2
            };
            *dt *= factor;
            return StepOutcome::Rejected;
        }

        *state = estimate.state;
        *t += *dt;

        if err < 0.5 {
            let err = err.max(5f64.powi(-5));
            *dt = self.clamp_to_max(*dt * 0.9 * err.powf(-0.2));
        }
        StepOutcome::Accepted
    }

    /// Retries [`Self::try_step`] until a step is accepted.
    pub fn step<S: PhaseVector>(
        &self,
        system: &impl DynamicalSystem<S>,
        t: &mut f64,
        state: &mut S,
        dt: &mut f64,
    ) -> Result<(), OrbitError> {
        for _ in 0..MAX_STEP_TRIALS {
            if self.try_step(system, t, state, dt) == StepOutcome::Accepted {
                return Ok(());
            }
        }
        Err(OrbitError::StepSizeAdjustment {
            time: *t,
            trials: MAX_STEP_TRIALS,
        })
    }
}
