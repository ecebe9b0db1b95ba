//! Lazy sample streams over a forward integration.
//!
//! Both streams own their vector field, so they can be handed around freely
//! and consumed later. They are single-pass: once exhausted (or after an
//! error) they only yield `None`, and restarting means building a new one.

use super::options::{IntegrationOptions, TimeInterval};
use crate::error::OrbitError;
use crate::solvers::ControlledStepper;
use crate::traits::{DynamicalSystem, PhaseVector};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<S> {
    pub state: S,
    pub time: f64,
}

fn reached(time: f64, target: f64) -> bool {
    target - time <= 4.0 * f64::EPSILON * target.abs().max(1.0)
}

/// Yields the start point, then the state after every accepted adaptive step.
/// The last step is shortened so the stream ends exactly at `t_end`.
pub struct AdaptiveSamples<S, F> {
    system: F,
    stepper: ControlledStepper,
    state: S,
    time: f64,
    t_end: f64,
    dt: f64,
    started: bool,
    finished: bool,
}

impl<S: PhaseVector, F: DynamicalSystem<S>> AdaptiveSamples<S, F> {
    pub fn new(system: F, start: S, interval: &TimeInterval, options: &IntegrationOptions) -> Self {
        Self {
            system,
            stepper: options.controlled_stepper(interval),
            state: start,
            time: interval.t_begin(),
            t_end: interval.t_end(),
            dt: options.initial_time_step,
            started: false,
            finished: false,
        }
    }
}

impl<S: PhaseVector, F: DynamicalSystem<S>> Iterator for AdaptiveSamples<S, F> {
    type Item = Result<Sample<S>, OrbitError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(Ok(Sample {
                state: self.state,
                time: self.time,
            }));
        }
        if reached(self.time, self.t_end) {
            self.finished = true;
            return None;
        }

        let before = self.time;
        let mut dt = self.dt.min(self.t_end - self.time);
        if let Err(err) = self
            .stepper
            .step(&self.system, &mut self.time, &mut self.state, &mut dt)
        {
            self.finished = true;
            return Some(Err(err));
        }
        if self.time == before {
            self.finished = true;
            return Some(Err(OrbitError::StepSizeAdjustment {
                time: self.time,
                trials: 1,
            }));
        }
        if reached(self.time, self.t_end) {
            self.time = self.t_end;
        }
        self.dt = dt;

        Some(Ok(Sample {
            state: self.state,
            time: self.time,
        }))
    }
}

/// Yields the state at each requested time, in order. Steps are clipped so
/// the integration lands on every requested time exactly.
pub struct TimedSamples<S, F> {
    system: F,
    stepper: ControlledStepper,
    state: S,
    time: f64,
    times: Vec<f64>,
    next_index: usize,
    dt: f64,
    finished: bool,
}

impl<S: PhaseVector, F: DynamicalSystem<S>> TimedSamples<S, F> {
    /// `times` must be ascending and start no earlier than `t_start`.
    pub fn new(
        system: F,
        start: S,
        t_start: f64,
        times: Vec<f64>,
        stepper: ControlledStepper,
        initial_time_step: f64,
    ) -> Result<Self, OrbitError> {
        if times.first().is_some_and(|&t| t < t_start) {
            return Err(OrbitError::InvalidSettings(format!(
                "sample times must not precede the start time {t_start}"
            )));
        }
        if times.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err(OrbitError::InvalidSettings(
                "sample times must be ascending".into(),
            ));
        }
        Ok(Self {
            system,
            stepper,
            state: start,
            time: t_start,
            times,
            next_index: 0,
            dt: initial_time_step,
            finished: false,
        })
    }

    fn advance_to(&mut self, target: f64) -> Result<(), OrbitError> {
        while !reached(self.time, target) {
            let remaining = target - self.time;
            let clipped = self.dt > remaining;
            let mut dt = self.dt.min(remaining);
            let before = self.time;
            self.stepper
                .step(&self.system, &mut self.time, &mut self.state, &mut dt)?;
            if self.time == before {
                return Err(OrbitError::StepSizeAdjustment {
                    time: self.time,
                    trials: 1,
                });
            }
            self.dt = if clipped { self.dt.max(dt) } else { dt };
        }
        self.time = target;
        Ok(())
    }
}

impl<S: PhaseVector, F: DynamicalSystem<S>> Iterator for TimedSamples<S, F> {
    type Item = Result<Sample<S>, OrbitError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let Some(&target) = self.times.get(self.next_index) else {
            self.finished = true;
            return None;
        };
        self.next_index += 1;
        if let Err(err) = self.advance_to(target) {
            self.finished = true;
            return Some(Err(err));
        }
        Some(Ok(Sample {
            state: self.state,
            time: target,
        }))
    }
}
