//! Configuration records for the integration entry points.

use crate::error::OrbitError;
use crate::solvers::ControlledStepper;
use serde::{Deserialize, Serialize};

/// Error control and closure settings shared by every integration call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationOptions {
    pub abs_err: f64,
    pub rel_err: f64,
    pub initial_time_step: f64,
    /// How close (Euclidean, in the (q, p) plane) a refined crossing must be
    /// to the start point for an orbit to count as closed.
    pub distance_threshold: f64,
}

impl Default for IntegrationOptions {
    fn default() -> Self {
        Self {
            abs_err: 1.0e-16,
            rel_err: 1.0e-14,
            initial_time_step: 1e-5,
            distance_threshold: 1.0e-13,
        }
    }
}

impl IntegrationOptions {
    pub fn set_abs_err(&mut self, error: f64) -> &mut Self {
        self.abs_err = error;
        self
    }

    pub fn set_rel_err(&mut self, error: f64) -> &mut Self {
        self.rel_err = error;
        self
    }

    pub fn set_initial_time_step(&mut self, dt_init: f64) -> &mut Self {
        self.initial_time_step = dt_init;
        self
    }

    pub fn set_distance_threshold(&mut self, ds: f64) -> &mut Self {
        self.distance_threshold = ds;
        self
    }

    pub fn validate(&self) -> Result<(), OrbitError> {
        require_positive("abs_err", self.abs_err)?;
        require_positive("rel_err", self.rel_err)?;
        require_positive("initial_time_step", self.initial_time_step)?;
        require_positive("distance_threshold", self.distance_threshold)
    }

    pub(crate) fn controlled_stepper(&self, interval: &TimeInterval) -> ControlledStepper {
        ControlledStepper::new(self.abs_err, self.rel_err).with_max_dt(interval.dt_max())
    }
}

/// Time span of a forward integration, with an optional cap on the step size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeInterval {
    t_begin: f64,
    t_end: f64,
    dt_max: Option<f64>,
}

impl TimeInterval {
    pub fn new(t_begin: f64, t_end: f64) -> Self {
        Self {
            t_begin,
            t_end,
            dt_max: None,
        }
    }

    pub fn with_dt_max(t_begin: f64, t_end: f64, dt_max: f64) -> Self {
        Self {
            t_begin,
            t_end,
            dt_max: Some(dt_max),
        }
    }

    pub fn t_begin(&self) -> f64 {
        self.t_begin
    }

    pub fn set_t_begin(&mut self, t_begin: f64) -> &mut Self {
        self.t_begin = t_begin;
        self
    }

    pub fn t_end(&self) -> f64 {
        self.t_end
    }

    pub fn set_t_end(&mut self, t_end: f64) -> &mut Self {
        self.t_end = t_end;
        self
    }

    pub fn dt_max(&self) -> Option<f64> {
        self.dt_max
    }

    pub fn set_dt_max(&mut self, dt_max: f64) -> &mut Self {
        self.dt_max = Some(dt_max);
        self
    }

    pub fn unset_dt_max(&mut self) -> &mut Self {
        self.dt_max = None;
        self
    }

    pub fn duration(&self) -> f64 {
        self.t_end - self.t_begin
    }

    pub fn validate(&self) -> Result<(), OrbitError> {
        if !self.t_begin.is_finite() || !self.t_end.is_finite() {
            return Err(OrbitError::InvalidSettings(
                "time interval bounds must be finite".into(),
            ));
        }
        if self.t_end <= self.t_begin {
            return Err(OrbitError::InvalidSettings(format!(
                "time interval must end after it begins (got [{}, {}])",
                self.t_begin, self.t_end
            )));
        }
        if let Some(dt_max) = self.dt_max {
            require_positive("dt_max", dt_max)?;
        }
        Ok(())
    }
}

fn require_positive(name: &str, value: f64) -> Result<(), OrbitError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(OrbitError::InvalidSettings(format!(
            "{name} must be positive and finite (got {value})"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::{IntegrationOptions, TimeInterval};
    use crate::error::OrbitError;

    #[test]
    fn setters_chain() {
        let mut options = IntegrationOptions::default();
        options.set_abs_err(1e-12).set_rel_err(1e-10).set_distance_threshold(1e-9);
        assert_eq!(options.abs_err, 1e-12);
        assert_eq!(options.rel_err, 1e-10);
        assert_eq!(options.distance_threshold, 1e-9);
        assert_eq!(options.initial_time_step, 1e-5);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_tolerances() {
        let mut options = IntegrationOptions::default();
        options.set_rel_err(0.0);
        let err = options.validate().expect_err("zero rel_err");
        assert!(err.to_string().contains("rel_err"), "unexpected error: {err}");

        let mut options = IntegrationOptions::default();
        options.set_initial_time_step(f64::NAN);
        assert!(matches!(options.validate(), Err(OrbitError::InvalidSettings(_))));
    }

    #[test]
    fn interval_must_move_forward() {
        assert!(TimeInterval::new(0.0, 10.0).validate().is_ok());
        assert!(TimeInterval::new(10.0, 10.0).validate().is_err());
        assert!(TimeInterval::new(0.0, f64::INFINITY).validate().is_err());
        assert!(TimeInterval::with_dt_max(0.0, 1.0, -0.1).validate().is_err());
    }

    #[test]
    fn dt_max_can_be_unset() {
        let mut interval = TimeInterval::with_dt_max(0.0, 5.0, 0.1);
        assert_eq!(interval.dt_max(), Some(0.1));
        interval.unset_dt_max().set_t_end(6.0);
        assert_eq!(interval.dt_max(), None);
        assert_eq!(interval.duration(), 6.0);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let options: IntegrationOptions =
            serde_json::from_str(r#"{ "distance_threshold": 1e-9 }"#).unwrap();
        assert_eq!(options.distance_threshold, 1e-9);
        assert_eq!(options.abs_err, IntegrationOptions::default().abs_err);

        let interval: TimeInterval =
            serde_json::from_str(r#"{ "t_end": 100.0, "dt_max": 0.5 }"#).unwrap();
        assert_eq!(interval, TimeInterval::with_dt_max(0.0, 100.0, 0.5));
    }
}
