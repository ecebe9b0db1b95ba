use thiserror::Error;

/// Failures of a single orbit computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrbitError {
    #[error("Line: at least one component of the normal vector must be nonzero")]
    DegenerateSurface,

    #[error("orbit never came back within t = [{t_begin}, {t_end}]")]
    OrbitDidNotReturn { t_begin: f64, t_end: f64 },

    #[error("refinement direction is perpendicular to the flow at t = {time}")]
    SingularDirection { time: f64 },

    #[error("step size adjustment failed after {trials} trials at t = {time}")]
    StepSizeAdjustment { time: f64, trials: usize },

    #[error("invalid integration settings: {0}")]
    InvalidSettings(String),
}
