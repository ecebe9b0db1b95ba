//! Batch closure over many starting points.

use crate::error::OrbitError;
use crate::integration::{come_back_home_closed_orbit, IntegrationOptions, TimeInterval};
use crate::state::State2;
use crate::traits::Hamiltonian;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use tracing::{info, warn};

/// Energy, action and frequency of the orbit through `start`.
///
/// `action` and `omega` are NaN when the orbit did not close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitSummary {
    pub start: State2,
    pub energy: f64,
    pub action: f64,
    pub omega: f64,
}

impl OrbitSummary {
    pub fn is_closed(&self) -> bool {
        self.action.is_finite() && self.omega.is_finite()
    }
}

/// Closes the orbit through every start point.
///
/// A failing orbit does not stop the scan; its summary carries NaN action and
/// frequency. Invalid settings fail up front.
pub fn scan_closed_orbits<H: Hamiltonian + Clone>(
    hamiltonian: &H,
    starts: &[State2],
    interval: &TimeInterval,
    options: &IntegrationOptions,
) -> Result<Vec<OrbitSummary>, OrbitError> {
    options.validate()?;
    interval.validate()?;

    let summaries: Vec<OrbitSummary> = starts
        .iter()
        .map(|start| {
            let energy = hamiltonian.value(start);
            let (action, omega) = match come_back_home_closed_orbit(hamiltonian, start, interval, options) {
                Ok(s_back) => (s_back.action() / TAU, TAU / (s_back.time() - interval.t_begin())),
                Err(err) => {
                    warn!(start = %start, error = %err, "orbit skipped");
                    (f64::NAN, f64::NAN)
                }
            };
            OrbitSummary {
                start: *start,
                energy,
                action,
                omega,
            }
        })
        .collect();

    let closed = summaries.iter().filter(|s| s.is_closed()).count();
    info!(closed, total = summaries.len(), "scan finished");
    Ok(summaries)
}
