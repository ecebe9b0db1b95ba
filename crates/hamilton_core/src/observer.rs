//! Crossing detection over a stream of integration samples.
//!
//! A [`CrossingDetector`] remembers the distance of the previous sample from
//! its surface. When a sample lands on the positive side of the surface
//! after a negative one, the detector refines the sample onto the surface,
//! asks its acceptance predicate about the refined point and logs it if
//! accepted. [`observe`] feeds it every sample; [`observe_first`] stops at
//! the first accepted crossing.

use crate::error::OrbitError;
use crate::integration::Sample;
use crate::state::{State2Action, State2Extended};
use crate::surface::Surface;
use tracing::{debug, trace};

/// Something that consumes samples one at a time and reports whether the
/// sample produced an accepted observation.
pub trait Observer<S> {
    fn observe(&mut self, sample: &Sample<S>) -> Result<bool, OrbitError>;
}

/// Keeps every `every`-th observation pushed into it.
#[derive(Debug, Clone, Default)]
pub struct ObservationLog {
    observations: Vec<State2Extended>,
    every: usize,
    count: usize,
}

impl ObservationLog {
    /// `every` of 0 is treated as 1.
    pub fn new(every: usize) -> Self {
        Self {
            observations: Vec::new(),
            every: every.max(1),
            count: 0,
        }
    }

    pub fn push(&mut self, s: State2Extended) {
        if self.count % self.every == 0 {
            self.observations.push(s);
        }
        self.count += 1;
    }

    pub fn observations(&self) -> &[State2Extended] {
        &self.observations
    }

    pub fn into_observations(self) -> Vec<State2Extended> {
        self.observations
    }
}

/// Detects positive-direction crossings of `surface` and refines them.
///
/// `refine(state, t, distance)` must return the extended state on the
/// surface; `accept` filters the refined states.
pub struct CrossingDetector<Sf, R, P> {
    surface: Sf,
    refine: R,
    accept: P,
    log: ObservationLog,
    previous_distance: f64,
}

impl<Sf, R, P> CrossingDetector<Sf, R, P>
where
    Sf: Surface,
    R: FnMut(&State2Action, f64, f64) -> Result<State2Extended, OrbitError>,
    P: FnMut(&State2Extended) -> bool,
{
    pub fn new(surface: Sf, refine: R, accept: P) -> Self {
        Self {
            surface,
            refine,
            accept,
            log: ObservationLog::new(1),
            previous_distance: 0.0,
        }
    }

    pub fn with_every(mut self, every: usize) -> Self {
        self.log = ObservationLog::new(every);
        self
    }

    pub fn surface(&self) -> &Sf {
        &self.surface
    }

    pub fn previous_distance(&self) -> f64 {
        self.previous_distance
    }

    pub fn observations(&self) -> &[State2Extended] {
        self.log.observations()
    }

    pub fn into_observations(self) -> Vec<State2Extended> {
        self.log.into_observations()
    }

    /// Handles one sample. Returns `Ok(true)` when it produced an accepted crossing.
    pub fn process(&mut self, s: &State2Action, t: f64) -> Result<bool, OrbitError> {
        let distance = self.surface.distance(&s.position());
        let crossing_accepted = if self.surface.crossed(self.previous_distance, distance) {
            self.after_crossing(s, t, distance)?
        } else {
            false
        };
        self.previous_distance = distance;
        Ok(crossing_accepted)
    }

    fn after_crossing(&mut self, s: &State2Action, t: f64, distance: f64) -> Result<bool, OrbitError> {
        let refined = (self.refine)(s, t, distance)?;
        if (self.accept)(&refined) {
            debug!(time = refined.time(), state = %refined, "crossing accepted");
            self.log.push(refined);
            Ok(true)
        } else {
            trace!(time = refined.time(), state = %refined, "crossing rejected");
            Ok(false)
        }
    }
}

impl<Sf, R, P> Observer<State2Action> for CrossingDetector<Sf, R, P>
where
    Sf: Surface,
    R: FnMut(&State2Action, f64, f64) -> Result<State2Extended, OrbitError>,
    P: FnMut(&State2Extended) -> bool,
{
    fn observe(&mut self, sample: &Sample<State2Action>) -> Result<bool, OrbitError> {
        self.process(&sample.state, sample.time)
    }
}

/// Feeds every sample to the observer.
pub fn observe<S, O, I>(observer: &mut O, samples: I) -> Result<(), OrbitError>
where
    O: Observer<S>,
    I: IntoIterator<Item = Result<Sample<S>, OrbitError>>,
{
    for sample in samples {
        observer.observe(&sample?)?;
    }
    Ok(())
}

/// Feeds samples until the observer accepts one. Returns whether it did.
pub fn observe_first<S, O, I>(observer: &mut O, samples: I) -> Result<bool, OrbitError>
where
    O: Observer<S>,
    I: IntoIterator<Item = Result<Sample<S>, OrbitError>>,
{
    for sample in samples {
        if observer.observe(&sample?)? {
            return Ok(true);
        }
    }
    Ok(false)
}
