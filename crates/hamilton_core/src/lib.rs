pub mod action_angle;
pub mod dynamics;
pub mod error;
pub mod hamiltonian;
pub mod integration;
pub mod observer;
pub mod scan;
pub mod solvers;
pub mod special;
pub mod state;
pub mod step_back;
pub mod surface;
pub mod util;
/// The `hamilton_core` crate integrates one-degree-of-freedom Hamiltonian
/// systems in the (q, p) plane and extracts their periodic structure.
///
/// Key components:
/// - **Traits**: `Hamiltonian` (energy and gradient), `DynamicalSystem` (vector fields), `Steppable` (solvers).
/// - **Solvers**: Cash-Karp 5(4) with an error-controlled stepper, streamed as lazy samples.
/// - **Surfaces**: Lines and periodic angle sections, with positive-direction crossing detection.
/// - **Step-back**: Lands a detected crossing exactly on its surface by integrating along the surface direction.
/// - **Action-angle**: Orbit closure, action, frequency and the angle parametrization of a period.
pub mod traits;

pub use action_angle::{
    calculate_action_angle_on_closed_orbit, calculate_action_angle_on_periodic_orbit,
    ActionAngleOrbit, AnglesPositions, DEFAULT_NUMBER_OF_ANGLES,
};
pub use error::OrbitError;
pub use hamiltonian::{DuffingHamiltonian, FreeParticle, HarmonicOscillator, PendulumHamiltonian};
pub use integration::{
    calculate_crossings, calculate_first_crossing, come_back_home, come_back_home_closed_orbit,
    come_back_home_periodic_orbit, IntegrationOptions, TimeInterval,
};
pub use state::{State2, State2Action, State2Extended};
pub use surface::{Line, PeriodicAngleSurface, Surface};
pub use traits::Hamiltonian;
