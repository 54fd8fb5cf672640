//! Integrator configuration.

use serde::{Deserialize, Serialize};

/// Options recognized by the integrator.
///
/// Encounter shell radii are in units of the encounter planet's Hill
/// radius; collision and escape radii are in AU.
///
/// # Examples
///
/// ```
/// use debris::Configuration;
///
/// let config = Configuration {
///     dt: 0.05,
///     resolve_encounters: true,
///     ..Configuration::default()
/// };
/// assert_eq!(config.tbsize, 100);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Global timestep.
    pub dt: f64,

    /// Timesteps per block; also the length of the planet logs.
    pub tbsize: usize,

    /// Whether particles crossing an encounter shell are re-integrated
    /// on a finer substep about the encounter planet.
    pub resolve_encounters: bool,

    /// Substep count inside the outer encounter shell.
    pub encounter_n1: usize,

    /// Substep count inside the inner encounter shell.
    pub encounter_n2: usize,

    /// Outer encounter shell radius (Hill radii).
    pub encounter_r1: f64,

    /// Inner encounter shell radius (Hill radii).
    pub encounter_r2: f64,

    /// A particle closer than this to a planet is flagged as collided.
    pub collision_radius: f64,

    /// A particle farther than this from the origin is flagged as
    /// escaped.
    pub escape_radius: f64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            dt: 0.1,
            tbsize: 100,
            resolve_encounters: false,
            encounter_n1: 8,
            encounter_n2: 4,
            encounter_r1: 3.0,
            encounter_r2: 1.0,
            collision_radius: 0.5,
            escape_radius: 200.0,
        }
    }
}
