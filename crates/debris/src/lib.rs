//! Wisdom-Holman mixed-variable symplectic integrator for planetary
//! systems with massless test particles.
//!
//! The integrator advances a small number of massive planets and a large
//! population of massless particles under mutual Newtonian gravity.
//! Planets step in Jacobi coordinates (exact Kepler drift about their
//! Jacobi central mass, interaction kicks in heliocentric coordinates);
//! particles step in the field of the logged planetary trajectory and
//! never perturb the planets. Close encounters between particles and
//! planets can optionally be resolved on a finer local substep.
//!
//! # Architecture
//!
//! One global step is a kick-drift-kick split:
//! 1. Planets: half kick, Jacobi Kepler drift, accelerations, half kick,
//!    recording positions, velocities, and the reference acceleration h0
//!    into per-timestep logs.
//! 2. Particles: half kick, heliocentric Kepler drift, accelerations
//!    against the logged planet positions (flagging collisions, escapes,
//!    and encounter-shell crossings), half kick.
//!
//! Units are G = 1: masses in solar masses, lengths in AU, time in
//! yr/2π.

pub mod config;
pub mod encounter;
pub mod forces;
pub mod frames;
pub mod integrator;
pub mod metrics;
pub mod state;

#[cfg(test)]
mod frames_test;
#[cfg(test)]
mod state_test;

pub use config::Configuration;
pub use integrator::{Integrator, WhIntegrator};
pub use keplerian::{KeplerError, Result};
pub use metrics::{calculate_planet_metrics, PlanetMetrics};
pub use state::{ParticleState, PlanetState, DEATH_COLLISION, DEATH_ESCAPE};
