//! Two-body orbital machinery.
//!
//! This crate provides the pieces of a Kepler problem that an N-body
//! integrator composes: the universal Kepler-equation solver, the exact
//! f/g-function drift along a Kepler ellipse, and conversions between
//! Cartesian state and Keplerian orbital elements.
//!
//! All quantities are in simulation units with G = 1: masses in solar
//! masses, lengths in AU, time in yr/2π. Gravitational parameters μ are
//! therefore plain masses.

pub mod drift;
pub mod elements;
pub mod error;
pub mod kepler;

#[cfg(test)]
mod drift_test;

pub use drift::{drift, drift_single};
pub use elements::{elements_to_cartesian, to_elements, OrbitalElements};
pub use error::{KeplerError, Result};
pub use kepler::{initial_guess, solve_kepler, KeplerSolution};
