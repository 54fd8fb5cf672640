//! Error types for two-body propagation.

use thiserror::Error;

/// Fatal conditions raised by the drift and the Kepler solver.
///
/// Both variants abort the step that triggered them; the integrator never
/// retries internally.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum KeplerError {
    /// A body eligible for drift has nonnegative specific orbital energy.
    #[error("unbound orbit for body {index}: specific energy {energy:e} >= 0")]
    UnboundOrbit { index: usize, energy: f64 },

    /// Newton iteration on the Kepler equation hit the iteration cap.
    #[error(
        "Kepler equation did not converge: dM = {d_m:e}, e cos E0 = {ecos_e0:e}, \
         e sin E0 = {esin_e0:e}, last delta = {last_delta:e}"
    )]
    NonConverged {
        d_m: f64,
        ecos_e0: f64,
        esin_e0: f64,
        last_delta: f64,
    },
}

pub type Result<T> = std::result::Result<T, KeplerError>;
