//! Incremental Kepler-equation solver.
//!
//! Solves, for the eccentric-anomaly increment ΔE,
//!
//! ```text
//! ΔE − e·cos(E₀)·sin(ΔE) + e·sin(E₀)·(1 − cos(ΔE)) = ΔM
//! ```
//!
//! given the two state scalars `e·cos(E₀)` and `e·sin(E₀)` and the
//! mean-anomaly increment ΔM. This incremental form avoids ever computing
//! E₀ or e themselves and is what the f/g-function drift consumes.

use crate::error::{KeplerError, Result};

/// Iteration cap for the Newton solve.
pub const MAX_ITERATIONS: usize = 10;

/// Convergence threshold on the Newton update |δ|.
pub const TOLERANCE: f64 = 1e-14;

/// A converged solution of the incremental Kepler equation.
///
/// `sin_d_e` and `cos_d_e` correspond to the returned `d_e`, so callers
/// never need to re-evaluate the trig functions.
#[derive(Debug, Clone, Copy)]
pub struct KeplerSolution {
    /// Eccentric-anomaly increment ΔE.
    pub d_e: f64,
    pub sin_d_e: f64,
    pub cos_d_e: f64,
    /// Newton iterations consumed. Re-solving with a converged `d_e` as
    /// the guess takes zero iterations.
    pub iterations: usize,
}

/// Series initial guess for ΔE.
///
/// `ΔM − e sin E₀ + e sin E₀ cos ΔM + e cos E₀ sin ΔM`, good to O(e²) and
/// close enough for Newton at all but extreme eccentricities.
pub fn initial_guess(d_m: f64, ecos_e0: f64, esin_e0: f64) -> f64 {
    d_m - esin_e0 + esin_e0 * d_m.cos() + ecos_e0 * d_m.sin()
}

/// Newton-iterate the incremental Kepler equation from `d_e_guess`.
///
/// # Arguments
/// * `d_m` - Mean-anomaly increment ΔM (radians)
/// * `ecos_e0` - e·cos(E₀) at the start of the advance
/// * `esin_e0` - e·sin(E₀) at the start of the advance
/// * `d_e_guess` - Starting value for ΔE (see [`initial_guess`])
///
/// # Errors
/// [`KeplerError::NonConverged`] when the update is still larger than
/// [`TOLERANCE`] after [`MAX_ITERATIONS`] iterations, which happens for
/// near-parabolic orbits with ΔM near π.
pub fn solve_kepler(d_m: f64, ecos_e0: f64, esin_e0: f64, d_e_guess: f64) -> Result<KeplerSolution> {
    let mut d_e = d_e_guess;
    let (mut sin_d_e, mut cos_d_e) = d_e.sin_cos();
    let mut delta = f64::INFINITY;

    for iterations in 0..MAX_ITERATIONS {
        let f = d_e - ecos_e0 * sin_d_e + esin_e0 * (1.0 - cos_d_e) - d_m;
        let fp = 1.0 - ecos_e0 * cos_d_e + esin_e0 * sin_d_e;
        delta = -f / fp;

        if delta.abs() < TOLERANCE {
            return Ok(KeplerSolution {
                d_e,
                sin_d_e,
                cos_d_e,
                iterations,
            });
        }

        d_e += delta;
        (sin_d_e, cos_d_e) = d_e.sin_cos();
    }

    Err(KeplerError::NonConverged {
        d_m,
        ecos_e0,
        esin_e0,
        last_delta: delta,
    })
}
