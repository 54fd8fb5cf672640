//! Exact Kepler drift via f/g functions.
//!
//! Advances bodies along their osculating Kepler ellipses about a central
//! gravitational parameter μ for a finite time, with no force evaluation.
//! This is the "drift" half of a mixed-variable symplectic step; the
//! advance is exact up to the Kepler-solver tolerance.

use nalgebra::Vector3;
use std::f64::consts::TAU;

use crate::error::{KeplerError, Result};
use crate::kepler::{initial_guess, solve_kepler};

/// Advance one body along its Kepler ellipse by time `t`.
///
/// Returns the new `(r, v)` without touching the inputs. `index` only
/// labels the body in the error report.
fn drift_body(t: f64, mu: f64, r: Vector3<f64>, v: Vector3<f64>, index: usize) -> Result<(Vector3<f64>, Vector3<f64>)> {
    let dist = r.norm();
    let vsq = v.norm_squared();
    let vdotr = v.dot(&r);

    let energy = 0.5 * vsq - mu / dist;
    if energy >= 0.0 {
        return Err(KeplerError::UnboundOrbit { index, energy });
    }

    let a = -0.5 * mu / energy;
    let n = (mu / (a * a * a)).sqrt();
    let ecos_e0 = 1.0 - dist / a;
    let esin_e0 = vdotr / (n * a * a);

    // Subtract off complete orbits so the solver only sees one revolution.
    let d_m = t * n - TAU * (t * n / TAU).floor();
    let dt = d_m / n;

    let guess = initial_guess(d_m, ecos_e0, esin_e0);
    let sol = solve_kepler(d_m, ecos_e0, esin_e0, guess)?;

    let fp = 1.0 - ecos_e0 * sol.cos_d_e + esin_e0 * sol.sin_d_e;
    let f = 1.0 + a * (sol.cos_d_e - 1.0) / dist;
    let g = dt + (sol.sin_d_e - sol.d_e) / n;
    let fdot = -n * sol.sin_d_e * a / (dist * fp);
    let gdot = 1.0 + (sol.cos_d_e - 1.0) / fp;

    Ok((f * r + g * v, fdot * r + gdot * v))
}

/// Kepler-drift the bodies in `[start, start + n)` by time `t`.
///
/// Each body advances about its own gravitational parameter `mu[i]`.
/// Bodies with `skip[i]` set are left untouched and never raise errors.
///
/// # Errors
/// [`KeplerError::UnboundOrbit`] if an unmasked body has nonnegative
/// specific energy, and [`KeplerError::NonConverged`] from the solver.
/// On either, the state of every body in the range is dumped at error
/// level and nothing past the failing body is modified.
pub fn drift(
    t: f64,
    mu: &[f64],
    r: &mut [Vector3<f64>],
    v: &mut [Vector3<f64>],
    start: usize,
    n: usize,
    skip: Option<&[bool]>,
) -> Result<()> {
    for i in start..start + n {
        if skip.is_some_and(|mask| mask[i]) {
            continue;
        }

        match drift_body(t, mu[i], r[i], v[i], i) {
            Ok((r_new, v_new)) => {
                r[i] = r_new;
                v[i] = v_new;
            }
            Err(err) => {
                for j in start..start + n {
                    tracing::error!(body = j, r = ?r[j], v = ?v[j], mu = mu[j], "drift range state at failure");
                }
                return Err(err);
            }
        }
    }

    Ok(())
}

/// Single-body form of [`drift`] with the identical contract.
pub fn drift_single(t: f64, mu: f64, r: &mut Vector3<f64>, v: &mut Vector3<f64>) -> Result<()> {
    let (r_new, v_new) = drift_body(t, mu, *r, *v, 0)?;
    *r = r_new;
    *v = v_new;
    Ok(())
}
